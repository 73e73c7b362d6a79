//! Session configuration.

/// Limits applied while a session fires rules.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Maximum activations fired over the session's lifetime.
    pub max_activations: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_activations: 10_000, // Kill switch
        }
    }
}

impl SessionConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum activations (kill switch threshold).
    #[must_use]
    pub fn with_max_activations(mut self, max: usize) -> Self {
        self.max_activations = max;
        self
    }
}
