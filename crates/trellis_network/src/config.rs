//! Configuration for the network builder.

use crate::trace::TracerConfig;

/// Controls node sharing, failure handling, and build tracing.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Reuse equivalent alpha filters between rules.
    pub share_alpha_nodes: bool,

    /// Reuse equivalent adapters and beta nodes between rules.
    pub share_beta_nodes: bool,

    /// Remove the nodes of a rule that fails to compile.
    pub rollback_on_failure: bool,

    /// Build trace settings.
    pub tracer: TracerConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            share_alpha_nodes: true,
            share_beta_nodes: true,
            rollback_on_failure: true,
            tracer: TracerConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with build tracing enabled.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            tracer: TracerConfig::new().enabled(),
            ..Self::default()
        }
    }

    /// Every rule gets its own alpha and beta nodes. Roots and object-type
    /// nodes are still shared.
    #[must_use]
    pub fn no_sharing() -> Self {
        Self {
            share_alpha_nodes: false,
            share_beta_nodes: false,
            ..Self::default()
        }
    }

    /// Builder method to set alpha sharing.
    #[must_use]
    pub fn with_alpha_sharing(mut self, share: bool) -> Self {
        self.share_alpha_nodes = share;
        self
    }

    /// Builder method to set beta sharing.
    #[must_use]
    pub fn with_beta_sharing(mut self, share: bool) -> Self {
        self.share_beta_nodes = share;
        self
    }

    /// Builder method to set rollback on failure.
    #[must_use]
    pub fn with_rollback(mut self, rollback: bool) -> Self {
        self.rollback_on_failure = rollback;
        self
    }

    /// Builder method to set the tracer configuration.
    #[must_use]
    pub fn with_tracer(mut self, tracer: TracerConfig) -> Self {
        self.tracer = tracer;
        self
    }
}
