//! The rule base: a compiled network plus the rules that built it.

use trellis_foundation::Result;
use trellis_model::Rule;

use crate::builder::{ReteBuilder, RuleHandle};
use crate::config::BuildConfig;
use crate::factory::NodeFactory;
use crate::network::Network;
use crate::node::NodeId;
use crate::trace::BuildTracer;

/// Owns one shared network and every rule compiled into it.
///
/// Rules are only ever added. A rule that fails to compile is not recorded.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    builder: ReteBuilder,
    rules: Vec<RuleHandle>,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty knowledge base with the given configuration.
    #[must_use]
    pub fn with_config(config: BuildConfig) -> Self {
        Self {
            builder: ReteBuilder::new(config),
            rules: Vec::new(),
        }
    }

    /// Creates an empty knowledge base materializing nodes through
    /// `factory`.
    #[must_use]
    pub fn with_factory(config: BuildConfig, factory: Box<dyn NodeFactory>) -> Self {
        Self {
            builder: ReteBuilder::with_factory(config, factory),
            rules: Vec::new(),
        }
    }

    /// Compiles a rule into the network.
    ///
    /// # Errors
    /// See [`ReteBuilder::add_rule`].
    pub fn add_rule(&mut self, rule: &Rule) -> Result<RuleHandle> {
        let handle = self.builder.add_rule(rule)?;
        self.rules.push(handle.clone());
        Ok(handle)
    }

    /// Compiles rules in order, stopping at the first failure.
    ///
    /// Rules before the failing one stay compiled.
    ///
    /// # Errors
    /// See [`ReteBuilder::add_rule`].
    pub fn add_rules<'a>(
        &mut self,
        rules: impl IntoIterator<Item = &'a Rule>,
    ) -> Result<Vec<RuleHandle>> {
        rules.into_iter().map(|rule| self.add_rule(rule)).collect()
    }

    /// Returns the shared network.
    #[must_use]
    pub fn network(&self) -> &Network {
        self.builder.network()
    }

    /// Returns the root of the named entry point, if any rule reads it.
    #[must_use]
    pub fn entry_point(&self, name: &str) -> Option<NodeId> {
        self.builder.entry_points().get(name)
    }

    /// Returns the root of the named stream, if any rule reads it.
    #[must_use]
    pub fn stream_root(&self, name: &str) -> Option<NodeId> {
        self.builder.streams().get(name)
    }

    /// Returns the compiled rules in the order they were added.
    #[must_use]
    pub fn rules(&self) -> &[RuleHandle] {
        &self.rules
    }

    /// Returns the first compiled rule with the given name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&RuleHandle> {
        self.rules.iter().find(|r| &*r.name == name)
    }

    /// Returns the number of nodes in the network.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.builder.network().len()
    }

    /// Returns one past the largest node id handed out, including ids of
    /// nodes that were shared or rolled back.
    #[must_use]
    pub fn high_water_mark(&self) -> u32 {
        self.builder.high_water_mark()
    }

    /// Returns the build configuration.
    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        self.builder.config()
    }

    /// Returns the build tracer.
    #[must_use]
    pub fn tracer(&self) -> &BuildTracer {
        self.builder.tracer()
    }

    /// Returns the build tracer mutably.
    pub fn tracer_mut(&mut self) -> &mut BuildTracer {
        self.builder.tracer_mut()
    }

    /// Returns the underlying builder.
    #[must_use]
    pub fn builder(&self) -> &ReteBuilder {
        &self.builder
    }
}
