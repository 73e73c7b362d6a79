//! The condition-tree compiler.
//!
//! [`ReteBuilder`] walks a rule's condition tree left to right and grows the
//! shared network it owns. For each pattern it:
//!
//! 1. builds the implicit initial-fact pattern if the pattern needs a tuple
//!    stream and none exists yet
//! 2. resolves the data source to a shared root and object-type node
//! 3. classifies the pattern's constraints and appends alpha filters
//! 4. builds the pattern's single beta node (or a left-input adapter for a
//!    rule's first plain pattern) and moves the tuple cursor onto it
//!
//! After the view, one terminal node is attached at the tuple cursor.

mod composite;

use std::sync::Arc;

use log::{debug, trace, warn};
use trellis_foundation::{Error, ObjectType, Result};
use trellis_model::{
    Condition, DEFAULT_ENTRY_POINT, Invocation, Pattern, PatternKind, Rule, SingleConstraint,
    Variable,
};

use crate::classify;
use crate::config::BuildConfig;
use crate::context::BuildContext;
use crate::factory::{NodeFactory, ReteNodeFactory};
use crate::network::Network;
use crate::node::{ArgRef, BetaConstraints, BoundConstraint, Node, NodeId, NodeKind};
use crate::registry::{IdGenerator, RootRegistry};
use crate::trace::BuildTracer;

// =============================================================================
// Rule Handle
// =============================================================================

/// A successfully compiled rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleHandle {
    /// Rule name.
    pub name: Arc<str>,
    /// Rule priority.
    pub salience: i32,
    /// The rule's terminal node.
    pub terminal: NodeId,
    /// Order in which the rule was added, starting at 1.
    pub sequence: u64,
}

// =============================================================================
// Builder
// =============================================================================

/// Compiles rules into a shared Rete network.
///
/// The network, both root registries, and the id allocator are owned here
/// and persist across `add_rule` calls. Callers serialize compilation
/// through `&mut self`.
pub struct ReteBuilder {
    network: Network,
    entry_points: RootRegistry,
    streams: RootRegistry,
    ids: IdGenerator,
    factory: Box<dyn NodeFactory>,
    config: BuildConfig,
    tracer: BuildTracer,
    compiled: u64,
}

impl ReteBuilder {
    /// Creates a builder using the default node factory.
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self::with_factory(config, Box::new(ReteNodeFactory))
    }

    /// Creates a builder materializing nodes through `factory`.
    #[must_use]
    pub fn with_factory(config: BuildConfig, factory: Box<dyn NodeFactory>) -> Self {
        let tracer = BuildTracer::new(config.tracer.clone());
        Self {
            network: Network::new(),
            entry_points: RootRegistry::new(),
            streams: RootRegistry::new(),
            ids: IdGenerator::new(),
            factory,
            config,
            tracer,
            compiled: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the shared network.
    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Returns the entry-point registry.
    #[must_use]
    pub fn entry_points(&self) -> &RootRegistry {
        &self.entry_points
    }

    /// Returns the stream registry.
    #[must_use]
    pub fn streams(&self) -> &RootRegistry {
        &self.streams
    }

    /// Returns one past the largest node id handed out.
    #[must_use]
    pub fn high_water_mark(&self) -> u32 {
        self.ids.high_water_mark()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Returns the build tracer.
    #[must_use]
    pub fn tracer(&self) -> &BuildTracer {
        &self.tracer
    }

    /// Returns the build tracer mutably.
    pub fn tracer_mut(&mut self) -> &mut BuildTracer {
        &mut self.tracer
    }

    // -------------------------------------------------------------------------
    // Rules
    // -------------------------------------------------------------------------

    /// Compiles a rule into the shared network.
    ///
    /// # Errors
    /// Any failure aborts the whole rule and carries the rule name and the
    /// condition frames open at the point of failure. With
    /// `rollback_on_failure` the nodes attached by this call are removed;
    /// otherwise they stay in the network.
    pub fn add_rule(&mut self, rule: &Rule) -> Result<RuleHandle> {
        self.compiled += 1;
        self.tracer.rule_start(&rule.name);
        debug!("compiling rule {}", rule.name);

        let before = self.network.len();
        if self.config.rollback_on_failure {
            self.network.begin();
        }
        let mut ctx = BuildContext::new(Arc::clone(&rule.name));

        match self.build_rule(rule, &mut ctx) {
            Ok(terminal) => {
                self.network.commit();
                self.tracer.rule_complete(&rule.name, terminal);
                debug!(
                    "rule {} compiled to terminal {terminal} ({} new node(s))",
                    rule.name,
                    self.network.len().saturating_sub(before)
                );
                Ok(RuleHandle {
                    name: Arc::clone(&rule.name),
                    salience: rule.salience,
                    terminal,
                    sequence: self.compiled,
                })
            }
            Err(err) => {
                let err = err.with_context(ctx.error_context());
                let message = err.to_string();
                self.tracer.rule_failed(&rule.name, &message);
                if self.config.rollback_on_failure {
                    let removed = self.network.rollback();
                    self.entry_points.prune(&removed);
                    self.streams.prune(&removed);
                    self.tracer.rolled_back(&rule.name, removed.len());
                    warn!(
                        "rule {} failed, {} node(s) rolled back: {message}",
                        rule.name,
                        removed.len()
                    );
                } else {
                    warn!("rule {} failed, network left partially built: {message}", rule.name);
                }
                Err(err)
            }
        }
    }

    fn build_rule(&mut self, rule: &Rule, ctx: &mut BuildContext) -> Result<NodeId> {
        self.compile(&rule.view, ctx)?;
        if ctx.tuple_cursor().is_none() {
            self.build_initial_fact_pattern(ctx)?;
        }
        ctx.check_pattern_complete()?;
        self.build_terminal(rule, ctx)
    }

    /// Compiles a condition against `ctx`.
    ///
    /// # Errors
    /// `Or` and `ObjectPath` are unsupported; pattern failures propagate.
    pub fn compile(&mut self, condition: &Condition, ctx: &mut BuildContext) -> Result<()> {
        match condition {
            Condition::Pattern(pattern) => {
                let index = ctx.next_pattern();
                ctx.push_frame(format!(
                    "{} #{index} ?{}",
                    pattern.kind().name(),
                    pattern.variable().name()
                ));
                self.build_pattern(pattern, ctx)?;
                ctx.pop_frame();
            }
            Condition::And(children) => {
                ctx.push_frame("and");
                for child in children {
                    self.compile(child, ctx)?;
                }
                ctx.pop_frame();
            }
            Condition::Or(_) => {
                ctx.push_frame("or");
                return Err(Error::unsupported("disjunction (or)"));
            }
            Condition::ObjectPath(path) => {
                ctx.push_frame("object-path");
                return Err(Error::unsupported(format!(
                    "object path from {:?}",
                    path.root
                )));
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Patterns
    // -------------------------------------------------------------------------

    fn build_pattern(&mut self, pattern: &Pattern, ctx: &mut BuildContext) -> Result<()> {
        if pattern.kind().needs_tuple_input() && ctx.tuple_cursor().is_none() {
            self.build_initial_fact_pattern(ctx)?;
        }

        match pattern.kind() {
            PatternKind::Invoker(invocation) => self.build_invoker(pattern, invocation, ctx)?,
            PatternKind::Plain => {
                let constraints = self.build_alpha_network(pattern, ctx)?;
                self.build_plain(pattern, constraints, ctx)?;
            }
            PatternKind::Existential(kind) => {
                let constraints = self.build_alpha_network(pattern, ctx)?;
                self.build_existential(*kind, constraints, ctx)?;
            }
            PatternKind::Accumulate(bindings) => {
                let constraints = self.build_alpha_network(pattern, ctx)?;
                self.build_accumulate(bindings, constraints, ctx)?;
            }
        }
        ctx.check_pattern_complete()
    }

    /// Resolves the source, attaches alpha filters, and returns the bound
    /// beta constraints for the pattern's beta node.
    fn build_alpha_network(
        &mut self,
        pattern: &Pattern,
        ctx: &mut BuildContext,
    ) -> Result<BetaConstraints> {
        self.resolve_source(pattern, ctx)?;

        let classified = classify::partition(pattern.constraint_ref(), pattern.variable(), ctx)?;
        for constant in &classified.constant {
            trace!("skipping constant constraint {}", constant.predicate.key());
            self.tracer.constraint_skipped(constant.predicate.key());
        }
        for alpha in &classified.alpha {
            self.attach_alpha(alpha, ctx)?;
        }
        bind_constraints(&classified.beta, pattern.variable(), ctx)
    }

    fn resolve_source(&mut self, pattern: &Pattern, ctx: &mut BuildContext) -> Result<()> {
        let source = pattern.source();
        let object_type = pattern.variable().object_type();

        if source.is_stream() {
            let root = self.stream_root(source.name(), object_type)?;
            ctx.set_entry_point(None);
            ctx.set_object_cursor(root);
            let root_type = match self.network.node(root).map(Node::kind) {
                Some(NodeKind::StreamRoot { object_type, .. }) => object_type.clone(),
                _ => {
                    return Err(Error::structural(format!(
                        "stream {} is registered at {root}, which is not a stream root",
                        source.name()
                    )));
                }
            };
            // The root already narrows to its own type; only a broader
            // root can be narrowed further.
            if root_type != *object_type {
                if !root_type.accepts(object_type) {
                    return Err(Error::unsupported(format!(
                        "stream {} carries {root_type}, cannot read it as {object_type}",
                        source.name()
                    )));
                }
                let narrowed = self.object_type_node(root, object_type)?;
                ctx.set_object_cursor(narrowed);
            }
        } else {
            let root = self.entry_point_root(source.name())?;
            ctx.set_entry_point(Some(root));
            ctx.set_object_cursor(root);
            let narrowed = self.object_type_node(root, object_type)?;
            ctx.set_object_cursor(narrowed);
        }
        Ok(())
    }

    fn attach_alpha(&mut self, constraint: &SingleConstraint, ctx: &mut BuildContext) -> Result<()> {
        let parent = ctx.require_object_cursor("alpha filter")?;
        let node = self.factory.create_alpha_filter(
            self.ids.next_id()?,
            parent,
            &constraint.predicate,
            constraint.variables.len(),
        )?;
        let id = self.place(node, self.config.share_alpha_nodes)?;
        ctx.set_object_cursor(id);
        Ok(())
    }

    fn build_plain(
        &mut self,
        pattern: &Pattern,
        constraints: BetaConstraints,
        ctx: &mut BuildContext,
    ) -> Result<()> {
        if ctx.tuple_cursor().is_none() {
            self.ensure_left_input_adapter(ctx)?;
        } else {
            let tuple = ctx.require_tuple_cursor("join")?;
            let object = ctx.require_object_cursor("join")?;
            let node =
                self.factory
                    .create_join(self.ids.next_id()?, tuple, object, constraints)?;
            let id = self.place(node, self.config.share_beta_nodes)?;
            ctx.absorb(id);
        }
        ctx.bind(pattern.variable());
        Ok(())
    }

    fn build_invoker(
        &mut self,
        pattern: &Pattern,
        invocation: &Invocation,
        ctx: &mut BuildContext,
    ) -> Result<()> {
        let tuple = ctx.require_tuple_cursor("invocation")?;
        let args = invocation
            .params()
            .iter()
            .map(|param| ctx.require_offset(param, invocation.key()))
            .collect::<Result<Vec<_>>>()?;

        // No alpha chain: every constraint is checked against the result.
        let mut singles = Vec::new();
        for single in pattern.constraint_ref().singles() {
            if single.is_constant() {
                self.tracer.constraint_skipped(single.predicate.key());
            } else {
                singles.push(single);
            }
        }
        let constraints = bind_constraints(&singles, pattern.variable(), ctx)?;

        let node = self.factory.create_invoker(
            self.ids.next_id()?,
            tuple,
            invocation,
            args,
            constraints,
        )?;
        let id = self.place(node, self.config.share_beta_nodes)?;
        ctx.absorb(id);
        ctx.bind(pattern.variable());
        Ok(())
    }

    fn build_initial_fact_pattern(&mut self, ctx: &mut BuildContext) -> Result<()> {
        let root = self.entry_point_root(DEFAULT_ENTRY_POINT)?;
        ctx.set_entry_point(Some(root));
        let narrowed = self.object_type_node(root, &ObjectType::InitialFact)?;
        ctx.set_object_cursor(narrowed);
        self.tracer.initial_fact_inserted(narrowed);
        self.ensure_left_input_adapter(ctx)?;
        ctx.reserve_offset();
        Ok(())
    }

    fn build_terminal(&mut self, rule: &Rule, ctx: &mut BuildContext) -> Result<NodeId> {
        ctx.push_frame("consequence");
        let tuple = ctx.require_tuple_cursor("terminal")?;
        let bindings = rule
            .consequence
            .bindings()
            .iter()
            .map(|variable| ctx.require_offset(variable, "consequence"))
            .collect::<Result<Vec<_>>>()?;
        let node = self.factory.create_terminal(
            self.ids.next_id()?,
            tuple,
            Arc::clone(&rule.name),
            rule.salience,
            &rule.consequence,
            bindings,
        )?;
        let id = self.place(node, false)?;
        ctx.pop_frame();
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Shared upstream nodes
    // -------------------------------------------------------------------------

    /// Inserts a left-input adapter at the object cursor unless a tuple
    /// cursor already exists. Returns the tuple cursor.
    ///
    /// # Errors
    /// Fails if neither cursor is set or the object chain never reaches an
    /// object-type node.
    pub fn ensure_left_input_adapter(&mut self, ctx: &mut BuildContext) -> Result<NodeId> {
        if let Some(tuple) = ctx.tuple_cursor() {
            return Ok(tuple);
        }
        let object = ctx.require_object_cursor("left-input adapter")?;
        let root = self.network.object_type_root(object).ok_or_else(|| {
            Error::structural(format!(
                "object chain from {object} never reaches an object-type node"
            ))
        })?;
        ctx.set_root_object_type(root);

        let node = self
            .factory
            .create_left_input_adapter(self.ids.next_id()?, object)?;
        let id = self.place(node, self.config.share_beta_nodes)?;
        self.tracer.adapter_inserted(id, root);
        ctx.absorb(id);
        Ok(id)
    }

    /// Returns the shared root of a polled entry point, creating it on
    /// first use.
    ///
    /// # Errors
    /// Propagates node factory failures.
    pub fn entry_point_root(&mut self, name: &str) -> Result<NodeId> {
        if let Some(root) = self.entry_points.get(name) {
            self.tracer.node(root, "entry-point", true);
            return Ok(root);
        }
        let node = self
            .factory
            .create_entry_point_root(self.ids.next_id()?, name)?;
        let id = self.place(node, false)?;
        self.entry_points.insert(name, id);
        debug!("entry point {name} rooted at {id}");
        Ok(id)
    }

    /// Returns the shared root of a reactive stream, creating it with
    /// `object_type` on first use.
    ///
    /// # Errors
    /// Propagates node factory failures.
    pub fn stream_root(&mut self, name: &str, object_type: &ObjectType) -> Result<NodeId> {
        if let Some(root) = self.streams.get(name) {
            self.tracer.node(root, "stream", true);
            return Ok(root);
        }
        let node = self
            .factory
            .create_stream_root(self.ids.next_id()?, name, object_type)?;
        let id = self.place(node, false)?;
        self.streams.insert(name, id);
        debug!("stream {name} of {object_type} rooted at {id}");
        Ok(id)
    }

    /// Returns the object-type node for `object_type` beneath `root`,
    /// creating it on first use.
    ///
    /// # Errors
    /// Propagates node factory and attach failures.
    pub fn object_type_node(&mut self, root: NodeId, object_type: &ObjectType) -> Result<NodeId> {
        if let Some(existing) = self.network.object_type_node(root, object_type) {
            self.tracer.node(existing, "object-type", true);
            return Ok(existing);
        }
        let node = self
            .factory
            .create_object_type_filter(self.ids.next_id()?, root, object_type)?;
        self.place(node, true)
    }

    /// Attaches a factory-built node and records the outcome.
    fn place(&mut self, node: Node, share: bool) -> Result<NodeId> {
        let kind = node.kind().name();
        let attached = self.network.attach(node, share)?;
        self.tracer.node(attached.id, kind, attached.shared);
        if attached.shared {
            trace!("reusing {kind} node {}", attached.id);
        } else {
            trace!("created {kind} node {}", attached.id);
        }
        Ok(attached.id)
    }
}

impl std::fmt::Debug for ReteBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReteBuilder")
            .field("nodes", &self.network.len())
            .field("entry_points", &self.entry_points)
            .field("streams", &self.streams)
            .field("high_water_mark", &self.ids.high_water_mark())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ReteBuilder {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}

/// Resolves each constraint's variables to tuple offsets, with the
/// pattern's own variable read from the joined object.
fn bind_constraints(
    singles: &[&SingleConstraint],
    own: &Variable,
    ctx: &BuildContext,
) -> Result<BetaConstraints> {
    singles
        .iter()
        .map(|single| {
            let args = single
                .variables
                .iter()
                .map(|variable| {
                    if variable == own {
                        Ok(ArgRef::Object)
                    } else {
                        ctx.require_offset(variable, single.predicate.key())
                            .map(ArgRef::Tuple)
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(BoundConstraint {
                predicate: single.predicate.clone(),
                args,
            })
        })
        .collect()
}
