//! The reference session.
//!
//! A [`Session`] holds working memory for one [`KnowledgeBase`] and fires
//! its rules. Matching recomputes every terminal's tuple stream on each
//! pass instead of propagating changes through node memories.

use std::cmp::Reverse;
use std::collections::HashSet;

use log::{debug, trace};
use trellis_foundation::{Error, ErrorContext, Fact, Result, SemanticLimit, Value};
use trellis_model::DEFAULT_ENTRY_POINT;
use trellis_network::{KnowledgeBase, NodeKind};

use crate::activation::Activation;
use crate::config::SessionConfig;
use crate::evaluate::Evaluator;
use crate::memory::{FactHandle, WorkingMemory};

/// Working memory plus agenda state over one knowledge base.
#[derive(Debug)]
pub struct Session<'kb> {
    kb: &'kb KnowledgeBase,
    memory: WorkingMemory,
    config: SessionConfig,
    /// Refracted activations (already fired this session)
    refracted: HashSet<u64>,
    /// Activations fired, in order
    history: Vec<Activation>,
}

impl<'kb> Session<'kb> {
    /// Opens a session with the default configuration.
    #[must_use]
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self::with_config(kb, SessionConfig::default())
    }

    /// Opens a session. The initial fact is inserted into the default
    /// entry point.
    #[must_use]
    pub fn with_config(kb: &'kb KnowledgeBase, config: SessionConfig) -> Self {
        let mut memory = WorkingMemory::new();
        memory.insert(DEFAULT_ENTRY_POINT, Value::from(Fact::initial()));
        debug!("session opened over {} rule(s)", kb.rules().len());
        Self {
            kb,
            memory,
            config,
            refracted: HashSet::new(),
            history: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Working memory
    // -------------------------------------------------------------------------

    /// Inserts into the default entry point.
    pub fn insert(&mut self, value: impl Into<Value>) -> FactHandle {
        let handle = self.memory.insert(DEFAULT_ENTRY_POINT, value.into());
        trace!("inserted {handle} into {DEFAULT_ENTRY_POINT}");
        handle
    }

    /// Inserts into a named entry point.
    ///
    /// # Errors
    /// Fails if no compiled rule reads the entry point.
    pub fn insert_into(
        &mut self,
        entry_point: &str,
        value: impl Into<Value>,
    ) -> Result<FactHandle> {
        if entry_point != DEFAULT_ENTRY_POINT && self.kb.entry_point(entry_point).is_none() {
            return Err(Error::unknown_entry_point(entry_point));
        }
        let handle = self.memory.insert(entry_point, value.into());
        trace!("inserted {handle} into {entry_point}");
        Ok(handle)
    }

    /// Emits a value onto a stream.
    ///
    /// # Errors
    /// Fails if no compiled rule reads the stream.
    pub fn emit(&mut self, stream: &str, value: impl Into<Value>) -> Result<FactHandle> {
        if self.kb.stream_root(stream).is_none() {
            return Err(Error::unknown_entry_point(stream));
        }
        let handle = self.memory.emit(stream, value.into());
        trace!("emitted {handle} on {stream}");
        Ok(handle)
    }

    /// Retracts an inserted or emitted object. Returns false for unknown
    /// handles.
    pub fn retract(&mut self, handle: FactHandle) -> bool {
        let removed = self.memory.retract(handle).is_some();
        if removed {
            trace!("retracted {handle}");
        }
        removed
    }

    /// Returns working memory.
    #[must_use]
    pub fn memory(&self) -> &WorkingMemory {
        &self.memory
    }

    /// Returns the knowledge base.
    #[must_use]
    pub fn knowledge_base(&self) -> &'kb KnowledgeBase {
        self.kb
    }

    // -------------------------------------------------------------------------
    // Agenda
    // -------------------------------------------------------------------------

    /// Current activations that have not fired yet, highest salience
    /// first. Ties keep rule order.
    ///
    /// # Errors
    /// Propagates evaluation failures with the reading rule as context.
    pub fn agenda(&self) -> Result<Vec<Activation>> {
        let network = self.kb.network();
        let mut eval = Evaluator::new(network, &self.memory);
        let mut activations = Vec::new();

        for terminal in network.terminals() {
            let Some(node) = network.node(terminal) else {
                continue;
            };
            let NodeKind::Terminal {
                rule,
                salience,
                bindings,
                ..
            } = node.kind()
            else {
                continue;
            };
            let in_rule = |e: Error| e.with_context(ErrorContext::new().with_rule(rule.as_ref()));
            let parent = node.tuple_parent().ok_or_else(|| {
                in_rule(Error::structural(format!(
                    "terminal {terminal} has no tuple parent"
                )))
            })?;
            let tokens = eval.tokens(parent).map_err(in_rule)?;

            for token in tokens {
                let values = bindings
                    .iter()
                    .map(|&offset| {
                        token.values.get(offset).cloned().ok_or_else(|| {
                            in_rule(Error::structural(format!(
                                "binding offset {offset} is outside a {}-tuple",
                                token.values.len()
                            )))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let activation = Activation {
                    rule: rule.clone(),
                    salience: *salience,
                    terminal,
                    bindings: values,
                    token,
                };
                if !self.refracted.contains(&activation.refraction_key()) {
                    activations.push(activation);
                }
            }
        }

        activations.sort_by_key(|a| (Reverse(a.salience), a.terminal));
        Ok(activations)
    }

    /// Fires activations until the agenda is empty and returns how many
    /// fired.
    ///
    /// # Errors
    /// Fails if the kill switch trips or a consequence fails.
    pub fn fire_all_rules(&mut self) -> Result<usize> {
        let mut fired = 0;
        loop {
            let agenda = self.agenda()?;
            if agenda.is_empty() {
                break;
            }
            for activation in agenda {
                self.fire(activation)?;
                fired += 1;
            }
        }
        debug!("fired {fired} activation(s)");
        Ok(fired)
    }

    fn fire(&mut self, activation: Activation) -> Result<()> {
        // Check kill switch
        if self.history.len() >= self.config.max_activations {
            #[allow(clippy::cast_possible_truncation)]
            return Err(Error::limit_exceeded(SemanticLimit::MaxActivations {
                limit: self.config.max_activations as u32,
                context: Some(activation.rule.to_string()),
            }));
        }

        // Record refraction
        self.refracted.insert(activation.refraction_key());

        let node = self.kb.network().node(activation.terminal);
        if let Some(NodeKind::Terminal { consequence, .. }) = node.map(|n| n.kind()) {
            trace!("firing {} with {:?}", activation.rule, activation.bindings);
            consequence.execute(&activation.bindings).map_err(|e| {
                e.with_context(ErrorContext::new().with_rule(activation.rule.as_ref()))
            })?;
        }
        self.history.push(activation);
        Ok(())
    }

    /// Activations fired so far, in firing order.
    #[must_use]
    pub fn history(&self) -> &[Activation] {
        &self.history
    }

    /// Returns the number of activations fired so far.
    #[must_use]
    pub fn activation_count(&self) -> usize {
        self.history.len()
    }

    /// Names of the rules fired so far, in firing order.
    #[must_use]
    pub fn fired_rules(&self) -> Vec<&str> {
        self.history.iter().map(|a| a.rule.as_ref()).collect()
    }
}
