//! Naive network evaluation.
//!
//! Walks the compiled network upward from a node and recomputes its output
//! from working memory. Results are cached per node for the lifetime of one
//! [`Evaluator`], so a shared node is evaluated once per pass however many
//! rules read it.

use std::collections::HashMap;

use trellis_foundation::{Error, ObjectType, Result, Value};
use trellis_network::{Network, Node, NodeId, NodeKind};

use crate::memory::{FactHandle, WorkingMemory};

// =============================================================================
// Token
// =============================================================================

/// A partial match: the tuple layout the compiler assigned, plus the
/// handles of the objects that were joined into it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    /// Tuple values by offset.
    pub values: Vec<Value>,
    /// Handles of the joined objects, in join order.
    pub handles: Vec<FactHandle>,
}

impl Token {
    fn extend(&self, value: Value, handle: Option<FactHandle>) -> Self {
        let mut next = self.clone();
        next.values.push(value);
        if let Some(handle) = handle {
            next.handles.push(handle);
        }
        next
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// One evaluation pass over a network.
pub struct Evaluator<'a> {
    network: &'a Network,
    memory: &'a WorkingMemory,
    objects: HashMap<NodeId, Vec<(FactHandle, Value)>>,
    tokens: HashMap<NodeId, Vec<Token>>,
}

impl<'a> Evaluator<'a> {
    /// Starts a pass over `network` reading `memory`.
    #[must_use]
    pub fn new(network: &'a Network, memory: &'a WorkingMemory) -> Self {
        Self {
            network,
            memory,
            objects: HashMap::new(),
            tokens: HashMap::new(),
        }
    }

    fn node(&self, id: NodeId) -> Result<&'a Node> {
        self.network
            .node(id)
            .ok_or_else(|| Error::structural(format!("node {id} is not in the network")))
    }

    // -------------------------------------------------------------------------
    // Object streams
    // -------------------------------------------------------------------------

    /// Objects passing node `id`.
    ///
    /// # Errors
    /// Fails on nodes that do not produce objects and on predicate failures.
    pub fn objects(&mut self, id: NodeId) -> Result<Vec<(FactHandle, Value)>> {
        if let Some(cached) = self.objects.get(&id) {
            return Ok(cached.clone());
        }
        let node = self.node(id)?;
        let out = match node.kind() {
            NodeKind::EntryPoint { name } => self.memory.entry_point(name).to_vec(),
            NodeKind::StreamRoot { name, object_type } => {
                narrow(self.memory.stream(name).to_vec(), object_type)
            }
            NodeKind::ObjectType { object_type } => {
                let parent = object_parent(node)?;
                narrow(self.objects(parent)?, object_type)
            }
            NodeKind::Alpha { predicate, arity } => {
                let parent = object_parent(node)?;
                let mut kept = Vec::new();
                for (handle, value) in self.objects(parent)? {
                    if predicate.test(&vec![value.clone(); *arity])? {
                        kept.push((handle, value));
                    }
                }
                kept
            }
            other => {
                return Err(Error::structural(format!(
                    "{} node {id} does not produce objects",
                    other.name()
                )));
            }
        };
        self.objects.insert(id, out.clone());
        Ok(out)
    }

    // -------------------------------------------------------------------------
    // Tuple streams
    // -------------------------------------------------------------------------

    /// Partial matches produced at node `id`.
    ///
    /// # Errors
    /// Fails on nodes that do not produce tuples and on constraint,
    /// aggregation, or invocation failures.
    pub fn tokens(&mut self, id: NodeId) -> Result<Vec<Token>> {
        if let Some(cached) = self.tokens.get(&id) {
            return Ok(cached.clone());
        }
        let node = self.node(id)?;
        let out = match node.kind() {
            NodeKind::LeftInputAdapter => self
                .objects(object_parent(node)?)?
                .into_iter()
                .map(|(handle, value)| Token {
                    values: vec![value],
                    handles: vec![handle],
                })
                .collect(),
            NodeKind::Join { constraints } => {
                let left = self.tokens(tuple_parent(node)?)?;
                let right = self.objects(object_parent(node)?)?;
                let mut out = Vec::new();
                for token in &left {
                    for (handle, value) in &right {
                        if constraints.is_satisfied(&token.values, Some(value))? {
                            out.push(token.extend(value.clone(), Some(*handle)));
                        }
                    }
                }
                out
            }
            NodeKind::Not { constraints } | NodeKind::Exists { constraints } => {
                let negated = matches!(node.kind(), NodeKind::Not { .. });
                let left = self.tokens(tuple_parent(node)?)?;
                let right = self.objects(object_parent(node)?)?;
                let mut out = Vec::new();
                for token in &left {
                    let mut found = false;
                    for (_, value) in &right {
                        if constraints.is_satisfied(&token.values, Some(value))? {
                            found = true;
                            break;
                        }
                    }
                    if found != negated {
                        out.push(token.extend(Value::Nil, None));
                    }
                }
                out
            }
            NodeKind::Accumulate {
                source_binder,
                results_binder,
                functions,
            } => {
                let left = self.tokens(tuple_parent(node)?)?;
                let right = self.objects(object_parent(node)?)?;
                let mut out = Vec::new();
                for token in &left {
                    let mut matching = Vec::new();
                    for (_, value) in &right {
                        if source_binder.is_satisfied(&token.values, Some(value))? {
                            matching.push(value);
                        }
                    }
                    let mut next = token.clone();
                    for spec in functions {
                        let function = spec.function.function();
                        let mut state = function.init();
                        for value in &matching {
                            function.accumulate(&mut state, value)?;
                        }
                        next.values.push(function.result(&state)?);
                    }
                    if results_binder.is_satisfied(&next.values, None)? {
                        out.push(next);
                    }
                }
                out
            }
            NodeKind::Invoker {
                invocation,
                args,
                constraints,
            } => {
                let left = self.tokens(tuple_parent(node)?)?;
                let mut out = Vec::new();
                for token in &left {
                    let params = args
                        .iter()
                        .map(|&offset| {
                            token.values.get(offset).cloned().ok_or_else(|| {
                                Error::structural(format!(
                                    "invocation {} reads offset {offset} of a {}-tuple",
                                    invocation.key(),
                                    token.values.len()
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    let result = invocation.call(&params)?;
                    let candidates = if invocation.is_iterable() {
                        match result {
                            Value::Vec(items) => items.iter().cloned().collect(),
                            Value::Nil => Vec::new(),
                            other => {
                                return Err(Error::type_mismatch(
                                    ObjectType::Vec,
                                    other.object_type(),
                                ));
                            }
                        }
                    } else {
                        vec![result]
                    };
                    for candidate in candidates {
                        if constraints.is_satisfied(&token.values, Some(&candidate))? {
                            out.push(token.extend(candidate, None));
                        }
                    }
                }
                out
            }
            other => {
                return Err(Error::structural(format!(
                    "{} node {id} does not produce tuples",
                    other.name()
                )));
            }
        };
        self.tokens.insert(id, out.clone());
        Ok(out)
    }
}

fn narrow(
    objects: Vec<(FactHandle, Value)>,
    object_type: &ObjectType,
) -> Vec<(FactHandle, Value)> {
    objects
        .into_iter()
        .filter(|(_, value)| object_type.accepts(&value.object_type()))
        .collect()
}

fn object_parent(node: &Node) -> Result<NodeId> {
    node.object_parent().ok_or_else(|| {
        Error::structural(format!(
            "{} node {} has no object parent",
            node.kind().name(),
            node.id()
        ))
    })
}

fn tuple_parent(node: &Node) -> Result<NodeId> {
    node.tuple_parent().ok_or_else(|| {
        Error::structural(format!(
            "{} node {} has no tuple parent",
            node.kind().name(),
            node.id()
        ))
    })
}
