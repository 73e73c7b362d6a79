//! The shared network arena.
//!
//! Nodes are stored by id with explicit parent links, so upward walks are
//! lookups. The network persists across rule compilations; `attach` is the
//! only way nodes enter it and always tries to reuse an equivalent child of
//! the same parent first.

use std::collections::BTreeMap;

use trellis_foundation::{Error, ObjectType, Result};

use crate::node::{Node, NodeId, NodeKind};

/// Outcome of [`Network::attach`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Attached {
    /// The node now standing for the request.
    pub id: NodeId,
    /// True if an existing node was reused.
    pub shared: bool,
}

/// Arena of nodes addressed by [`NodeId`].
#[derive(Clone, Debug, Default)]
pub struct Network {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    /// Ids inserted since [`begin`](Self::begin), oldest first.
    journal: Option<Vec<NodeId>>,
}

impl Network {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Inserts `node`, or returns an equivalent child of the same parent
    /// when `share` is set.
    ///
    /// A node whose id is already present is treated as shared, so a
    /// factory may hand back an existing node.
    ///
    /// # Errors
    /// Fails if a parent is not in the network.
    pub fn attach(&mut self, node: Node, share: bool) -> Result<Attached> {
        if self.nodes.contains_key(&node.id()) {
            return Ok(Attached {
                id: node.id(),
                shared: true,
            });
        }
        for parent in node.parents() {
            if !self.nodes.contains_key(&parent) {
                return Err(Error::structural(format!(
                    "{} node {} attached to missing parent {parent}",
                    node.kind().name(),
                    node.id()
                )));
            }
        }
        if share {
            if let Some(existing) = self.find_equivalent(&node) {
                return Ok(Attached {
                    id: existing,
                    shared: true,
                });
            }
        }

        let id = node.id();
        for parent in node.parents() {
            if let Some(parent) = self.nodes.get_mut(&parent) {
                parent.add_child(id);
            }
        }
        if node.kind().is_root() {
            self.roots.push(id);
        }
        if let Some(journal) = &mut self.journal {
            journal.push(id);
        }
        self.nodes.insert(id, node);
        Ok(Attached { id, shared: false })
    }

    fn find_equivalent(&self, node: &Node) -> Option<NodeId> {
        let candidates: &[NodeId] = match node.tuple_parent().or(node.object_parent()) {
            Some(parent) => self.nodes.get(&parent)?.children(),
            None => &self.roots,
        };
        candidates.iter().copied().find(|candidate| {
            self.nodes
                .get(candidate)
                .is_some_and(|existing| existing.is_equivalent(node))
        })
    }

    /// Starts recording inserted nodes so they can be rolled back.
    pub fn begin(&mut self) {
        self.journal = Some(Vec::new());
    }

    /// Stops recording and keeps everything inserted since `begin`.
    pub fn commit(&mut self) {
        self.journal = None;
    }

    /// Removes every node inserted since `begin`, newest first, and
    /// returns their ids. Returns nothing if no recording is active.
    pub fn rollback(&mut self) -> Vec<NodeId> {
        let Some(inserted) = self.journal.take() else {
            return Vec::new();
        };
        for id in inserted.iter().rev() {
            if let Some(node) = self.nodes.remove(id) {
                for parent in node.parents() {
                    if let Some(parent) = self.nodes.get_mut(&parent) {
                        parent.remove_child(*id);
                    }
                }
            }
        }
        self.roots.retain(|id| !inserted.contains(id));
        inserted
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Returns a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Returns a node's children, in attach order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(&id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the network has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns the root nodes (entry points and streams).
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Counts nodes whose [`NodeKind::name`] is `kind`.
    #[must_use]
    pub fn count_by_kind(&self, kind: &str) -> usize {
        self.nodes.values().filter(|n| n.kind().name() == kind).count()
    }

    /// Returns the object-type nodes directly beneath a root.
    #[must_use]
    pub fn object_type_nodes(&self, root: NodeId) -> Vec<NodeId> {
        self.children(root)
            .iter()
            .copied()
            .filter(|c| {
                self.node(*c)
                    .is_some_and(|n| matches!(n.kind(), NodeKind::ObjectType { .. }))
            })
            .collect()
    }

    /// Returns the object-type node for `object_type` beneath `root`.
    #[must_use]
    pub fn object_type_node(&self, root: NodeId, object_type: &ObjectType) -> Option<NodeId> {
        self.object_type_nodes(root).into_iter().find(|id| {
            self.node(*id).is_some_and(|n| {
                matches!(n.kind(), NodeKind::ObjectType { object_type: t } if t == object_type)
            })
        })
    }

    /// Walks object parents from `from` to the nearest object-type node or
    /// stream root, including `from` itself.
    #[must_use]
    pub fn object_type_root(&self, from: NodeId) -> Option<NodeId> {
        let mut current = from;
        // A chain can be at most as long as the network.
        for _ in 0..=self.nodes.len() {
            let node = self.nodes.get(&current)?;
            if node.kind().is_object_type_root() {
                return Some(current);
            }
            current = node.object_parent()?;
        }
        None
    }

    /// Returns the terminal nodes in id order.
    #[must_use]
    pub fn terminals(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| matches!(n.kind(), NodeKind::Terminal { .. }))
            .map(Node::id)
            .collect()
    }
}
