//! Rule activations.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use trellis_foundation::Value;
use trellis_network::NodeId;

use crate::evaluate::Token;

/// A complete match of one rule, ready to fire.
#[derive(Clone, Debug, PartialEq)]
pub struct Activation {
    /// Which rule
    pub rule: Arc<str>,
    /// Rule salience
    pub salience: i32,
    /// The rule's terminal node
    pub terminal: NodeId,
    /// Values of the consequence bindings, in order
    pub bindings: Vec<Value>,
    /// The full match
    pub token: Token,
}

impl Activation {
    /// Compute refraction key (terminal + full match).
    #[must_use]
    pub fn refraction_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.terminal.hash(&mut hasher);
        self.token.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::WorkingMemory;

    fn activation(values: Vec<Value>) -> Activation {
        let mut memory = WorkingMemory::new();
        let handle = memory.insert("DEFAULT", Value::Nil);
        Activation {
            rule: "r".into(),
            salience: 0,
            terminal: NodeId::new(4),
            bindings: values.clone(),
            token: Token {
                values,
                handles: vec![handle],
            },
        }
    }

    #[test]
    fn refraction_key_tracks_the_match() {
        let a = activation(vec![Value::Int(1)]);
        let b = activation(vec![Value::Int(1)]);
        let c = activation(vec![Value::Int(2)]);
        assert_eq!(a.refraction_key(), b.refraction_key());
        assert_ne!(a.refraction_key(), c.refraction_key());
    }
}
