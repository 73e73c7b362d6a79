//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Fact, ObjectType, Error, and persistent collections.

mod errors;
mod facts;
mod values;
