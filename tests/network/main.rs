//! Integration tests for Layer 2: Network
//!
//! Tests for node sharing, offset assignment, constraint classification,
//! adapter insertion, and failure handling.

mod classification;
mod failures;
mod fixtures;
mod offsets;
mod sharing;
