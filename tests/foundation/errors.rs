//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use trellis_foundation::{Error, ErrorContext, ErrorKind, ObjectType, SemanticLimit};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_unsupported_construct() {
    let err = Error::unsupported("disjunction (or)");
    assert!(err.is_unsupported());
    assert!(!err.is_structural());
    assert!(format!("{err}").contains("disjunction"));
}

#[test]
fn error_structural_violation() {
    let err = Error::structural("join needs a tuple cursor");
    assert!(err.is_structural());
    assert!(matches!(err.kind, ErrorKind::StructuralViolation(_)));
}

#[test]
fn error_evaluator_failure() {
    let err = Error::evaluator("age > 30", "field missing");
    let msg = format!("{err}");
    assert!(msg.contains("age > 30"));
    assert!(msg.contains("field missing"));
}

#[test]
fn error_unknown_entry_point() {
    let err = Error::unknown_entry_point("sensors");
    assert!(matches!(err.kind, ErrorKind::UnknownEntryPoint(ref name) if name == "sensors"));
}

#[test]
fn error_limit_exceeded() {
    let err = Error::limit_exceeded(SemanticLimit::MaxActivations {
        limit: 5,
        context: Some("loop".to_string()),
    });
    let msg = format!("{err}");
    assert!(msg.contains("max activations (5)"));
    assert!(msg.contains("loop"));
}

// =============================================================================
// Error Display
// =============================================================================

#[test]
fn error_display_type_mismatch() {
    let err = Error::type_mismatch(ObjectType::Vec, ObjectType::fact("Person"));
    assert_eq!(format!("{err}"), "type mismatch: expected vec, got Person");
}

#[test]
fn error_context_display() {
    let ctx = ErrorContext::new()
        .with_rule("oldest")
        .with_frame("and")
        .with_frame("not #2 ?other");
    let rendered = format!("{ctx}");
    assert!(rendered.starts_with("in rule oldest"));
    assert!(rendered.contains("  at and"));
    assert!(rendered.contains("  at not #2 ?other"));
}

#[test]
fn error_context_attaches() {
    let err = Error::unsupported("object path").with_context(ErrorContext::new().with_rule("r"));
    assert_eq!(err.context.and_then(|c| c.rule).as_deref(), Some("r"));
}
