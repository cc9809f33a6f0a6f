use judge_core::{ProducerFailure, GENERIC_FAILURE_MESSAGE};
use serde_json::json;

#[test]
fn server_message_wins() {
    let failure = ProducerFailure::structured(
        Some(400),
        json!({ "message": "X" }),
        "Request failed with status code 400",
    );
    assert_eq!(failure.normalized_message(), "X");
    assert_eq!(failure.status(), Some(400));
    assert_eq!(failure.to_string(), "X");
}

#[test]
fn own_message_used_without_payload_message() {
    assert_eq!(ProducerFailure::message("Y").normalized_message(), "Y");

    let failure = ProducerFailure::structured(Some(502), json!("<html>bad gateway</html>"), "Y");
    assert_eq!(failure.normalized_message(), "Y");

    let failure = ProducerFailure::structured(Some(500), json!({ "message": "" }), "Y");
    assert_eq!(failure.normalized_message(), "Y");
}

#[test]
fn generic_fallback_when_nothing_usable() {
    assert_eq!(ProducerFailure::opaque().normalized_message(), GENERIC_FAILURE_MESSAGE);
    assert_eq!(ProducerFailure::message("").normalized_message(), GENERIC_FAILURE_MESSAGE);
    assert_eq!(GENERIC_FAILURE_MESSAGE, "An unexpected error occurred.");
}

#[test]
fn wraps_foreign_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
    assert_eq!(ProducerFailure::from_error(&io).normalized_message(), "disk on fire");
}
