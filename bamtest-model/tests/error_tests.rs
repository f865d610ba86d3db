use bamtest_model::ModelError;

#[test]
fn error_display_id_already_assigned() {
    let err = ModelError::IdAlreadyAssigned {
        username: "ABCDE".into(),
        current: 1,
        attempted: 2,
    };
    let msg = format!("{err}");
    assert!(msg.contains("ABCDE"));
    assert!(msg.contains("already has id 1"));
    assert!(msg.contains("2"));
}

#[test]
fn error_display_account_key_mismatch() {
    let err = ModelError::AccountKeyMismatch {
        key: "4".into(),
        account_id: 3,
    };
    let msg = format!("{err}");
    assert!(msg.contains("\"4\""));
    assert!(msg.contains("has id 3"));
}

#[test]
fn error_display_type_mismatch() {
    let err = ModelError::TypeMismatch {
        found: "array".into(),
        reason: "expected a JSON object".into(),
    };
    assert!(format!("{err}").contains("cannot reconcile BankAccount with array"));
}

#[test]
fn error_from_serde_json() {
    let serde_err: Result<serde_json::Value, _> = serde_json::from_str("not json");
    let err: ModelError = serde_err.unwrap_err().into();
    assert!(format!("{err}").contains("serialization"));
}
