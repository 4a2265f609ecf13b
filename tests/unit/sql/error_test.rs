use veloquery::sql::error::SqlError;

#[test]
fn test_error_display_formats() {
    assert_eq!(
        SqlError::configuration_error("Unknown window 'w'").to_string(),
        "Configuration error: Unknown window 'w'"
    );
    assert_eq!(
        SqlError::parse_error("Empty sort key", None).to_string(),
        "Parse error: Empty sort key"
    );
    assert_eq!(
        SqlError::execution_error("stage failed", Some("join".to_string())).to_string(),
        "Query execution error in 'join': stage failed"
    );
    assert_eq!(
        SqlError::type_error("NUMBER", "STRING", Some("abc".to_string())).to_string(),
        "Type error: expected NUMBER, got STRING"
    );
}

#[test]
fn test_configuration_category() {
    assert!(SqlError::configuration_error("x").is_configuration_error());
    assert!(!SqlError::parse_error("x", Some(1)).is_configuration_error());
}
