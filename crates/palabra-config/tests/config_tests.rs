// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Palabra configuration system.

use std::io::Write;

use palabra_config::diagnostic::ConfigError;
use palabra_config::model::PalabraConfig;
use palabra_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_palabra_config() {
    let toml = r#"
[agent]
name = "legalito"
log_level = "debug"
system_prompt = "Eres un abogado."
disclaimer = "Solo fines informativos."

[session]
principal = "uid-123"

[completion]
api_key = "gsk-test"
base_url = "http://localhost:9000/v1/chat/completions"
model = "llama-3.1-8b-instant"
timeout_secs = 20

[log]
database_path = "/tmp/test.db"
collection = "audit"
wal_mode = false

[notices]
http_error = "Falló con {status}"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "legalito");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.agent.system_prompt.as_deref(), Some("Eres un abogado."));
    assert_eq!(config.agent.disclaimer.as_deref(), Some("Solo fines informativos."));
    assert_eq!(config.session.principal.as_deref(), Some("uid-123"));
    assert_eq!(config.completion.api_key.as_deref(), Some("gsk-test"));
    assert_eq!(config.completion.model, "llama-3.1-8b-instant");
    assert_eq!(config.completion.timeout_secs, Some(20));
    assert_eq!(config.log.database_path, "/tmp/test.db");
    assert_eq!(config.log.collection, "audit");
    assert!(!config.log.wal_mode);
    assert_eq!(config.notices.http_error, "Falló con {status}");
    // Untouched notices keep their defaults.
    assert!(config.notices.empty_response.starts_with("No se recibió"));
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "palabra");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.agent.system_prompt.is_none());
    assert!(config.session.principal.is_none());
    assert!(config.completion.api_key.is_none());
    assert_eq!(
        config.completion.base_url,
        "https://api.groq.com/openai/v1/chat/completions"
    );
    assert_eq!(config.completion.model, "llama-3.3-70b-versatile");
    assert!(config.completion.timeout_secs.is_none());
    assert_eq!(config.log.collection, "chat-messages");
    assert!(config.log.database_path.ends_with("palabra.db"));
    assert!(config.log.wal_mode);
    assert!(config.notices.http_error.contains("{status}"));
}

/// Unknown field in [completion] is rejected.
#[test]
fn unknown_field_in_completion_produces_error() {
    let toml = r#"
[completion]
modle = "llama"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("modle"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[firebase]
project = "x"
"#;

    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("firebase"),
        "got: {err_str}"
    );
}

/// A dotted override (what the env provider produces) beats the TOML value.
#[test]
fn dotted_override_beats_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[completion]
model = "from-toml"
"#;

    let config: PalabraConfig = Figment::new()
        .merge(Serialized::defaults(PalabraConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("completion.model", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.completion.model, "from-env");
}

/// Unknown key diagnostics carry a suggestion and the valid keys.
#[test]
fn diagnostic_error_includes_unknown_key_and_suggestion() {
    let toml = r#"
[log]
colection = "x"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "colection"
                && suggestion.as_deref() == Some("collection")
                && valid_keys.contains("database_path")
        })
    });
    assert!(found, "expected UnknownKey for `colection`, got: {errors:?}");
}

/// Invalid type produces an InvalidType diagnostic.
#[test]
fn diagnostic_invalid_type() {
    let toml = r#"
[completion]
timeout_secs = "soon"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("timeout_secs"))),
        "got: {errors:?}"
    );
}

/// Validation failures surface through load_and_validate_str.
#[test]
fn validation_catches_template_without_status() {
    let toml = r#"
[notices]
http_error = "Error genérico"
"#;

    let errors = load_and_validate_str(toml).expect_err("template without {status} should fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("notices.http_error"))
    ));
}

/// ConfigError renders through miette's graphical handler with its help text.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "modle".to_string(),
        suggestion: Some("model".to_string()),
        valid_keys: "api_key, base_url, model, timeout_secs".to_string(),
        span: None,
        src: None,
    };

    let help = error.help().expect("should have help").to_string();
    assert!(help.contains("did you mean `model`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("modle"));
}

/// An explicit config file is loaded and validated.
#[test]
fn load_and_validate_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[agent]\nname = \"from-file\"\n\n[log]\ncollection = \"c1\"").unwrap();

    let config = load_and_validate_path(file.path()).expect("file should load");
    assert_eq!(config.agent.name, "from-file");
    assert_eq!(config.log.collection, "c1");
}

/// A missing explicit config file is an error, not silently defaulted.
#[test]
fn load_and_validate_missing_path_fails() {
    let errors = load_and_validate_path(std::path::Path::new("/nonexistent/palabra.toml"))
        .expect_err("missing file should fail");
    assert!(matches!(&errors[0], ConfigError::Other(msg) if msg.contains("does not exist")));
}
