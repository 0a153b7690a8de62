// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `palabra doctor` command implementation.
//!
//! Runs diagnostic checks against the local environment to identify
//! configuration problems, a missing credential, or an unreadable log.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use palabra_config::PalabraConfig;
use palabra_core::{
    CompletionAdapter, ConversationLog, HealthStatus, PalabraError, PluginAdapter,
};
use palabra_openai::{API_KEY_ENV, OpenAiProvider};
use palabra_storage::SqliteLog;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `palabra doctor` command.
///
/// With `--plain`, disables colored output.
pub async fn run_doctor(
    config: &PalabraConfig,
    config_path: Option<&Path>,
    plain: bool,
) -> Result<(), PalabraError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_config(config_path).await,
        check_database(config).await,
        check_credential(config).await,
        check_system_prompt(config).await,
        check_endpoint(&config.completion.base_url).await,
    ];

    println!();
    println!("  palabra doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", render_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Re-load the configuration the same way startup did.
async fn check_config(path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let loaded = match path {
        Some(path) => palabra_config::load_and_validate_path(path),
        None => palabra_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Check the conversation log exists and answers queries.
async fn check_database(config: &PalabraConfig) -> CheckResult {
    let start = Instant::now();
    let path = &config.log.database_path;

    if !Path::new(path).exists() {
        return CheckResult::new(
            "Conversation log",
            CheckStatus::Warn,
            format!("not found at {path} (created on first message)"),
            start,
        );
    }

    let log = SqliteLog::new(config.log.clone());
    if let Err(e) = log.initialize().await {
        return CheckResult::new("Conversation log", CheckStatus::Fail, e.to_string(), start);
    }
    let result = match log.health_check().await {
        Ok(HealthStatus::Healthy) => {
            let count = log
                .records(&config.log.collection, None, None)
                .await
                .map(|r| r.len())
                .unwrap_or(0);
            CheckResult::new(
                "Conversation log",
                CheckStatus::Pass,
                format!("{count} record(s) in `{}`", config.log.collection),
                start,
            )
        }
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Conversation log", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Conversation log", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Conversation log", CheckStatus::Fail, e.to_string(), start),
    };
    let _ = log.shutdown().await;
    result
}

/// Check an API key can be resolved. No request is sent.
async fn check_credential(config: &PalabraConfig) -> CheckResult {
    let start = Instant::now();
    match OpenAiProvider::new(&config.completion) {
        Ok(provider) if provider.has_credential() => {
            CheckResult::new("Credential", CheckStatus::Pass, "API key configured", start)
        }
        Ok(_) => CheckResult::new(
            "Credential",
            CheckStatus::Warn,
            format!("no API key (set completion.api_key or {API_KEY_ENV})"),
            start,
        ),
        Err(e) => CheckResult::new("Credential", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Report where the system prompt comes from.
async fn check_system_prompt(config: &PalabraConfig) -> CheckResult {
    let start = Instant::now();
    if let Some(file) = &config.agent.system_prompt_file {
        return match tokio::fs::read_to_string(file).await {
            Ok(content) if !content.trim().is_empty() => CheckResult::new(
                "System prompt",
                CheckStatus::Pass,
                format!("{file} ({} bytes)", content.len()),
                start,
            ),
            Ok(_) => CheckResult::new(
                "System prompt",
                CheckStatus::Warn,
                format!("{file} is empty"),
                start,
            ),
            Err(e) => CheckResult::new(
                "System prompt",
                CheckStatus::Warn,
                format!("cannot read {file}: {e}"),
                start,
            ),
        };
    }
    match &config.agent.system_prompt {
        Some(prompt) if !prompt.trim().is_empty() => {
            CheckResult::new("System prompt", CheckStatus::Pass, "inline", start)
        }
        _ => CheckResult::new("System prompt", CheckStatus::Pass, "built-in default", start),
    }
}

/// Check the completion endpoint is a usable URL.
async fn check_endpoint(base_url: &str) -> CheckResult {
    let start = Instant::now();
    match reqwest::Url::parse(base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            CheckResult::new("Endpoint", CheckStatus::Pass, base_url, start)
        }
        Ok(url) => CheckResult::new(
            "Endpoint",
            CheckStatus::Fail,
            format!("unsupported scheme `{}`", url.scheme()),
            start,
        ),
        Err(e) => CheckResult::new("Endpoint", CheckStatus::Fail, e.to_string(), start),
    }
}
