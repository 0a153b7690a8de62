// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `palabra history` command implementation.
//!
//! Reads the conversation log for audit. The shell itself never reads it back.

use std::io::IsTerminal;

use colored::Colorize;
use palabra_config::PalabraConfig;
use palabra_core::{ConversationLog, PalabraError, PluginAdapter, PrincipalId, Role, StoredRecord};
use palabra_storage::SqliteLog;

/// Run the `palabra history` command.
pub async fn run_history(
    config: &PalabraConfig,
    principal: Option<String>,
    limit: Option<i64>,
    json: bool,
) -> Result<(), PalabraError> {
    if !std::path::Path::new(&config.log.database_path).exists() {
        return Err(PalabraError::Config(format!(
            "conversation log not found at {}",
            config.log.database_path
        )));
    }

    let log = SqliteLog::new(config.log.clone());
    log.initialize().await?;

    let principal = principal.map(PrincipalId);
    let records = log
        .records(&config.log.collection, principal.as_ref(), limit)
        .await?;
    log.shutdown().await?;

    if json {
        let rendered = serde_json::to_string_pretty(&records)
            .map_err(|e| PalabraError::Internal(format!("failed to serialize records: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    if records.is_empty() {
        println!("no records in collection `{}`", config.log.collection);
        return Ok(());
    }

    let use_color = std::io::stdout().is_terminal();
    for record in &records {
        println!("{}", format_record(record, use_color));
    }
    Ok(())
}

fn format_record(record: &StoredRecord, use_color: bool) -> String {
    let role = match (record.role, use_color) {
        (Role::User, true) => record.role.to_string().cyan().to_string(),
        (Role::Assistant, true) => record.role.to_string().green().to_string(),
        (_, false) => record.role.to_string(),
    };
    format!(
        "{}  {}  {:<9} {}",
        record.created_at, record.principal_id, role, record.content
    )
}
