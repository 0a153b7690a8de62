// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./palabra.toml` > `~/.config/palabra/palabra.toml` > `/etc/palabra/palabra.toml`
//! with environment variable overrides via `PALABRA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::debug;

use crate::model::PalabraConfig;

/// Top-level sections that environment variables may target.
const SECTIONS: &[&str] = &["agent", "session", "completion", "log", "notices"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/palabra/palabra.toml` (system-wide)
/// 3. `~/.config/palabra/palabra.toml` (user XDG config)
/// 4. `./palabra.toml` (local directory)
/// 5. `PALABRA_*` environment variables
pub fn load_config() -> Result<PalabraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PalabraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PalabraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PalabraConfig, figment::Error> {
    debug!(path = %path.display(), "loading configuration from explicit path");
    Figment::new()
        .merge(Serialized::defaults(PalabraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PalabraConfig::default()))
        .merge(Toml::file("/etc/palabra/palabra.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("palabra/palabra.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("palabra.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `PALABRA_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the leading section name is turned into a dot: `PALABRA_AGENT_LOG_LEVEL`
/// must become `agent.log_level`, never `agent.log.level`.
fn env_provider() -> Env {
    Env::prefixed("PALABRA_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
