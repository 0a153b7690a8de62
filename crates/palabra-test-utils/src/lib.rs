// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Palabra integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockCompletion`] - Mock completion service with scripted outcomes
//! - [`MockLog`] - In-memory conversation log with a failure switch
//! - [`TestHarness`] - Orchestrator over a temp SQLite log

pub mod harness;
pub mod mock_completion;
pub mod mock_log;

pub use harness::{TEST_PRINCIPAL, TestHarness};
pub use mock_completion::{MockCompletion, Scripted};
pub use mock_log::MockLog;
