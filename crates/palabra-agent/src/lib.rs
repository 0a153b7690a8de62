// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for the Palabra chat assistant.
//!
//! The [`Orchestrator`] is the central coordinator that:
//! - Appends the user's message to the displayed conversation
//! - Hands log records to the detached [`LogWriter`]
//! - Calls the completion service once per submission
//! - Turns every failure into an assistant notice
//!
//! The signed-in principal comes from a [`SessionStore`].

pub mod notices;
pub mod orchestrator;
pub mod prompt;
pub mod session;
pub mod writer;

pub use notices::Notices;
pub use orchestrator::{Orchestrator, OrchestratorSettings, SubmitOutcome};
pub use prompt::load_system_prompt;
pub use session::SessionStore;
pub use writer::LogWriter;
