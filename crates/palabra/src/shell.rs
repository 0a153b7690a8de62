// SPDX-FileCopyrightText: 2026 Palabra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `palabra shell` command implementation.
//!
//! Launches an interactive REPL with colored output and readline history.
//! The conversation lives only for the lifetime of the process; every
//! message is also appended to the conversation log.

use std::sync::Arc;

use colored::Colorize;
use palabra_agent::{LogWriter, Orchestrator, OrchestratorSettings, SessionStore, SubmitOutcome};
use palabra_config::PalabraConfig;
use palabra_core::{CompletionAdapter, ConversationLog, PalabraError, PrincipalId};
use palabra_openai::OpenAiProvider;
use palabra_storage::SqliteLog;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{info, warn};

/// Shown while the conversation is empty.
const EMPTY_HINT: &str = "Inicia una conversación enviando un mensaje";

/// A parsed line of shell input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Quit,
    Help,
    Login(&'a str),
    Logout,
    WhoAmI,
    Unknown(&'a str),
    Message(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Input::Empty;
        }
        let Some(command) = trimmed.strip_prefix('/') else {
            return Input::Message(trimmed);
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match name {
            "quit" | "exit" => Input::Quit,
            "help" => Input::Help,
            "login" if !arg.is_empty() => Input::Login(arg),
            "logout" => Input::Logout,
            "whoami" => Input::WhoAmI,
            _ => Input::Unknown(trimmed),
        }
    }
}

/// Runs the `palabra shell` interactive REPL.
pub async fn run_shell(
    config: PalabraConfig,
    principal: Option<String>,
) -> Result<(), PalabraError> {
    let log = SqliteLog::new(config.log.clone());
    log.initialize().await?;
    let log: Arc<dyn ConversationLog> = Arc::new(log);

    let completion: Arc<dyn CompletionAdapter> =
        Arc::new(OpenAiProvider::new(&config.completion)?);

    let session = SessionStore::new();
    if let Some(id) = principal.or_else(|| config.session.principal.clone()) {
        session.sign_in(PrincipalId(id));
    }

    let settings = OrchestratorSettings::from_config(&config).await;
    let writer = LogWriter::spawn(log.clone());
    let mut orchestrator = Orchestrator::new(
        settings,
        session.subscribe(),
        completion.clone(),
        writer.clone(),
    );

    let mut rl = DefaultEditor::new()
        .map_err(|e| PalabraError::Internal(format!("failed to initialize readline: {e}")))?;

    let agent_name = config.agent.name.as_str();
    println!("{}", agent_name.bold().green());
    if let Some(disclaimer) = &config.agent.disclaimer {
        println!("{}", disclaimer.dimmed());
    }
    if !completion.has_credential() {
        println!(
            "{}",
            "no API key configured: set completion.api_key or GROQ_API_KEY".yellow()
        );
    }
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());
    print_status_hint(&session, orchestrator.messages().is_empty());

    let prompt = format!("{}> ", "you".cyan());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        match Input::parse(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Help => print_help(),
            Input::Login(id) => {
                session.sign_in(PrincipalId(id.to_string()));
                println!("{}", format!("signed in as {id}").dimmed());
                print_status_hint(&session, orchestrator.messages().is_empty());
            }
            Input::Logout => {
                session.sign_out();
                println!("{}", "signed out".dimmed());
            }
            Input::WhoAmI => match session.current() {
                Some(principal) => println!("{principal}"),
                None => println!("{}", "not signed in".dimmed()),
            },
            Input::Unknown(command) => {
                println!("{} {command}", "unknown command:".yellow());
            }
            Input::Message(text) => {
                let _ = rl.add_history_entry(line.as_str());

                // The input surface is only reachable when signed in.
                if session.current().is_none() {
                    println!("{}", "sign in first with /login <id>".yellow());
                    continue;
                }

                println!("{}", "thinking…".dimmed());
                let outcome = orchestrator.submit(text).await;
                print_reply(agent_name, &orchestrator, outcome);
            }
        }
    }

    info!(
        messages = orchestrator.messages().len(),
        "shell session ending"
    );
    writer.close().await;
    if let Err(e) = log.shutdown().await {
        warn!(error = %e, "conversation log shutdown failed");
    }
    completion.shutdown().await?;

    println!("{}", "adiós".dimmed());
    Ok(())
}

fn print_reply(agent_name: &str, orchestrator: &Orchestrator, outcome: SubmitOutcome) {
    let Some(last) = orchestrator.messages().last() else {
        return;
    };
    match outcome {
        SubmitOutcome::Replied => {
            println!("{}> {}\n", agent_name.green(), last.content());
        }
        SubmitOutcome::MissingCredential
        | SubmitOutcome::HttpError(_)
        | SubmitOutcome::EmptyResponse
        | SubmitOutcome::Unexpected => {
            println!("{}> {}\n", agent_name.green(), last.content().yellow());
        }
        SubmitOutcome::Blank | SubmitOutcome::NoSession => {}
    }
}

fn print_status_hint(session: &SessionStore, conversation_empty: bool) {
    if session.current().is_none() {
        println!("{}", "Use /login <id> to sign in.".dimmed());
    } else if conversation_empty {
        println!("{}", EMPTY_HINT.dimmed());
    }
}

fn print_help() {
    println!("  /login <id>   sign in as <id>");
    println!("  /logout       sign out");
    println!("  /whoami       show the signed-in principal");
    println!("  /quit, /exit  leave the shell");
}
