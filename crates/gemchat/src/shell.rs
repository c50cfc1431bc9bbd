// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gemchat shell` command implementation.
//!
//! Launches an interactive REPL with colored prompt, streaming output,
//! and readline history. Prior turns for the username are replayed on start.

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use gemchat_agent::{Conversation, EntryParams, Upload};
use gemchat_config::ChatConfig;
use gemchat_context::extract_display_text;
use gemchat_core::{ChatError, Message, Role};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

/// A parsed line of shell input.
#[derive(Debug, PartialEq, Eq)]
enum ShellInput<'a> {
    Quit,
    Clear,
    Attach(&'a str),
    Message(&'a str),
    Empty,
}

fn parse_line(line: &str) -> ShellInput<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => ShellInput::Empty,
        "/quit" | "/exit" => ShellInput::Quit,
        "/clear" => ShellInput::Clear,
        _ => match trimmed.strip_prefix("/attach ") {
            Some(path) => ShellInput::Attach(path.trim()),
            None => ShellInput::Message(trimmed),
        },
    }
}

/// Runs the `gemchat shell` interactive REPL for one username.
pub async fn run_shell(
    config: ChatConfig,
    username: String,
    pname: Option<String>,
) -> Result<(), ChatError> {
    crate::init_tracing(&config.app.log_level);
    let app_name = config.app.name.clone();
    let runtime = crate::serve::build_runtime(config).await?;

    let mut params = EntryParams::for_user(username);
    if let Some(pname) = pname {
        params = params.with_prompt(pname);
    }
    let ctx = runtime.session_context(&params)?;
    let mut conversation = runtime.conversation(ctx);
    conversation.load().await;

    let mut rl = DefaultEditor::new()
        .map_err(|e| ChatError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", app_name.bold().green());
    println!(
        "Type {} to exit, {} to forget this chat, {} to add a file.\n",
        "/quit".yellow(),
        "/clear".yellow(),
        "/attach <path>".yellow()
    );

    for message in conversation.messages() {
        print_message(message);
    }
    if !conversation.has_turns() {
        print_assistant_label();
        match conversation.greet(print_chunk).await {
            Ok(Some(_)) => println!("\n"),
            Ok(None) => println!("{}\n", "(no greeting)".dimmed()),
            Err(e) => eprintln!("\n{}: {e}\n", "error".red()),
        }
    }

    let prompt = format!("{}> ", conversation.context().username.green());
    let mut pending: Vec<Upload> = Vec::new();
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match parse_line(&line) {
                    ShellInput::Empty => continue,
                    ShellInput::Quit => break,
                    ShellInput::Clear => {
                        conversation.clear().await;
                        pending.clear();
                        println!("{}", "history cleared".dimmed());
                    }
                    ShellInput::Attach(path) => match read_upload(Path::new(path)).await {
                        Ok(upload) => {
                            println!("{}", format!("attached {}", upload.filename).dimmed());
                            pending.push(upload);
                        }
                        Err(e) => eprintln!("{}: {e}", "error".red()),
                    },
                    ShellInput::Message(text) => {
                        let input = runtime.build_input(text, &pending);
                        pending.clear();
                        send_turn(&mut conversation, input).await;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

async fn send_turn(conversation: &mut Conversation, input: gemchat_core::MessageContent) {
    print_assistant_label();
    match conversation.send(input, print_chunk).await {
        Ok(outcome) => {
            println!("\n");
            if !outcome.persisted {
                eprintln!("{}", "(this turn was not saved)".yellow());
            }
        }
        Err(e) => eprintln!("\n{}: {e}\n", "error".red()),
    }
}

async fn read_upload(path: &Path) -> Result<Upload, ChatError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| ChatError::Config(format!("cannot read {}: {e}", path.display())))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(filename = %filename, bytes = data.len(), "attachment queued");
    Ok(Upload {
        filename,
        mime_type: None,
        data,
    })
}

fn print_chunk(chunk: &str) {
    print!("{chunk}");
    let _ = std::io::stdout().flush();
}

fn print_assistant_label() {
    print!("{} ", "assistant:".green().bold());
    let _ = std::io::stdout().flush();
}

fn print_message(message: &Message) {
    let Some(text) = extract_display_text(message) else {
        return;
    };
    match message.role {
        Role::System => {}
        Role::User => println!("{} {text}\n", "you:".cyan().bold()),
        Role::Assistant => println!("{} {text}\n", "assistant:".green().bold()),
    }
}
