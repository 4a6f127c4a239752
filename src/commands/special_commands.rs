//! Special commands parser for interactive chat mode
//!
//! This module parses the commands that can be entered during an
//! interactive chat. Special commands allow users to:
//! - Start, list, switch, rename and delete chat sessions
//! - Upload a PDF into the current session
//! - Inspect the transcript, service health and session status
//! - Exit the session
//!
//! Commands are prefixed with `/` and their names are case-insensitive.
//! Arguments keep their original case.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session list or display information,
/// rather than being sent to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new empty chat and select it
    NewChat,

    /// List all chats, most recent first
    ListChats,

    /// Select a chat by list position, short id or id prefix
    Switch(String),

    /// Delete a chat by list position, short id or id prefix
    Delete(String),

    /// Rename a chat
    ///
    /// Without a title the current title is offered for inline editing.
    Rename {
        target: String,
        title: Option<String>,
    },

    /// Upload a PDF into the current chat
    Upload(PathBuf),

    /// Reprint the current chat's transcript
    History,

    /// Check the assistant service
    Health,

    /// Show current chat and in-flight activity
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the assistant as a question.
    None,
}

/// Split `input` after a command prefix, keeping the argument's case
fn argument<'a>(input: &'a str, command: &str) -> &'a str {
    input.get(command.len()..).unwrap_or("").trim()
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

/// Parse a user input string into a special command
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for
/// regular questions.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a
/// valid command, CommandError::MissingArgument if a command needs an
/// argument that was not given, and CommandError::UnsupportedArgument if a
/// command that takes no argument received one.
///
/// # Examples
///
/// ```
/// use sonia::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/switch 2").unwrap();
/// assert_eq!(cmd, SpecialCommand::Switch("2".to_string()));
///
/// let cmd = parse_special_command("What does chapter 3 say?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let name = lower.split_whitespace().next().unwrap_or(&lower);
    let arg = argument(trimmed, name);

    match name {
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        "/switch" | "/delete" | "/upload" if arg.is_empty() => Err(match name {
            "/switch" => missing("/switch", "/switch <number|id>"),
            "/delete" => missing("/delete", "/delete <number|id>"),
            _ => missing("/upload", "/upload <path/to/file.pdf>"),
        }),
        "/switch" => Ok(SpecialCommand::Switch(arg.to_string())),
        "/delete" => Ok(SpecialCommand::Delete(arg.to_string())),
        "/upload" => Ok(SpecialCommand::Upload(PathBuf::from(arg))),

        "/rename" => {
            let mut parts = arg.splitn(2, char::is_whitespace);
            let target = parts.next().unwrap_or("").trim();
            if target.is_empty() {
                return Err(missing("/rename", "/rename <number|id> [title]"));
            }
            let title = parts
                .next()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            Ok(SpecialCommand::Rename {
                target: target.to_string(),
                title,
            })
        }

        "/new" | "/chats" | "/history" | "/health" | "/status" | "/help" | "/?"
            if !arg.is_empty() =>
        {
            Err(CommandError::UnsupportedArgument {
                command: name.to_string(),
                arg: arg.to_string(),
            })
        }
        "/new" => Ok(SpecialCommand::NewChat),
        "/chats" => Ok(SpecialCommand::ListChats),
        "/history" => Ok(SpecialCommand::History),
        "/health" => Ok(SpecialCommand::Health),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
///
/// # Examples
///
/// ```
/// use sonia::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

CHATS:
  /new                    - Start a new chat
  /chats                  - List chats, most recent first
  /switch <number|id>     - Switch to a chat from the list
  /rename <number|id> [title]
                          - Rename a chat (edit the current title if omitted)
  /delete <number|id>     - Delete a chat

DOCUMENTS:
  /upload <file.pdf>      - Upload a PDF to ask questions about

INFORMATION:
  /history                - Show the current chat's messages
  /health                 - Check the assistant service
  /status                 - Show the current chat and pending requests
  /help                   - Show this help message
  /?                      - Same as /help

SESSION:
  exit, quit, /exit       - Leave interactive mode

Anything else is sent to the assistant as a question.
"#
    );
}
