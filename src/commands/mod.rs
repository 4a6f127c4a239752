/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `chat`   - Interactive chat mode
- `ask`    - Send a single question
- `upload` - Upload a single PDF
- `health` - Check the assistant service

The handlers stay small and delegate to the library components: the
assistant client, the chat controller and the session store.
*/

use crate::chat::{
    is_pdf_file_name, send_failure_message, upload_failure_message, upload_success_message,
    ChatController, UPLOAD_VALIDATION_MESSAGE,
};
use crate::client::{display_file_name, Assistant, AssistantClient, PdfUpload};
use crate::commands::display::{
    format_message, list_title, print_chats_table, print_transcript, print_welcome,
    print_welcome_banner,
};
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::{ChatConfig, Config};
use crate::error::{Result, SoniaError};
use crate::session::SessionStore;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;

// Terminal rendering helpers
pub mod display;

// Special commands parser for interactive mode
pub mod special_commands;

/// Print a transient status line without a newline
fn show_indicator(text: &str) {
    print!("{}", text.dimmed());
    let _ = std::io::stdout().flush();
}

/// Erase the current terminal line
fn clear_indicator() {
    print!("\r\x1b[2K");
    let _ = std::io::stdout().flush();
}

/// Prompt showing the current chat's title
fn format_prompt(store: &SessionStore) -> String {
    match store.current() {
        Some(session) => format!("[{}] >> ", list_title(session.title())),
        None => ">> ".to_string(),
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline-based loop. Regular lines are sent to the assistant;
    //! lines starting with `/` act on the chat list.

    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// The loop handles one action at a time: each question or upload is
    /// awaited before the next line is read, so the busy guards and
    /// overlapping send/upload of [`ChatController`] are only reachable
    /// through its `begin_*`/`complete_*` API.
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client or the line editor cannot be created.
    ///
    /// # Examples
    ///
    /// ```
    /// use sonia::commands::chat;
    /// use sonia::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(Config::default()).await?;
    /// ```
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let client = AssistantClient::new(&config.api)?;
        let mut chat = ChatController::new(Box::new(client));
        let chat_config = config.chat;

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&chat_config.assistant_name);

        loop {
            let prompt = format_prompt(chat.store());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            ask_question(&mut chat, trimmed, &chat_config).await;
                        }
                        other => {
                            handle_special_command(&mut chat, &mut rl, other, &chat_config)
                                .await;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn ask_question(chat: &mut ChatController, input: &str, config: &ChatConfig) {
        show_indicator(&format!("{} is typing...", config.assistant_name));
        let outcome = chat.send_message(input).await;
        clear_indicator();

        match outcome {
            Ok(Some(reply)) => println!(
                "\n{}\n",
                format_message(&reply, &config.assistant_name, config.show_timestamps)
            ),
            Ok(None) => {}
            Err(e) => eprintln!("{}\n", e.to_string().yellow()),
        }
    }

    async fn handle_special_command(
        chat: &mut ChatController,
        rl: &mut DefaultEditor,
        command: SpecialCommand,
        config: &ChatConfig,
    ) {
        match command {
            SpecialCommand::NewChat => {
                chat.store_mut().create_session();
                println!("{}", "Started a new chat".green());
                print_welcome(&config.assistant_name);
            }
            SpecialCommand::ListChats => print_chats_table(chat.store()),
            SpecialCommand::Switch(reference) => {
                let Some(id) = resolve_or_report(chat.store(), &reference) else {
                    return;
                };
                chat.store_mut().select_session(id);
                if let Some(session) = chat.store().current() {
                    print_transcript(session, &config.assistant_name, config.show_timestamps);
                }
            }
            SpecialCommand::Delete(reference) => {
                let Some(id) = resolve_or_report(chat.store(), &reference) else {
                    return;
                };
                let title = chat
                    .store()
                    .get(id)
                    .map(|s| s.title().to_string())
                    .unwrap_or_default();
                if chat.store_mut().delete_session(id) {
                    println!("{}", format!("Deleted chat \"{}\"", title).green());
                    match chat.store().current() {
                        Some(session) => println!("Now in \"{}\"\n", session.title()),
                        None => println!(),
                    }
                }
            }
            SpecialCommand::Rename { target, title } => {
                let Some(id) = resolve_or_report(chat.store(), &target) else {
                    return;
                };
                match title {
                    Some(title) => report_rename(chat.store_mut().rename_session(id, &title)),
                    None => edit_title(chat.store_mut(), rl, id),
                }
            }
            SpecialCommand::Upload(path) => {
                show_indicator("Uploading...");
                let outcome = chat.upload_pdf(&path).await;
                clear_indicator();

                match outcome {
                    Ok(Some(reply)) => println!(
                        "\n{}\n",
                        format_message(&reply, &config.assistant_name, config.show_timestamps)
                    ),
                    Ok(None) => {}
                    Err(e) => eprintln!("{}\n", e.to_string().yellow()),
                }
            }
            SpecialCommand::History => match chat.store().current() {
                Some(session) => {
                    print_transcript(session, &config.assistant_name, config.show_timestamps)
                }
                None => print_welcome(&config.assistant_name),
            },
            SpecialCommand::Health => match chat.health_check().await {
                Ok(health) => println!(
                    "{} {} {}\n",
                    "Assistant service:".bold(),
                    health.status.green(),
                    health.message
                ),
                Err(e) => eprintln!("{}\n", format!("Health check failed: {}", e).red()),
            },
            SpecialCommand::ShowStatus => print_status_display(chat, config),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
    }

    fn resolve_or_report(store: &SessionStore, reference: &str) -> Option<crate::session::SessionId> {
        let id = store.resolve(reference);
        if id.is_none() {
            eprintln!(
                "{}\n",
                format!("No chat matches '{}'. Use /chats to list chats.", reference).yellow()
            );
        }
        id
    }

    fn report_rename(renamed: bool) {
        if renamed {
            println!("{}\n", "Chat renamed".green());
        } else {
            println!("{}\n", "Title unchanged".yellow());
        }
    }

    /// Offer the current title for inline editing
    ///
    /// Enter commits the edited line; Ctrl-C or Ctrl-D cancels.
    fn edit_title(store: &mut SessionStore, rl: &mut DefaultEditor, id: crate::session::SessionId) {
        let initial = match store.get(id) {
            Some(session) => session.title().to_string(),
            None => return,
        };
        if !store.begin_edit(id) {
            return;
        }

        match rl.readline_with_initial("New title: ", (initial.as_str(), "")) {
            Ok(line) => {
                store.set_draft(&line);
                report_rename(store.commit_edit());
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                store.cancel_edit();
                println!("{}\n", "Rename cancelled".yellow());
            }
            Err(err) => {
                store.cancel_edit();
                tracing::error!("Readline error while renaming: {:?}", err);
            }
        }
    }

    /// Display the current chat and in-flight activity
    fn print_status_display(chat: &ChatController, config: &ChatConfig) {
        let store = chat.store();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Sonia Session Status                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        match store.current() {
            Some(session) => {
                println!("Current Chat:  {} ({})", session.title().bold(), session.id().short().cyan());
                println!("Messages:      {}", session.messages().len());
            }
            None => println!("Current Chat:  {}", "none".dimmed()),
        }
        println!("Chats:         {}", store.len());
        println!("Assistant:     {}", config.assistant_name);
        println!(
            "Sending:       {}",
            if chat.is_sending() { "yes".yellow() } else { "no".normal() }
        );
        println!(
            "Uploading:     {}",
            if chat.is_uploading() { "yes".yellow() } else { "no".normal() }
        );
        println!();
    }
}

// One-shot question handler
pub mod ask {
    //! Send one question and print the answer.

    use super::*;

    /// Ask a single question
    ///
    /// # Errors
    ///
    /// Returns [`SoniaError::Validation`] for blank input, or
    /// [`SoniaError::Api`] carrying the chat's error notice when the
    /// service fails.
    pub async fn run_ask(config: Config, query: String) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SoniaError::Validation("Question must not be empty".to_string()).into());
        }

        let client = AssistantClient::new(&config.api)?;
        tracing::info!("Asking a single question");

        match client.send_message(query).await {
            Ok(reply) => {
                println!("{}", reply.answer);
                Ok(())
            }
            Err(e) => Err(SoniaError::Api(send_failure_message(&e)).into()),
        }
    }
}

// One-shot upload handler
pub mod upload {
    //! Validate and upload one PDF.

    use super::*;

    /// Upload a single PDF and print the processing summary
    ///
    /// A non-PDF file name is rejected before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`SoniaError::Validation`] for non-PDF files, or
    /// [`SoniaError::Api`] carrying the upload error notice when the file
    /// cannot be read or the service fails.
    pub async fn run_upload(config: Config, file: PathBuf) -> Result<()> {
        let filename = display_file_name(&file);
        if !is_pdf_file_name(&filename) {
            return Err(SoniaError::Validation(UPLOAD_VALIDATION_MESSAGE.to_string()).into());
        }

        let client = AssistantClient::new(&config.api)?;

        let upload = PdfUpload::from_path(&file)
            .await
            .map_err(|e| SoniaError::Api(upload_failure_message(&e)))?;
        let reply = client
            .upload_pdf(upload)
            .await
            .map_err(|e| SoniaError::Api(upload_failure_message(&e)))?;

        println!(
            "{}",
            upload_success_message(&filename, reply.chunks_stored).green()
        );
        Ok(())
    }
}

// Health check handler
pub mod health {
    //! Report whether the assistant service is reachable.

    use super::*;

    /// Run the health check
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `json` - Print the raw response as JSON
    ///
    /// # Errors
    ///
    /// Returns error if the service is unreachable or unhealthy.
    pub async fn run_health(config: Config, json: bool) -> Result<()> {
        let client = AssistantClient::new(&config.api)?;
        let health = client.health_check().await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&health)?);
        } else {
            println!(
                "{} {} {}",
                format!("Assistant service at {}:", client.base_url()).bold(),
                health.status.green(),
                health.message
            );
        }
        Ok(())
    }
}
