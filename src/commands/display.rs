//! Terminal rendering for chats and messages

use crate::session::{ChatSession, Message, Sender, SessionStore};
use colored::Colorize;
use prettytable::{format, Table};

/// Characters of a title shown in the chat list
const LIST_TITLE_CHARS: usize = 40;

/// Print the greeting shown when the current chat has no messages
pub fn print_welcome(assistant_name: &str) {
    println!();
    println!("{}", format!("{} AI", assistant_name).bold().magenta());
    println!("Your lovable document assistant. Upload a PDF or ask me anything!");
    println!();
}

/// Print the banner shown once when interactive mode starts
pub fn print_welcome_banner(assistant_name: &str) {
    let heading = format!("{} Interactive Chat Mode - Welcome!", assistant_name);
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", heading);
    println!("╚══════════════════════════════════════════════════════════════╝");
    print_welcome(assistant_name);
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

/// Label shown in front of a message
pub fn sender_label(sender: Sender, assistant_name: &str) -> String {
    match sender {
        Sender::User => "You".to_string(),
        Sender::Bot => assistant_name.to_string(),
    }
}

/// Render one message as a transcript line
///
/// # Examples
///
/// ```
/// use sonia::commands::display::format_message;
/// use sonia::session::{Sender, SessionStore};
///
/// let mut store = SessionStore::new();
/// let message = store.new_message(Sender::User, "Hello");
/// let line = format_message(&message, "Sonia", false);
/// assert!(line.contains("Hello"));
/// ```
pub fn format_message(message: &Message, assistant_name: &str, show_timestamps: bool) -> String {
    let label = sender_label(message.sender(), assistant_name);
    let label = match message.sender() {
        Sender::User => format!("{}:", label).cyan().bold(),
        Sender::Bot => format!("{}:", label).green().bold(),
    };

    if show_timestamps {
        let time = message
            .timestamp()
            .with_timezone(&chrono::Local)
            .format("%H:%M");
        format!("{} {} {}", format!("[{}]", time).dimmed(), label, message.content())
    } else {
        format!("{} {}", label, message.content())
    }
}

/// Print a chat's full transcript, or the greeting when it is empty
pub fn print_transcript(session: &ChatSession, assistant_name: &str, show_timestamps: bool) {
    if session.is_empty() {
        print_welcome(assistant_name);
        return;
    }

    println!("\n{}", session.title().bold());
    for message in session.messages() {
        println!("{}\n", format_message(message, assistant_name, show_timestamps));
    }
}

/// Shorten a title for the chat list
pub fn list_title(title: &str) -> String {
    if title.chars().count() > LIST_TITLE_CHARS {
        let kept: String = title.chars().take(LIST_TITLE_CHARS - 3).collect();
        format!("{}...", kept)
    } else {
        title.to_string()
    }
}

/// Print the chat list as a table, marking the current chat
pub fn print_chats_table(store: &SessionStore) {
    if store.is_empty() {
        println!("{}", "No chats yet. Ask a question or use /new to start one.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Message".bold()
    ]);

    let current = store.current_id();
    for (index, session) in store.sessions().iter().enumerate() {
        let marker = if Some(session.id()) == current {
            format!("*{}", index + 1).green().bold()
        } else {
            format!(" {}", index + 1).normal()
        };
        let updated = session
            .last_message()
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();

        table.add_row(prettytable::row![
            marker,
            session.id().short().cyan(),
            list_title(session.title()),
            session.messages().len(),
            updated
        ]);
    }

    println!("\nChats:");
    table.printstd();
    println!();
    println!("Use {} to open a chat.", "/switch <number|id>".cyan());
    println!();
}
