//! Stored session management handler

use crate::cli::SessionCommand;
use crate::config::Config;
use crate::error::Result;
use crate::markdown::strip_think;
use crate::store::Role;
use colored::Colorize;

/// Handle session management commands
pub fn handle_sessions(config: &Config, command: SessionCommand) -> Result<()> {
    let mut store = super::chat::open_store(config)?;

    match command {
        SessionCommand::List => {
            let sessions = store.sorted_sessions();
            if sessions.is_empty() {
                println!("{}", "No stored sessions.".yellow());
                return Ok(());
            }

            println!("\nInquiry sessions:");
            for session in sessions {
                let current = if Some(session.id.as_str()) == store.current_session_id() {
                    "*"
                } else {
                    " "
                };
                println!(
                    " {} {}  {:<23}  {} messages  {}",
                    current,
                    session.id.cyan(),
                    session.title,
                    session.messages.len(),
                    session.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
                );
            }
            println!();
            println!(
                "Use {} to continue a session.",
                "medquiry chat --resume <ID>".cyan()
            );
        }
        SessionCommand::Show { id } => {
            let Some(session) = store.sessions().iter().find(|s| s.id == id) else {
                println!("{}", format!("No stored session with id {}", id).yellow());
                return Ok(());
            };

            println!("{} ({})", session.title.bold(), session.id.cyan());
            for message in &session.messages {
                let speaker = match message.role {
                    Role::User => "you".dimmed(),
                    Role::Assistant => "assistant".cyan(),
                };
                println!("{}: {}", speaker, strip_think(&message.content));
                if let Some(image) = &message.uploaded_image {
                    println!("   {}", format!("[image: {}]", image.name).dimmed());
                }
            }
        }
        SessionCommand::Delete { id } => {
            store.delete_session(&id)?;
            println!("{}", format!("Deleted session {}", id).green());
        }
        SessionCommand::Clear => {
            store.clear()?;
            println!("{}", "Deleted all sessions".green());
        }
    }

    Ok(())
}
