//! Interactive inquiry conversation handler
//!
//! Starts (or resumes) a session against the remote assistant and runs
//! a readline loop: each user answer is appended to the store, sent to
//! the service, and the assistant's reply is appended and displayed.
//! Every turn awaits the previous one, so store updates never interleave.

use crate::client::{InquiryClient, TurnResponse};
use crate::config::Config;
use crate::error::Result;
use crate::markdown::{extract_think, strip_think};
use crate::store::{ButtonState, Message, MessageDraft, Role, SessionStore, UploadedImage};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

/// Start or resume an interactive inquiry conversation
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `resume` - Session id to resume instead of starting a new session
pub async fn run_chat(config: Config, resume: Option<String>) -> Result<()> {
    let client = InquiryClient::new(&config.api)?;
    let mut store = open_store(&config)?;

    let session_id = match resume {
        Some(id) if store.sessions().iter().any(|s| s.id == id) => {
            store.set_current(&id)?;
            replay_transcript(&store);
            id
        }
        Some(id) => {
            println!("{}", format!("No stored session with id {}", id).yellow());
            return Ok(());
        }
        None => {
            let started = client.start_session().await?;
            store.create_session(&started.session_id, &started.question)?;
            display_assistant_text(&started.question);
            started.session_id
        }
    };

    println!(
        "{}",
        "Answer the questions below. /help lists commands.".dimmed()
    );

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match trimmed {
                    "/exit" | "/quit" => break,
                    "/help" => {
                        print_help();
                        continue;
                    }
                    "/sessions" => {
                        for session in store.sorted_sessions() {
                            println!("  {}  {}", session.id.cyan(), session.title);
                        }
                        continue;
                    }
                    _ => {}
                }

                if let Some(path) = trimmed.strip_prefix("/upload ") {
                    match upload_turn(&client, &mut store, &session_id, path.trim()).await {
                        Ok(finished) => {
                            if finished {
                                break;
                            }
                        }
                        Err(e) => println!("{}", format!("Upload failed: {}", e).red()),
                    }
                    continue;
                }

                let (answer, detail) = split_detail(trimmed);
                let answer = resolve_option_choice(&mut store, &session_id, &answer)?;

                store.add_message(
                    &session_id,
                    MessageDraft {
                        role: Role::User,
                        content: answer.clone(),
                        llm_detail: detail.clone(),
                        ..Default::default()
                    },
                )?;

                match client
                    .send_message(&session_id, &answer, detail.as_deref())
                    .await
                {
                    Ok(turn) => {
                        let finished = record_assistant_turn(&mut store, &session_id, &turn)?;
                        if finished {
                            break;
                        }
                    }
                    Err(e) => {
                        // The answer stays in the store; the user can retry
                        println!("{}", format!("Request failed: {}", e).red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("{}", "Session saved. Resume with: medquiry chat --resume".dimmed());
    Ok(())
}

/// Open the session store configured for this run
pub fn open_store(config: &Config) -> Result<SessionStore> {
    match &config.store.dir {
        Some(dir) => SessionStore::open(dir.join("sessions.db")),
        None => SessionStore::open_default(),
    }
}

/// Split an `answer :: detail` input into its parts
fn split_detail(input: &str) -> (String, Option<String>) {
    match input.split_once("::") {
        Some((answer, detail)) if !detail.trim().is_empty() => {
            (answer.trim().to_string(), Some(detail.trim().to_string()))
        }
        _ => (input.to_string(), None),
    }
}

/// Map a numeric reply onto the pending option list
///
/// When the latest assistant message offered options and the input is a
/// matching 1-based index, the option text becomes the answer and the
/// selection is recorded on that message. Free text instead records the
/// "other" input state.
fn resolve_option_choice(
    store: &mut SessionStore,
    session_id: &str,
    input: &str,
) -> Result<String> {
    let Some((message_id, options)) = pending_options(store, session_id) else {
        return Ok(input.to_string());
    };

    if let Ok(index) = input.parse::<usize>() {
        if index >= 1 && index <= options.len() {
            let choice = options[index - 1].clone();
            store.update_button_state(
                session_id,
                &message_id,
                ButtonState {
                    selected_option: Some(choice.clone()),
                    is_options_disabled: Some(true),
                    ..Default::default()
                },
            )?;
            return Ok(choice);
        }
    }

    store.update_button_state(
        session_id,
        &message_id,
        ButtonState {
            show_other_input: Some(true),
            other_input: Some(input.to_string()),
            is_options_disabled: Some(true),
            ..Default::default()
        },
    )?;
    Ok(input.to_string())
}

/// Options offered by the latest assistant message, if it is still
/// waiting for an answer
fn pending_options(store: &SessionStore, session_id: &str) -> Option<(String, Vec<String>)> {
    let session = store.sessions().iter().find(|s| s.id == session_id)?;
    let message = session
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)?;
    if message.options.is_empty() || message.is_options_disabled == Some(true) {
        return None;
    }
    Some((message.id.clone(), message.options.clone()))
}

/// Append the assistant's reply to the store and display it
///
/// Returns true when the inquiry concluded with this turn.
fn record_assistant_turn(
    store: &mut SessionStore,
    session_id: &str,
    turn: &TurnResponse,
) -> Result<bool> {
    let message = store.add_message(
        session_id,
        MessageDraft {
            role: Role::Assistant,
            content: turn.question.clone(),
            options: turn.options.clone(),
            is_finished: Some(turn.is_finished),
            final_answer: turn.final_answer.clone(),
            retrieved_context_preview: turn.retrieved_context_preview.clone(),
            requires_file_upload: turn.requires_file_upload,
            ..Default::default()
        },
    )?;

    if let Some(message) = &message {
        display_assistant_message(message);
        store.update_streaming_flag(session_id, &message.id, true)?;
    }

    Ok(turn.is_finished)
}

/// Upload an image for the current turn and handle the reply
async fn upload_turn(
    client: &InquiryClient,
    store: &mut SessionStore,
    session_id: &str,
    path: &str,
) -> Result<bool> {
    let bytes = std::fs::read(path)?;
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    let turn = client.upload_image(session_id, &name, bytes).await?;

    // Mark the requesting assistant message as satisfied
    if let Some(requesting) = latest_upload_request(store, session_id) {
        store.update_button_state(
            session_id,
            &requesting,
            ButtonState {
                is_file_uploaded: Some(true),
                ..Default::default()
            },
        )?;
    }

    store.add_message(
        session_id,
        MessageDraft {
            role: Role::User,
            content: format!("[uploaded {}]", name),
            uploaded_image: Some(UploadedImage {
                url: path.to_string(),
                name,
            }),
            ..Default::default()
        },
    )?;

    record_assistant_turn(store, session_id, &turn)
}

fn latest_upload_request(store: &SessionStore, session_id: &str) -> Option<String> {
    let session = store.sessions().iter().find(|s| s.id == session_id)?;
    session
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant && m.requires_file_upload == Some(true))
        .map(|m| m.id.clone())
}

/// Print a stored session so a resumed conversation has its context
fn replay_transcript(store: &SessionStore) {
    let Some(session) = store.current_session() else {
        return;
    };

    println!("{}", format!("Resuming \"{}\"", session.title).dimmed());
    for message in &session.messages {
        match message.role {
            Role::User => println!("{} {}", "you>".dimmed(), message.content),
            Role::Assistant => display_assistant_message(message),
        }
    }
}

fn display_assistant_message(message: &Message) {
    display_assistant_text(&message.content);

    if !message.options.is_empty() {
        for (i, option) in message.options.iter().enumerate() {
            println!("  {} {}", format!("{}.", i + 1).cyan(), option);
        }
    }

    if let Some(preview) = &message.retrieved_context_preview {
        println!("{}", format!("context: {}", preview).dimmed());
    }

    if message.requires_file_upload == Some(true) {
        println!(
            "{}",
            "An image is expected for this turn: /upload <path>".yellow()
        );
    }

    if message.is_finished == Some(true) {
        if let Some(final_answer) = &message.final_answer {
            println!();
            println!("{}", "Final assessment:".green().bold());
            println!("{}", strip_think(final_answer).green());
        }
    }
}

fn display_assistant_text(text: &str) {
    if let Some(think) = extract_think(text) {
        println!("{}", format!("thinking: {}", think).dimmed().italic());
    }
    let body = strip_think(text);
    if !body.is_empty() {
        println!("{}", body);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /exit, /quit      leave the conversation (history is kept)");
    println!("  /sessions         list stored sessions");
    println!("  /upload <path>    upload an image when the assistant asks for one");
    println!("  <answer> :: <detail>  attach free-form detail to an answer");
    println!("  <number>          pick one of the offered options");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_detail() {
        assert_eq!(split_detail("Headache"), ("Headache".to_string(), None));
        assert_eq!(
            split_detail("Headache :: left side, throbbing"),
            (
                "Headache".to_string(),
                Some("left side, throbbing".to_string())
            )
        );
        assert_eq!(split_detail("Headache ::"), ("Headache ::".to_string(), None));
    }

    #[test]
    fn test_resolve_option_choice_by_index() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = SessionStore::open(dir.path().join("db")).unwrap();
        store.create_session("s1", "Q?").unwrap();
        store
            .add_message(
                "s1",
                MessageDraft {
                    role: Role::Assistant,
                    content: "Pick one".to_string(),
                    options: vec!["Mild".to_string(), "Severe".to_string()],
                    ..Default::default()
                },
            )
            .unwrap();

        let answer = resolve_option_choice(&mut store, "s1", "2").unwrap();
        assert_eq!(answer, "Severe");

        let message = &store.current_session().unwrap().messages[1];
        assert_eq!(message.selected_option.as_deref(), Some("Severe"));
        assert_eq!(message.is_options_disabled, Some(true));
    }

    #[test]
    fn test_resolve_option_choice_free_text_records_other() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = SessionStore::open(dir.path().join("db")).unwrap();
        store.create_session("s1", "Q?").unwrap();
        store
            .add_message(
                "s1",
                MessageDraft {
                    role: Role::Assistant,
                    content: "Pick one".to_string(),
                    options: vec!["Mild".to_string()],
                    ..Default::default()
                },
            )
            .unwrap();

        let answer = resolve_option_choice(&mut store, "s1", "Comes and goes").unwrap();
        assert_eq!(answer, "Comes and goes");

        let message = &store.current_session().unwrap().messages[1];
        assert_eq!(message.show_other_input, Some(true));
        assert_eq!(message.other_input.as_deref(), Some("Comes and goes"));
    }

    #[test]
    fn test_resolve_option_choice_without_options_passes_through() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = SessionStore::open(dir.path().join("db")).unwrap();
        store.create_session("s1", "Q?").unwrap();

        let answer = resolve_option_choice(&mut store, "s1", "Headache").unwrap();
        assert_eq!(answer, "Headache");
    }

    #[test]
    fn test_pending_options_ignores_answered_message() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = SessionStore::open(dir.path().join("db")).unwrap();
        store.create_session("s1", "Q?").unwrap();
        let message = store
            .add_message(
                "s1",
                MessageDraft {
                    role: Role::Assistant,
                    content: "Pick one".to_string(),
                    options: vec!["Mild".to_string()],
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert!(pending_options(&store, "s1").is_some());

        store
            .update_button_state(
                "s1",
                &message.id,
                ButtonState {
                    is_options_disabled: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(pending_options(&store, "s1").is_none());
    }
}
