//! `mh-gateway chat`: interactive REPL.

use std::sync::Arc;

use mh_domain::config::Config;
use mh_domain::message::Role;

use crate::bootstrap;
use crate::runtime::{run_turn, TurnInput};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run the readline loop. Each line is one turn for the current user.
pub async fn chat(config: Arc<Config>, mut user: String) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;

    let history_path = dirs::home_dir()
        .unwrap_or_default()
        .join(".mh-gateway")
        .join("chat_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    eprintln!("Mental health assistant chat");
    eprintln!("User: {user}  |  Type /help for commands, Ctrl+D to exit");
    eprintln!();

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(&line).ok();

                if trimmed.starts_with('/') {
                    match handle_slash_command(&state, trimmed, &mut user).await {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => eprintln!("\x1B[31merror: {e}\x1B[0m"),
                    }
                    continue;
                }

                if let Err(e) = send_message(&state, &user, trimmed).await {
                    eprintln!("\x1B[31merror: {e}\x1B[0m");
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    rl.save_history(&history_path).ok();
    eprintln!("Take care!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash commands
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parsed REPL command.
#[derive(Debug, PartialEq, Eq)]
pub enum Slash<'a> {
    Exit,
    User(Option<&'a str>),
    Reasoning(Option<bool>),
    History,
    Reset,
    Help,
    Unknown(&'a str),
}

pub fn parse_slash(input: &str) -> Slash<'_> {
    let (cmd, arg) = match input.split_once(' ') {
        Some((c, a)) => (c, Some(a.trim()).filter(|a| !a.is_empty())),
        None => (input, None),
    };
    match cmd {
        "/exit" | "/quit" => Slash::Exit,
        "/user" => Slash::User(arg),
        "/reasoning" => Slash::Reasoning(match arg {
            Some("on") => Some(true),
            Some("off") => Some(false),
            _ => None,
        }),
        "/history" => Slash::History,
        "/reset" => Slash::Reset,
        "/help" => Slash::Help,
        other => Slash::Unknown(other),
    }
}

/// Returns `true` when the REPL should exit.
async fn handle_slash_command(state: &AppState, input: &str, user: &mut String) -> anyhow::Result<bool> {
    match parse_slash(input) {
        Slash::Exit => return Ok(true),

        Slash::User(Some(name)) => {
            *user = name.to_string();
            eprintln!("Now chatting as: {user}");
        }
        Slash::User(None) => {
            eprintln!("Current user: {user}");
            eprintln!("Usage: /user <id>");
        }

        Slash::Reasoning(Some(visible)) => {
            let _permit = state.session_locks.acquire(user).await?;
            let mut session = state
                .sessions
                .get(user)?
                .unwrap_or_else(|| state.assistant.new_session());
            session.reasoning_visible = visible;
            state.sessions.put(user, session)?;
            eprintln!("Reasoning {}", if visible { "shown" } else { "hidden" });
        }
        Slash::Reasoning(None) => eprintln!("Usage: /reasoning on|off"),

        Slash::History => match state.sessions.get(user)? {
            Some(session) => {
                for m in session.messages.iter().filter(|m| m.role != Role::System) {
                    let who = match m.role {
                        Role::User => "you",
                        Role::Assistant => "assistant",
                        Role::Trace => "thinking",
                        Role::System => continue,
                    };
                    eprintln!("[{who}] {}\n", m.content);
                }
            }
            None => eprintln!("(no history for {user})"),
        },

        Slash::Reset => {
            let _permit = state.session_locks.acquire(user).await?;
            state.sessions.evict(user)?;
            eprintln!("Session for {user} cleared.");
        }

        Slash::Help => {
            eprintln!("Commands:");
            eprintln!("  /user <id>          Switch to another user's session");
            eprintln!("  /reasoning on|off   Show or hide reasoning traces");
            eprintln!("  /history            Print this session's messages");
            eprintln!("  /reset              Clear this session");
            eprintln!("  /exit, /quit        Exit the chat");
            eprintln!("  /help               Show this help");
        }

        Slash::Unknown(other) => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }
    Ok(false)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message sending
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn send_message(state: &AppState, user: &str, message: &str) -> anyhow::Result<()> {
    let outcome = run_turn(
        state,
        TurnInput {
            user_id: user.to_string(),
            message: message.to_string(),
        },
    )
    .await?;

    for m in outcome.turn_messages.iter().filter(|m| m.role == Role::Trace) {
        eprintln!("\x1B[2m{}\x1B[0m\n", m.content);
    }
    println!("{}\n", outcome.final_message);
    Ok(())
}
