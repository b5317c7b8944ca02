//! `mh-gateway run`: one turn, printed to stdout.

use std::sync::Arc;

use serde::Serialize;

use mh_domain::config::Config;
use mh_domain::message::{Message, Role};
use mh_domain::route::Route;

use crate::bootstrap;
use crate::runtime::{run_turn, TurnInput};

#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    user_id: &'a str,
    route: Route,
    final_message: &'a str,
    messages: &'a [Message],
}

pub async fn run(config: Arc<Config>, message: String, user: String, json: bool) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;
    let outcome = run_turn(
        &state,
        TurnInput {
            user_id: user.clone(),
            message,
        },
    )
    .await?;

    if json {
        let out = RunOutput {
            user_id: &user,
            route: outcome.state.query_route,
            final_message: &outcome.final_message,
            messages: &outcome.turn_messages,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    // Reasoning goes dimmed to stderr so stdout carries only the reply.
    for m in outcome.turn_messages.iter().filter(|m| m.role == Role::Trace) {
        eprintln!("\x1b[2m{}\x1b[0m\n", m.content);
    }
    println!("{}", outcome.final_message);
    Ok(())
}
