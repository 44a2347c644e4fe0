// ABOUTME: Send command implementation for CLI scripting.
// ABOUTME: Runs one exchange through the engine and prints the reply as it is revealed.

use std::io::Write;

use chirp_core::{ChatEngine, ChirpError, Config, Message};

use crate::error::{AppError, Result};
use crate::{engine_context, open_store};

/// Send `message` and stream the reply to `out`.
///
/// Revealed text is written as it arrives. A failed reply writes nothing
/// and is returned with `failed` set.
pub async fn exchange(engine: &ChatEngine, message: &str, out: &mut impl Write) -> Result<Message> {
    let mut rx = engine.subscribe();
    let start = rx
        .wait_for(|s| s.hydrated)
        .await
        .map_err(|_| ChirpError::EngineClosed)?
        .messages
        .len();

    engine.send(message)?;
    let reply_index = start + 1;
    let mut printed = 0;

    loop {
        rx.changed().await.map_err(|_| ChirpError::EngineClosed)?;
        let Some(reply) = rx
            .borrow_and_update()
            .messages
            .get(reply_index)
            .map(|g| g.message.clone())
        else {
            continue;
        };

        if reply.failed {
            return Ok(reply);
        }
        if reply.content.len() > printed {
            write!(out, "{}", &reply.content[printed..])?;
            out.flush()?;
            printed = reply.content.len();
        }
        if !reply.streaming {
            writeln!(out)?;
            return Ok(reply);
        }
    }
}

/// Run the send command - sends a message and prints the response
pub async fn run(config: &Config, message: &str) -> Result<()> {
    if message.trim().is_empty() {
        return Err(AppError::EmptyMessage);
    }

    let engine = ChatEngine::spawn(engine_context(config, open_store(config))?);
    let mut stdout = std::io::stdout();
    let reply = exchange(&engine, message, &mut stdout).await;
    engine.shutdown().await?;

    if reply?.failed {
        return Err(AppError::ReplyFailed);
    }
    Ok(())
}
