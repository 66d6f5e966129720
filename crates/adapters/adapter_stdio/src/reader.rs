//! Stdin reader task.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use chatbuzz_app::dispatcher::InputEvent;

use crate::line::parse_line;

/// Forward stdin lines to the dispatcher until EOF or until the dispatcher
/// goes away.
pub async fn forward_stdin(events: mpsc::Sender<InputEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(event) = parse_line(&line) else {
                    continue;
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stdin");
                break;
            }
        }
    }
    tracing::debug!("stdin input finished");
}
