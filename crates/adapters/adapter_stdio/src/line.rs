//! Input line interpretation.

use chatbuzz_app::dispatcher::InputEvent;
use chatbuzz_domain::chat::ChatEvent;

/// Interpret one input line.
///
/// Returns `None` for blank lines and for chat lines that fail to decode;
/// undecodable lines are logged and dropped rather than stopping the input
/// stream.
#[must_use]
pub fn parse_line(line: &str) -> Option<InputEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(command) = trimmed.strip_prefix('/') {
        return Some(InputEvent::Command(command.to_string()));
    }
    match serde_json::from_str::<ChatEvent>(trimmed) {
        Ok(chat) => Some(InputEvent::Chat(chat)),
        Err(err) => {
            tracing::warn!(error = %err, "dropping undecodable chat line");
            None
        }
    }
}
