//! Command processor — the full text-command surface.
//!
//! Owns the trigger set, the authorization filter, and the device session,
//! and is the single sequential path through which both configuration
//! commands and chat events flow. Every failure is converted to a
//! user-visible [`Reply`]; nothing propagates far enough to break the
//! host's event loop.

use std::fmt::Write as _;

use chatbuzz_domain::chat::{AuthorizationFilter, ChatEvent};
use chatbuzz_domain::trigger::{Intensity, Trigger};
use chatbuzz_domain::trigger_set::{LoadReport, TriggerSet};

use crate::error::{PersistenceError, SessionError};
use crate::matcher;
use crate::ports::device::DeviceClient;
use crate::ports::reply::Reply;
use crate::session::DeviceSession;

/// Default connect target (the Intiface default).
pub const DEFAULT_TARGET: &str = "localhost:12345";

/// Processes commands and chat events against the engine state.
pub struct CommandProcessor<C> {
    triggers: TriggerSet,
    filter: AuthorizationFilter,
    session: DeviceSession<C>,
    default_target: String,
}

impl<C: DeviceClient> CommandProcessor<C> {
    /// Create a processor with an empty trigger set and no sender
    /// restriction, wrapping `client` in a disconnected session.
    pub fn new(client: C) -> Self {
        Self {
            triggers: TriggerSet::new(),
            filter: AuthorizationFilter::new(),
            session: DeviceSession::new(client),
            default_target: DEFAULT_TARGET.to_string(),
        }
    }

    /// Override the target a bare `connect` uses (startup wiring).
    pub fn set_default_target(&mut self, target: String) {
        self.default_target = target;
    }

    /// The current trigger set.
    #[must_use]
    pub fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    /// The current authorization filter.
    #[must_use]
    pub fn filter(&self) -> &AuthorizationFilter {
        &self.filter
    }

    /// The device session.
    #[must_use]
    pub fn session(&self) -> &DeviceSession<C> {
        &self.session
    }

    /// Set or clear the authorized-sender restriction (startup wiring).
    pub fn set_authorized_user(&mut self, user: Option<String>) {
        self.filter.set_user(user);
    }

    /// Merge persisted trigger lines into the set (startup wiring).
    pub fn merge_triggers(&mut self, text: &str) -> LoadReport {
        self.triggers.merge_from_str(text)
    }

    /// Handle one command line (without any leading slash or command word).
    ///
    /// Subcommands match on the full keyword. An empty line prints the help
    /// text; an unknown subcommand is echoed back.
    pub async fn handle_command(&mut self, line: &str) -> Vec<Reply> {
        let line = line.trim();
        if line.is_empty() {
            return vec![Self::help()];
        }
        let (subcommand, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim_start()),
            None => (line, ""),
        };
        tracing::debug!(subcommand, "handling command");
        match subcommand {
            "help" => vec![Self::help()],
            "list" => self.list_triggers(),
            "add" => self.add_trigger(rest),
            "remove" => self.remove_trigger(rest),
            "connect" => self.connect(rest).await,
            "disconnect" => self.disconnect().await,
            "stop" => self.stop().await,
            "user" => self.set_user(rest),
            "save" => self.save(rest).await,
            "load" => self.load(rest).await,
            _ => vec![Reply::info(format!("Unknown subcommand: {line}"))],
        }
    }

    /// Handle one inbound chat event.
    ///
    /// Authorization filter → matching engine → device session. Matching
    /// silently does nothing when the event is ineligible or no trigger
    /// fires; a failed device command is reported but never propagated.
    pub async fn handle_chat(&mut self, event: &ChatEvent) -> Vec<Reply> {
        if !self.filter.is_eligible(event) {
            return Vec::new();
        }
        let Some(intensity) = matcher::resolve(&event.message, &self.triggers) else {
            return Vec::new();
        };
        tracing::debug!(
            intensity = intensity.value(),
            channel = ?event.channel,
            "trigger matched"
        );
        // send() drains pending discovery events; surface the names first.
        let mut replies = self.poll_device_notifications();
        if let Err(err) = self.session.send(intensity).await {
            tracing::warn!(error = %err, "failed to drive device for matched trigger");
            replies.push(Reply::error(format!(
                "Failed to drive device: {}",
                error_chain(&err)
            )));
        }
        replies
    }

    /// Collect "Added device" notifications from the session.
    pub fn poll_device_notifications(&mut self) -> Vec<Reply> {
        self.session
            .drain_device_events()
            .into_iter()
            .map(|name| Reply::info(format!("Added device: {name}")))
            .collect()
    }

    /// Disconnect the session on teardown.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the teardown itself failed.
    pub async fn shutdown(&mut self) -> Result<(), SessionError> {
        self.session.disconnect().await
    }

    fn help() -> Reply {
        Reply::info(
            "Usage: /list\n\
             \x20      /add <intensity 0-100> <trigger text>\n\
             \x20      /remove <id>\n\
             \x20      /connect [host[:port]]    defaults to 'localhost:12345', the Intiface default\n\
             \x20      /disconnect\n\
             \x20      /stop                     halt all connected devices\n\
             \x20      /user [authorized user]   set/clear sender substring match\n\
             \x20      /save <file path>\n\
             \x20      /load <file path>\n\
             \n\
             Example:\n\
             \x20      /connect\n\
             \x20      /add 0 shh\n\
             \x20      /add 20 slowly\n\
             \x20      /add 75 getting there\n\
             \x20      /add 100 hey ;)\n\
             \x20      /user Alice\n\
             \n\
             These commands let anyone whose name contains 'Alice' drive your connected\n\
             device with the matching phrases, as long as those are uttered in a tell, a\n\
             party, a (cross-world) linkshell, or a free company chat.\n\
             \n\
             Subcommands match on the full keyword.",
        )
    }

    fn list_triggers(&self) -> Vec<Reply> {
        let mut text = String::from("Configured triggers:\nID | Intensity | Text Match");
        for (i, trigger) in self.triggers.iter().enumerate() {
            let _ = write!(
                text,
                "\n[{i}] | {} | {}",
                trigger.intensity(),
                trigger.pattern()
            );
        }
        vec![Reply::info(text)]
    }

    fn add_trigger(&mut self, args: &str) -> Vec<Reply> {
        let Some((head, pattern)) = args.split_once(' ') else {
            return vec![Reply::error(
                "Malformed arguments for [add]: expected '<intensity> <text>'",
            )];
        };
        let intensity: Intensity = match head.parse() {
            Ok(intensity) => intensity,
            Err(err) => return vec![Reply::error(format!("Malformed arguments for [add]: {err}"))],
        };
        let trigger = match Trigger::new(intensity, pattern) {
            Ok(trigger) => trigger,
            Err(err) => return vec![Reply::error(format!("Malformed arguments for [add]: {err}"))],
        };
        if self.triggers.add(trigger.clone()) {
            vec![Reply::info(format!("Added {trigger}"))]
        } else {
            vec![Reply::error(format!(
                "Failed to add {trigger}: possible duplicate?"
            ))]
        }
    }

    fn remove_trigger(&mut self, args: &str) -> Vec<Reply> {
        let Ok(index) = args.trim().parse::<usize>() else {
            return vec![Reply::error(format!(
                "Malformed argument for [remove]: '{}'",
                args.trim()
            ))];
        };
        match self.triggers.remove(index) {
            Ok(trigger) => vec![Reply::info(format!("Removed {trigger}"))],
            Err(err) => vec![Reply::error(err.to_string())],
        }
    }

    async fn connect(&mut self, args: &str) -> Vec<Reply> {
        let target = args.trim();
        let target = if target.is_empty() {
            self.default_target.clone()
        } else {
            target.to_string()
        };
        let mut replies = vec![Reply::info(format!("Connecting to {target}..."))];
        match self.session.connect(&target).await {
            Ok(()) => replies.push(Reply::info("Connected! Scanning for devices...")),
            Err(err) => replies.push(Reply::error(format!(
                "Failed to connect: {}",
                error_chain(&err)
            ))),
        }
        replies
    }

    async fn disconnect(&mut self) -> Vec<Reply> {
        match self.session.disconnect().await {
            Ok(()) => vec![Reply::info("Disconnected.")],
            Err(err) => vec![Reply::error(format!(
                "Disconnect failed: {}",
                error_chain(&err)
            ))],
        }
    }

    async fn stop(&mut self) -> Vec<Reply> {
        match self.session.stop_all().await {
            Ok(()) => vec![Reply::info("Stopped all devices.")],
            Err(err) => vec![Reply::error(format!("Stop failed: {}", error_chain(&err)))],
        }
    }

    fn set_user(&mut self, args: &str) -> Vec<Reply> {
        if args.is_empty() {
            self.filter.set_user(None);
            vec![Reply::info("Cleared authorized user.")]
        } else {
            self.filter.set_user(Some(args.to_string()));
            vec![Reply::info(format!("Authorized user set to '{args}'"))]
        }
    }

    async fn save(&self, args: &str) -> Vec<Reply> {
        let path = args.trim();
        if path.is_empty() {
            return vec![Reply::error(
                "Malformed arguments for [save]: missing file path",
            )];
        }
        match tokio::fs::write(path, self.triggers.serialize()).await {
            Ok(()) => vec![Reply::info(format!("Wrote current triggers to {path}"))],
            Err(source) => {
                let err = PersistenceError {
                    path: path.to_string(),
                    source,
                };
                vec![Reply::error(error_chain(&err))]
            }
        }
    }

    async fn load(&mut self, args: &str) -> Vec<Reply> {
        let path = args.trim();
        if path.is_empty() {
            return vec![Reply::error(
                "Malformed arguments for [load]: missing file path",
            )];
        }
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(source) => {
                let err = PersistenceError {
                    path: path.to_string(),
                    source,
                };
                return vec![Reply::error(error_chain(&err))];
            }
        };
        let report = self.triggers.merge_from_str(&text);
        let mut replies = vec![Reply::info(format!(
            "Loaded {} triggers from {path}",
            report.added
        ))];
        for duplicate in &report.duplicates {
            replies.push(Reply::info(format!("Note: duplicate trigger: {duplicate}")));
        }
        if report.skipped > 0 {
            replies.push(Reply::info(format!(
                "Skipped {} non-trigger lines",
                report.skipped
            )));
        }
        replies
    }
}

/// Render an error with its full source chain, `: `-separated.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(err) = source {
        let _ = write!(out, ": {err}");
        source = err.source();
    }
    out
}
