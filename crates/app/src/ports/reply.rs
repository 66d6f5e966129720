//! Reply port — how user-visible output reaches the host.

use std::future::Future;

/// Whether a reply is informational or an error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Info,
    Error,
}

/// One line (possibly multi-line) of user-visible output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

impl Reply {
    /// An informational reply.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Info,
            text: text.into(),
        }
    }

    /// An error reply.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Error,
            text: text.into(),
        }
    }

    /// Whether this reply reports an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == ReplyKind::Error
    }
}

/// Delivers replies back to the user.
///
/// Adapters decide what delivery means (stdout, a chat window, a log).
/// Delivery is best-effort; sinks must not fail the dispatcher.
pub trait ReplySink: Send {
    fn deliver(&mut self, reply: &Reply) -> impl Future<Output = ()> + Send;
}
