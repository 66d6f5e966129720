//! Stdout reply sink.

use std::future::Future;

use tokio::io::AsyncWriteExt;

use chatbuzz_app::ports::reply::{Reply, ReplySink};

/// Writes replies to stdout, one per line, prefixing errors with `error:`.
pub struct StdoutReplySink {
    out: tokio::io::Stdout,
}

impl StdoutReplySink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutReplySink {
    fn default() -> Self {
        Self::new()
    }
}

fn render(reply: &Reply) -> String {
    if reply.is_error() {
        format!("error: {}\n", reply.text)
    } else {
        format!("{}\n", reply.text)
    }
}

impl ReplySink for StdoutReplySink {
    fn deliver(&mut self, reply: &Reply) -> impl Future<Output = ()> + Send {
        let line = render(reply);
        async move {
            if let Err(err) = self.out.write_all(line.as_bytes()).await {
                tracing::warn!(error = %err, "failed to write reply");
                return;
            }
            let _ = self.out.flush().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_prefix_errors_only() {
        assert_eq!(render(&Reply::info("Connected!")), "Connected!\n");
        assert_eq!(render(&Reply::error("boom")), "error: boom\n");
    }
}
