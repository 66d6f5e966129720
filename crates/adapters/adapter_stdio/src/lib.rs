//! Stdio adapter.
//!
//! Reads line-oriented input on stdin and writes replies to stdout. A line
//! starting with `/` is a command; any other non-empty line is a
//! JSON-encoded chat event:
//!
//! ```text
//! /add 75 getting there
//! {"channel":"party","sender":"Alice","message":"getting there"}
//! ```

pub mod line;
pub mod reader;
pub mod sink;

pub use reader::forward_stdin;
pub use sink::StdoutReplySink;
