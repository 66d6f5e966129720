//! # chatbuzz-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceClient` — connect, scan, vibrate, disconnect against a
//!     device-control server
//!   - `ReplySink` — deliver user-visible replies back to the host
//! - Provide the **matching engine** (message → intensity resolution)
//! - Own the **device session** state machine (connect/scan/send/disconnect)
//! - Own the **command processor** (the full text-command surface) and the
//!   **dispatcher** loop that consumes commands and chat events in arrival
//!   order
//!
//! ## Dependency rule
//! Depends on `chatbuzz-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod matcher;
pub mod ports;
pub mod session;
