//! Intiface websocket adapter.
//!
//! Implements the application's device port against an Intiface-compatible
//! server speaking the Buttplug v2 JSON protocol.

pub mod client;
pub mod error;
pub mod protocol;

pub use client::WebsocketClient;
