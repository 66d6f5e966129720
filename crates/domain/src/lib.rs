//! # chatbuzz-domain
//!
//! Pure domain model for the chatbuzz chat-to-haptics system.
//!
//! ## Responsibilities
//! - Define **Triggers** (intensity + text fragment pairs with a total ordering)
//! - Define the **Trigger set** (ordered, intensity-unique collection with a
//!   line-oriented persistence format)
//! - Define **Chat channels** (and the private/group whitelist)
//! - Define **Chat events** and the **authorization filter** applied to them
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod chat;
pub mod error;
pub mod trigger;
pub mod trigger_set;
