//! Chat events, channel kinds, and the authorization filter.

use serde::{Deserialize, Serialize};

/// The kind of chat channel a message arrived on.
///
/// Trigger scanning is restricted to private/group channels — see
/// [`is_private_group`](Self::is_private_group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatChannel {
    Say,
    Shout,
    Yell,
    Emote,
    Tell,
    Party,
    Alliance,
    FreeCompany,
    CrossParty,
    NoviceNetwork,
    #[serde(rename = "ls1")]
    Linkshell1,
    #[serde(rename = "ls2")]
    Linkshell2,
    #[serde(rename = "ls3")]
    Linkshell3,
    #[serde(rename = "ls4")]
    Linkshell4,
    #[serde(rename = "ls5")]
    Linkshell5,
    #[serde(rename = "ls6")]
    Linkshell6,
    #[serde(rename = "ls7")]
    Linkshell7,
    #[serde(rename = "ls8")]
    Linkshell8,
    #[serde(rename = "cwls1")]
    CrossLinkshell1,
    #[serde(rename = "cwls2")]
    CrossLinkshell2,
    #[serde(rename = "cwls3")]
    CrossLinkshell3,
    #[serde(rename = "cwls4")]
    CrossLinkshell4,
    #[serde(rename = "cwls5")]
    CrossLinkshell5,
    #[serde(rename = "cwls6")]
    CrossLinkshell6,
    #[serde(rename = "cwls7")]
    CrossLinkshell7,
    #[serde(rename = "cwls8")]
    CrossLinkshell8,
}

impl ChatChannel {
    /// Whether this channel is in the fixed whitelist of private/group
    /// channels eligible for trigger scanning: tells, party, free company,
    /// cross-party, and the eight linkshells in both local and cross-world
    /// variants.
    #[must_use]
    pub fn is_private_group(self) -> bool {
        matches!(
            self,
            Self::Tell
                | Self::Party
                | Self::FreeCompany
                | Self::CrossParty
                | Self::Linkshell1
                | Self::Linkshell2
                | Self::Linkshell3
                | Self::Linkshell4
                | Self::Linkshell5
                | Self::Linkshell6
                | Self::Linkshell7
                | Self::Linkshell8
                | Self::CrossLinkshell1
                | Self::CrossLinkshell2
                | Self::CrossLinkshell3
                | Self::CrossLinkshell4
                | Self::CrossLinkshell5
                | Self::CrossLinkshell6
                | Self::CrossLinkshell7
                | Self::CrossLinkshell8
        )
    }
}

/// One inbound chat message, as delivered by the host chat subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// The channel the message was spoken on.
    pub channel: ChatChannel,
    /// The sender's display text (name, world, decorations — host-defined).
    pub sender: String,
    /// The message body.
    pub message: String,
}

/// Decides whether a chat event is eligible for trigger matching.
///
/// Pure state + predicate; mutated only by the `user` command. Not part of
/// the persisted trigger file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationFilter {
    authorized_user: Option<String>,
}

impl AuthorizationFilter {
    /// Create a filter with no sender restriction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the authorized-sender substring.
    ///
    /// An empty string clears the restriction, same as `None`.
    pub fn set_user(&mut self, user: Option<String>) {
        self.authorized_user = user.filter(|u| !u.is_empty());
    }

    /// The current sender restriction, if any.
    #[must_use]
    pub fn authorized_user(&self) -> Option<&str> {
        self.authorized_user.as_deref()
    }

    /// Whether `event` is eligible for trigger matching.
    ///
    /// The channel must be in the private/group whitelist, and — when a
    /// restriction is set — the sender text must contain the authorized
    /// user as a case-sensitive substring.
    #[must_use]
    pub fn is_eligible(&self, event: &ChatEvent) -> bool {
        if !event.channel.is_private_group() {
            return false;
        }
        match &self.authorized_user {
            Some(user) => event.sender.contains(user.as_str()),
            None => true,
        }
    }
}
