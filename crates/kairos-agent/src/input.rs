//! Turn inputs and resume payloads

use serde::{Deserialize, Serialize};

/// Role tag of a fresh user message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
}

/// A fresh message typed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    pub role: Role,
    pub content: String,
}

/// The answer to one interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub authorized: bool,
}

impl Decision {
    pub fn new(authorized: bool) -> Self {
        Self { authorized }
    }

    pub fn approve() -> Self {
        Self::new(true)
    }

    pub fn deny() -> Self {
        Self::new(false)
    }
}

/// What a paused run is resumed with.
///
/// The agent server expects a lone decision when one interrupt was raised
/// and an ordered array otherwise, so the two shapes serialize differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResumePayload {
    Single(Decision),
    Many(Vec<Decision>),
}

impl ResumePayload {
    /// Build the payload for decisions collected in interrupt order.
    /// Returns `None` when there is nothing to resume with.
    pub fn from_decisions(mut decisions: Vec<Decision>) -> Option<Self> {
        match decisions.len() {
            0 => None,
            1 => decisions.pop().map(ResumePayload::Single),
            _ => Some(ResumePayload::Many(decisions)),
        }
    }

    /// The decisions in interrupt order
    pub fn decisions(&self) -> &[Decision] {
        match self {
            ResumePayload::Single(decision) => std::slice::from_ref(decision),
            ResumePayload::Many(decisions) => decisions,
        }
    }
}

/// Input for one streaming call
#[derive(Debug, Clone, PartialEq)]
pub enum TurnInput {
    /// Start a turn from user text
    Message(UserMessage),
    /// Continue a paused run
    Resume(ResumePayload),
}

impl TurnInput {
    /// Create a user-message input
    pub fn user(content: impl Into<String>) -> Self {
        TurnInput::Message(UserMessage {
            role: Role::User,
            content: content.into(),
        })
    }

    pub fn is_resume(&self) -> bool {
        matches!(self, TurnInput::Resume(_))
    }
}
