//! Core data models for the campus assistant

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Directions,
    Facilities,
    General,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventTag {
    Fest,
    Workshop,
    Talk,
    Club,
}

//
// ================= Questions =================
//

/// A predefined question, shown as a suggestion chip
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct QuestionEntry {
    pub id: &'static str,
    pub display_text: &'static str,
    pub category: QuestionCategory,
}

//
// ================= Replies =================
//

/// Which rule produced a reply
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "question_id", rename_all = "snake_case")]
pub enum ReplyKind {
    Greeting,
    Answer(&'static str),
    Keyword(&'static str),
    Fallback,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub show_suggestions: bool,
    pub kind: ReplyKind,
}

//
// ================= Conversation =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }
}

//
// ================= Campus Directory =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct CampusPlace {
    pub key: &'static str,
    pub name: &'static str,
    pub coords: LatLng,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CampusEvent {
    pub id: &'static str,
    pub title: &'static str,
    pub coords: LatLng,
    pub starts_at: NaiveDateTime,
    pub venue: &'static str,
    pub tag: EventTag,
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuestionCategory::Directions => "Directions",
            QuestionCategory::Facilities => "Facilities",
            QuestionCategory::General => "General",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for QuestionCategory {
    type Err = crate::error::AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "directions" => Ok(QuestionCategory::Directions),
            "facilities" => Ok(QuestionCategory::Facilities),
            "general" => Ok(QuestionCategory::General),
            other => Err(crate::error::AssistantError::UnknownCategory(
                other.to_string(),
            )),
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageRole::User => "You",
            MessageRole::Assistant => "Assistant",
        };
        write!(f, "{}", s)
    }
}
