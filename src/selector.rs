//! Response Selector
//!
//! Decides how to answer one piece of free-text input:
//! - Greeting: fixed greeting, opens the suggestion list
//! - Answer: canned response from the question table
//! - Keyword: canned response reached through a synonym or misspelling
//! - Fallback: "no information" reply, opens the suggestion list

use crate::knowledge::ResponseTable;
use crate::models::{Reply, ReplyKind};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

pub const GREETING_TEXT: &str =
    "Hello! What can I help you with? Here are some common questions:";

lazy_static! {
    static ref GREETING: Regex = Regex::new(
        r"(?i)\b(hi|hello|hey|good\s*(morning|afternoon|evening)|namaste|hola)\b"
    )
    .expect("greeting pattern is a valid regex");
}

/// Question words this short never take part in word-overlap matching
const MIN_WORD_LEN: usize = 4;

/// Synonyms and common misspellings, checked in declared order
const KEYWORD_FALLBACKS: &[(&[&str], &str)] = &[
    (&["library", "libraray", "lib"], "lib"),
    (&["cafeteria", "canteen", "food"], "canteen"),
    (&["class", "lecture", "room"], "gblock"),
    (&["admin", "administration"], "admin"),
    (&["hostel", "dormitory"], "hostel"),
];

/// Stateless selector over a response table
#[derive(Debug, Clone, Copy)]
pub struct ResponseSelector {
    table: &'static ResponseTable,
}

impl Default for ResponseSelector {
    fn default() -> Self {
        Self::new(ResponseTable::global())
    }
}

impl ResponseSelector {
    pub fn new(table: &'static ResponseTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static ResponseTable {
        self.table
    }

    /// Pick a reply for non-empty user input. Never fails.
    pub fn select(&self, input: &str) -> Reply {
        let original = input.trim();
        let normalized = original.to_lowercase();

        let reply = self
            .greeting(&normalized)
            .or_else(|| self.exact_question(&normalized))
            .or_else(|| self.word_overlap(&normalized))
            .or_else(|| self.keyword_fallback(&normalized))
            .unwrap_or_else(|| fallback(original));

        debug!(kind = ?reply.kind, show_suggestions = reply.show_suggestions, "Reply selected");
        reply
    }

    fn greeting(&self, normalized: &str) -> Option<Reply> {
        GREETING.is_match(normalized).then(|| Reply {
            text: GREETING_TEXT.to_string(),
            show_suggestions: true,
            kind: ReplyKind::Greeting,
        })
    }

    fn exact_question(&self, normalized: &str) -> Option<Reply> {
        self.table
            .questions()
            .iter()
            .find(|q| q.display_text.to_lowercase() == normalized)
            .and_then(|q| self.answer(q.id, ReplyKind::Answer(q.id)))
    }

    /// Bidirectional containment: a question word longer than three
    /// characters matches if it contains, or is contained in, an input word.
    fn word_overlap(&self, normalized: &str) -> Option<Reply> {
        let input_words: Vec<&str> = normalized.split_whitespace().collect();

        self.table
            .questions()
            .iter()
            .find(|q| {
                let text = q.display_text.to_lowercase();
                text.split(' ').any(|word| {
                    word.chars().count() >= MIN_WORD_LEN
                        && input_words
                            .iter()
                            .any(|input| input.contains(word) || word.contains(input))
                })
            })
            .and_then(|q| self.answer(q.id, ReplyKind::Answer(q.id)))
    }

    fn keyword_fallback(&self, normalized: &str) -> Option<Reply> {
        KEYWORD_FALLBACKS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|kw| normalized.contains(kw)))
            .and_then(|(_, id)| self.answer(id, ReplyKind::Keyword(*id)))
    }

    fn answer(&self, id: &str, kind: ReplyKind) -> Option<Reply> {
        self.table.response(id).map(|text| Reply {
            text: text.to_string(),
            show_suggestions: false,
            kind,
        })
    }
}

fn fallback(original: &str) -> Reply {
    Reply {
        text: format!(
            "I'm sorry, I don't have specific information about \"{}\". I can help you with campus directions, facilities, and general information. Please ask about specific campus locations or choose from the suggested questions below.",
            original
        ),
        show_suggestions: true,
        kind: ReplyKind::Fallback,
    }
}
