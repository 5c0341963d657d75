//! Canned-response table
//!
//! The predefined questions double as suggestion chips. Each question id maps
//! to exactly one canned response; the mapping is checked once at startup.

use crate::error::AssistantError;
use crate::models::{QuestionCategory, QuestionEntry};
use crate::Result;
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Predefined questions in declaration order. Order matters: the selector's
/// word-overlap pass returns the first entry that matches.
pub const QUESTIONS: &[QuestionEntry] = &[
    // Directions
    question("lib", "How do I get to the Library?", QuestionCategory::Directions),
    question("admin", "Where is the Admin Block?", QuestionCategory::Directions),
    question("canteen", "How do I reach the Red Canteen?", QuestionCategory::Directions),
    question("hostel", "Where is the H Block Hostel?", QuestionCategory::Directions),
    question("gblock", "How do I get to G Block?", QuestionCategory::Directions),
    question("stationary", "Where is the Stationary Store?", QuestionCategory::Directions),
    // Facilities
    question("parking", "Where can I park my vehicle?", QuestionCategory::Facilities),
    question("atm", "Is there an ATM on campus?", QuestionCategory::Facilities),
    question("medical", "Where is the medical center?", QuestionCategory::Facilities),
    question("gym", "Is there a gym facility?", QuestionCategory::Facilities),
    // General
    question("hours", "What are the campus operating hours?", QuestionCategory::General),
    question("security", "How do I contact campus security?", QuestionCategory::General),
    question("wifi", "How do I connect to campus WiFi?", QuestionCategory::General),
    question("events", "Where can I find information about campus events?", QuestionCategory::General),
];

pub const RESPONSES: &[(&str, &str)] = &[
    // Directions
    ("lib", "The Library is located in the Academic Block, 2nd floor. From the main entrance, go straight past the Admin Block, turn right at the fountain, and it's the large building on your left."),
    ("admin", "The Admin Block is the first major building you'll see when entering campus. It's located straight ahead from the main gate, about 200 meters down the main path."),
    ("canteen", "The Red Canteen is located near the student center. From the Admin Block, walk towards the G Block, then turn left at the intersection. The canteen will be on your right."),
    ("hostel", "H Block Hostel is located in the residential area. From the main gate, take the left path after the Admin Block, continue for about 300 meters, and you'll see the hostel buildings on your right."),
    ("gblock", "G Block is the main academic building. From the Admin Block, walk straight down the central path for about 150 meters. It's the large building with the clock tower."),
    ("stationary", "The Stationary Store is located near the student center, next to the Red Canteen. From the Admin Block, follow the path towards G Block and turn left at the first intersection."),
    // Facilities
    ("parking", "There are two main parking areas: one near the main gate (visitor parking) and one behind the Admin Block (student parking). Both are clearly marked with signs."),
    ("atm", "Yes, there are two ATMs on campus: one in the Admin Block lobby and another near the Red Canteen. Both accept major bank cards."),
    ("medical", "The medical center is located in the Admin Block, ground floor, room 101. It's open from 8 AM to 6 PM on weekdays."),
    ("gym", "The campus gym is located in the sports complex behind G Block. It's open from 6 AM to 10 PM daily. You'll need your student ID to access it."),
    // General
    ("hours", "Campus is open 24/7 for students with valid IDs. Admin offices are open Monday to Friday, 8 AM to 6 PM. Academic buildings are open from 7 AM to 9 PM."),
    ("security", "Campus security can be reached at extension 100 from any campus phone, or call the main security office at +91-XXX-XXXXXXX. Emergency response is available 24/7."),
    ("wifi", "Connect to \"SRM_Student\" network using your student ID and password. If you have issues, visit the IT help desk in the Admin Block, room 205."),
    ("events", "Check the notice boards in the Admin Block lobby, visit the student affairs office, or check the campus app for upcoming events and activities."),
];

pub const WELCOME_TEXT: &str = "Hi! I'm your Campus AI Assistant. I can help you with directions, facilities, and general campus information. Ask me anything or choose from the suggested questions below!";

pub const UNKNOWN_QUESTION_TEXT: &str =
    "I apologize, but I don't have information about that question.";

const fn question(
    id: &'static str,
    display_text: &'static str,
    category: QuestionCategory,
) -> QuestionEntry {
    QuestionEntry {
        id,
        display_text,
        category,
    }
}

/// Immutable id → response mapping
#[derive(Debug, Clone)]
pub struct ResponseTable {
    questions: &'static [QuestionEntry],
    responses: HashMap<&'static str, &'static str>,
}

lazy_static! {
    static ref GLOBAL_TABLE: ResponseTable =
        match ResponseTable::build(QUESTIONS, RESPONSES) {
            Ok(table) => table,
            Err(e) => panic!("canned-response table is invalid: {}", e),
        };
}

impl ResponseTable {
    /// Build a table, rejecting duplicate question ids and questions
    /// without a response.
    pub fn build(
        questions: &'static [QuestionEntry],
        responses: &[(&'static str, &'static str)],
    ) -> Result<Self> {
        let mut seen = HashSet::with_capacity(questions.len());
        for q in questions {
            if !seen.insert(q.id) {
                return Err(AssistantError::DuplicateQuestion(q.id.to_string()));
            }
        }

        let responses: HashMap<_, _> = responses.iter().copied().collect();

        if let Some(missing) = questions.iter().find(|q| !responses.contains_key(q.id)) {
            return Err(AssistantError::MissingResponse(missing.id.to_string()));
        }

        debug!(
            questions = questions.len(),
            responses = responses.len(),
            "Canned-response table built"
        );

        Ok(Self {
            questions,
            responses,
        })
    }

    /// Process-wide table built from [`QUESTIONS`] and [`RESPONSES`]
    pub fn global() -> &'static ResponseTable {
        &GLOBAL_TABLE
    }

    pub fn questions(&self) -> &'static [QuestionEntry] {
        self.questions
    }

    pub fn question(&self, id: &str) -> Option<&'static QuestionEntry> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn response(&self, id: &str) -> Option<&'static str> {
        self.responses.get(id).copied()
    }

    pub fn by_category(
        &self,
        category: QuestionCategory,
    ) -> impl Iterator<Item = &'static QuestionEntry> {
        self.questions.iter().filter(move |q| q.category == category)
    }
}

/// Fail fast at startup if the built-in table is inconsistent
pub fn ensure_valid() -> Result<()> {
    ResponseTable::build(QUESTIONS, RESPONSES).map(|_| ())
}
