use std::fmt;

use serde::{Deserialize, Serialize};

pub type QuestionId = u32;

pub const OPTION_COUNT: usize = 4;

/// Option label. A letter is a position: `A` is the first option, `D` the last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    pub const ALL: [Letter; OPTION_COUNT] = [Letter::A, Letter::B, Letter::C, Letter::D];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn as_char(self) -> char {
        (b'A' + self as u8) as char
    }

    /// Accepts `"A"`..`"D"` in either case, ignoring surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        let ch = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        match ch.to_ascii_uppercase() {
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            _ => None,
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
    #[serde(rename = "correctAnswer")]
    pub correct_answer: Letter,
}

impl Question {
    /// Option text at a canonical position, without its `"A) "` label.
    pub fn option_text(&self, letter: Letter) -> &str {
        strip_label(&self.options[letter.index()])
    }

    pub fn correct_text(&self) -> &str {
        self.option_text(self.correct_answer)
    }
}

/// Bank entry as it appears on disk. Every field is optional so a single
/// malformed entry can be rejected without failing the whole document.
#[derive(Debug, Deserialize)]
pub(crate) struct RawQuestion {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default, rename = "correctAnswer")]
    correct_answer: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    MissingId,
    MissingPrompt,
    WrongOptionCount(usize),
    InvalidAnswer,
}

impl TryFrom<RawQuestion> for Question {
    type Error = RejectReason;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .filter(|&id| id > 0)
            .and_then(|id| QuestionId::try_from(id).ok())
            .ok_or(RejectReason::MissingId)?;
        let prompt = raw
            .question
            .filter(|q| !q.trim().is_empty())
            .ok_or(RejectReason::MissingPrompt)?;
        let options = raw.options.unwrap_or_default();
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|v: Vec<String>| RejectReason::WrongOptionCount(v.len()))?;
        let correct_answer = raw
            .correct_answer
            .as_deref()
            .and_then(Letter::parse)
            .ok_or(RejectReason::InvalidAnswer)?;

        Ok(Self {
            id,
            prompt,
            options,
            correct_answer,
        })
    }
}

/// Remove a leading `"X) "` label from option text.
pub fn strip_label(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b')' {
        text[2..].trim_start()
    } else {
        text
    }
}
