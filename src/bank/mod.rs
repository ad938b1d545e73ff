pub mod loader;
pub mod question;

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

pub use question::{Letter, OPTION_COUNT, Question, QuestionId, RejectReason};

use question::RawQuestion;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("question bank is not a JSON array: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question bank contains no valid questions")]
    NoValidQuestions,
    #[error("failed to fetch question bank from {0}")]
    Fetch(String),
}

/// The read-only set of questions an exam draws from.
#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
}

/// Result of parsing a bank document: the usable bank plus the number of
/// entries that were dropped.
#[derive(Debug)]
pub struct ParsedBank {
    pub bank: QuestionBank,
    pub skipped: usize,
}

impl QuestionBank {
    /// Build a bank, keeping the first question for any repeated id.
    pub fn new(questions: Vec<Question>) -> Self {
        let mut bank = Self::default();
        for q in questions {
            bank.push(q);
        }
        bank
    }

    fn push(&mut self, question: Question) -> bool {
        if self.index.contains_key(&question.id) {
            return false;
        }
        self.index.insert(question.id, self.questions.len());
        self.questions.push(question);
        true
    }

    /// Parse a JSON array of questions. Entries that are malformed, do not have
    /// exactly four options, or repeat an earlier id are skipped.
    pub fn from_json(json: &str) -> Result<ParsedBank, BankError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut bank = Self::default();
        let mut skipped = 0;

        for entry in entries {
            let accepted = serde_json::from_value::<RawQuestion>(entry)
                .map_err(|_| None)
                .and_then(|raw| Question::try_from(raw).map_err(Some))
                .map(|q| bank.push(q));
            match accepted {
                Ok(true) => {}
                Ok(false) => {
                    debug!("skipping question with duplicate id");
                    skipped += 1;
                }
                Err(reason) => {
                    debug!(?reason, "skipping invalid question entry");
                    skipped += 1;
                }
            }
        }

        if bank.is_empty() {
            return Err(BankError::NoValidQuestions);
        }
        Ok(ParsedBank { bank, skipped })
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.index.get(&id).map(|&i| &self.questions[i])
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.questions.iter().map(|q| q.id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
