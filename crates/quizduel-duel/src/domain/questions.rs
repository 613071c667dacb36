//! Question pool for duels.

use std::collections::HashSet;

use quizduel_core::error::DomainError;
use quizduel_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

use super::ids::QuestionId;

/// Number of answer options every duel question carries.
pub const OPTION_COUNT: usize = 4;

/// Lowest configurable difficulty.
pub const MIN_POINTS: u8 = 1;

/// Highest configurable difficulty.
pub const MAX_POINTS: u8 = 5;

fn default_points() -> u8 {
    3
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question identifier, unique within the pool.
    pub id: QuestionId,
    /// Prompt text.
    pub text: String,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    #[serde(alias = "answer")]
    pub correct_option: u8,
    /// Difficulty, also the reward for a correct answer.
    #[serde(default = "default_points")]
    pub points: u8,
    /// Optional explanation shown with the round result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<String>,
}

impl Question {
    /// Text of the correct option.
    #[must_use]
    pub fn correct_text(&self) -> &str {
        self.options
            .get(usize::from(self.correct_option))
            .map_or("", String::as_str)
    }

    /// Whether `option` addresses one of this question's options.
    #[must_use]
    pub fn has_option(&self, option: u8) -> bool {
        usize::from(option) < self.options.len()
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.options.len() != OPTION_COUNT {
            return Err(DomainError::Validation(format!(
                "question {} has {} options, expected {OPTION_COUNT}",
                self.id,
                self.options.len()
            )));
        }
        if !self.has_option(self.correct_option) {
            return Err(DomainError::Validation(format!(
                "question {} marks option {} as correct, which does not exist",
                self.id, self.correct_option
            )));
        }
        if !(MIN_POINTS..=MAX_POINTS).contains(&self.points) {
            return Err(DomainError::Validation(format!(
                "question {} is worth {} points, expected {MIN_POINTS}..={MAX_POINTS}",
                self.id, self.points
            )));
        }
        Ok(())
    }
}

/// Read-only, validated collection of questions.
#[derive(Debug, Clone, Default)]
pub struct QuestionPool {
    questions: Vec<Question>,
}

impl QuestionPool {
    /// Builds a pool from already-parsed questions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a question is malformed or an id
    /// appears twice.
    pub fn new(questions: Vec<Question>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            question.validate()?;
            if !seen.insert(question.id) {
                return Err(DomainError::Validation(format!(
                    "duplicate question id {}",
                    question.id
                )));
            }
        }
        Ok(Self { questions })
    }

    /// Parses a JSON array of questions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the document does not parse or a
    /// question is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, DomainError> {
        let questions: Vec<Question> = serde_json::from_str(json)
            .map_err(|e| DomainError::Validation(format!("question pool does not parse: {e}")))?;
        Self::new(questions)
    }

    /// Number of questions in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the pool has no questions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Draws `count` distinct questions at random, or the whole pool in random
    /// order when it holds fewer than `count`.
    pub fn draw(&self, count: usize, rng: &mut dyn DeterministicRng) -> Vec<Question> {
        let take = count.min(self.questions.len());
        let mut order: Vec<usize> = (0..self.questions.len()).collect();
        let last = u32::try_from(order.len().saturating_sub(1)).unwrap_or(u32::MAX);
        // Partial Fisher-Yates: only the first `take` slots are settled.
        for i in 0..take {
            let low = u32::try_from(i).unwrap_or(last);
            let j = usize::try_from(rng.next_u32_range(low, last)).unwrap_or(i);
            order.swap(i, j);
        }
        order
            .into_iter()
            .take(take)
            .map(|i| self.questions[i].clone())
            .collect()
    }
}
