//! Question fixtures.

use quizduel_duel::domain::ids::QuestionId;
use quizduel_duel::domain::questions::{Question, QuestionPool};

/// A four-option question whose correct option is `correct`.
#[must_use]
pub fn question(id: u32, correct: u8, points: u8) -> Question {
    Question {
        id: QuestionId(id),
        text: format!("Question {id}?"),
        options: vec![
            "Option A".to_owned(),
            "Option B".to_owned(),
            "Option C".to_owned(),
            "Option D".to_owned(),
        ],
        correct_option: correct,
        points,
        explain: Some(format!("Explanation {id}")),
    }
}

/// A validated pool built from `(correct, points)` pairs, with ids
/// numbered from 1.
///
/// # Panics
///
/// Panics if a pair is not a valid question.
#[must_use]
pub fn question_pool(rounds: &[(u8, u8)]) -> QuestionPool {
    let questions = rounds
        .iter()
        .zip(1u32..)
        .map(|(&(correct, points), id)| question(id, correct, points))
        .collect();
    QuestionPool::new(questions).expect("fixture questions are valid")
}
