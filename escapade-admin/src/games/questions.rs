//! Editing helpers for the riddle list of a game.
//!
//! The list is always replaced as a whole when a game is written, so these
//! only have to keep `index` in step with the position of each element.

use crate::{Explanation, Question, QuestionType};

/// Sets every question's `index`, and every hint's, to its position
pub fn renumber(questions: &mut [Question]) {
    for (position, question) in questions.iter_mut().enumerate() {
        question.index = position;

        for (hint_position, hint) in question.hints.iter_mut().enumerate() {
            hint.index = hint_position;
        }
    }
}

/// A blank objective placed at the game's location
pub fn new_question(position: usize, lat: f64, lng: f64) -> Question {
    Question {
        name: format!("Objective #{}", position + 1),
        index: position,
        lat,
        lng,
        question_type: QuestionType::TextChoices,
        explanation: Explanation::default(),
        ..Default::default()
    }
}

/// Inserts at `position`, or at the end if it is past the end
pub fn insert_question(questions: &mut Vec<Question>, position: usize, question: Question) {
    let position = position.min(questions.len());

    questions.insert(position, question);
    renumber(questions);
}

/// Appends a blank objective and returns its position
pub fn push_new_question(questions: &mut Vec<Question>, lat: f64, lng: f64) -> usize {
    let position = questions.len();

    questions.push(new_question(position, lat, lng));
    position
}

pub fn remove_question(questions: &mut Vec<Question>, position: usize) -> Option<Question> {
    if position >= questions.len() {
        return None;
    }

    let removed = questions.remove(position);
    renumber(questions);

    Some(removed)
}
