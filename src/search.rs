//! Substring search over question text

use rusqlite::Connection;

use crate::db::{self, Question};
use crate::error::{TriviaError, TriviaResult};

/// Search questions by a required term.
///
/// An absent term is `InvalidRequest`; a search that matches nothing is `NotFound`.
/// An empty string is a valid term and matches every question.
pub fn search(conn: &Connection, term: Option<&str>) -> TriviaResult<Vec<Question>> {
    let term = term.ok_or(TriviaError::InvalidRequest)?;

    let questions = db::search_questions(conn, term)?;
    log::debug!("Search for {:?} matched {} questions", term, questions.len());

    if questions.is_empty() {
        return Err(TriviaError::NotFound);
    }
    Ok(questions)
}
