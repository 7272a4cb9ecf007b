//! Next-question selection for a running quiz

use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::{Connection, Result as SqliteResult};

use crate::db::{self, Question, QuestionFilter};
use crate::error::{TriviaError, TriviaResult};
use crate::request::QuizCategory;

/// Category id the quiz client sends for "All"
pub const ALL_CATEGORIES: i64 = 0;

/// Questions still available: not previously asked, and in the category unless it is `ALL_CATEGORIES`
pub fn candidate_pool(conn: &Connection, previous: &[i64], category_id: i64) -> SqliteResult<Vec<Question>> {
    let mut filter = QuestionFilter::new().excluding(previous);
    if category_id != ALL_CATEGORIES {
        filter = filter.category(category_id);
    }
    db::find_questions(conn, &filter)
}

/// Pick one unseen question uniformly at random.
///
/// `Ok(None)` means the pool is exhausted, which is a normal end of the quiz.
pub fn next_question<R: Rng + ?Sized>(
    conn: &Connection,
    rng: &mut R,
    previous: &[i64],
    quiz_category: Option<&QuizCategory>,
) -> TriviaResult<Option<Question>> {
    let category = quiz_category.ok_or(TriviaError::InvalidRequest)?;

    let pool = candidate_pool(conn, previous, category.id)?;
    let picked = pool.choose(rng).cloned();

    log::debug!(
        "Quiz category {} ({} asked): {} candidates, picked {:?}",
        category.id,
        previous.len(),
        pool.len(),
        picked.as_ref().map(|q| q.id)
    );

    Ok(picked)
}
