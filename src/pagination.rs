//! Page-number to record-window conversion and the paged question listing

use rusqlite::Connection;

use crate::db::{self, Category, Question};
use crate::error::{TriviaError, TriviaResult};

pub const QUESTIONS_PER_PAGE: i64 = 10;

/// A 1-based page number, never below 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(i64);

impl Page {
    /// Values at or below zero collapse to the first page
    pub fn new(number: i64) -> Self {
        Page(number.max(1))
    }

    /// Lenient parse of the `page` query parameter: absent or non-numeric means page 1
    pub fn from_param(param: Option<&str>) -> Self {
        param
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(Page::new)
            .unwrap_or_default()
    }

    pub fn number(self) -> i64 {
        self.0
    }

    pub fn offset(self) -> i64 {
        (self.0 - 1).saturating_mul(QUESTIONS_PER_PAGE)
    }

    pub fn limit(self) -> i64 {
        QUESTIONS_PER_PAGE
    }
}

impl Default for Page {
    fn default() -> Self {
        Page(1)
    }
}

/// One page of the catalog together with what the listing endpoint returns alongside it
#[derive(Debug, Clone)]
pub struct QuestionPage {
    pub questions: Vec<Question>,
    pub total_questions: i64,
    pub categories: Vec<Category>,
}

/// Fetch a page of questions. Zero categories, or an empty window, is `NotFound`.
pub fn list_questions(conn: &Connection, page: Page) -> TriviaResult<QuestionPage> {
    let categories = db::list_categories(conn)?;
    if categories.is_empty() {
        log::debug!("No categories seeded; question listing unavailable");
        return Err(TriviaError::NotFound);
    }

    let questions = db::get_questions_page(conn, page.offset(), page.limit())?;
    if questions.is_empty() {
        log::debug!("Page {} is outside the catalog", page.number());
        return Err(TriviaError::NotFound);
    }

    Ok(QuestionPage {
        questions,
        total_questions: db::count_questions(conn)?,
        categories,
    })
}
