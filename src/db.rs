//! Database operations for the trivia catalog: category and question stores

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

/// Category record; seeded at setup time and read-only afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Question record as stored and as returned over the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    /// Unchecked reference to `Category::id`; may dangle or be absent
    pub category: Option<i64>,
}

/// Fields required to create a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category: Option<i64>,
}

const QUESTION_COLUMNS: &str = "SELECT id, question, answer, difficulty, category FROM questions";

fn question_from_row(row: &Row<'_>) -> SqliteResult<Question> {
    Ok(Question {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        difficulty: row.get(3)?,
        category: row.get(4)?,
    })
}

/// Create tables if missing. `questions.category` deliberately has no foreign key.
pub fn init_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            type TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            difficulty INTEGER NOT NULL,
            category INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category);",
    )
}

/// Build the connection pool shared by the HTTP workers
pub fn open_pool(db_path: &Path, max_size: u32) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch("PRAGMA busy_timeout = 5000;"));
    r2d2::Pool::builder().max_size(max_size).build(manager)
}

// ============= Category store =============

/// Every category, ordered by id
pub fn list_categories(conn: &Connection) -> SqliteResult<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, type FROM categories ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Category {
            id: row.get(0)?,
            kind: row.get(1)?,
        })
    })?;
    rows.collect()
}

/// Single category lookup
pub fn get_category(conn: &Connection, category_id: i64) -> SqliteResult<Option<Category>> {
    conn.query_row(
        "SELECT id, type FROM categories WHERE id = ?1",
        params![category_id],
        |row| {
            Ok(Category {
                id: row.get(0)?,
                kind: row.get(1)?,
            })
        },
    )
    .optional()
}

/// Insert (or replace) a category. Only the seeding step calls this.
pub fn insert_category(conn: &Connection, category_id: i64, kind: &str) -> SqliteResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO categories (id, type) VALUES (?1, ?2)",
        params![category_id, kind],
    )?;
    Ok(())
}

// ============= Question store =============

/// Composable question filter. Conditions are AND-ed together.
///
/// Only the category condition runs in SQL; exclusions and the Unicode
/// case-folded substring match are applied to the fetched rows.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    category: Option<i64>,
    excluded: HashSet<i64>,
    containing: Option<String>,
}

impl QuestionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact match on the category reference
    pub fn category(mut self, category_id: i64) -> Self {
        self.category = Some(category_id);
        self
    }

    /// Drop questions whose id is in `ids`
    pub fn excluding(mut self, ids: &[i64]) -> Self {
        self.excluded.extend(ids.iter().copied());
        self
    }

    /// Case-insensitive substring match on the question text
    pub fn containing(mut self, term: &str) -> Self {
        self.containing = Some(term.to_lowercase());
        self
    }

    fn to_sql(&self) -> (String, Vec<Value>) {
        match self.category {
            Some(category_id) => (
                format!("{} WHERE category = ?1 ORDER BY id ASC", QUESTION_COLUMNS),
                vec![Value::Integer(category_id)],
            ),
            None => (format!("{} ORDER BY id ASC", QUESTION_COLUMNS), Vec::new()),
        }
    }

    fn matches(&self, question: &Question) -> bool {
        if self.excluded.contains(&question.id) {
            return false;
        }
        match self.containing {
            Some(ref needle) => question.question.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}

/// Run a filter against the store, ordered by id
pub fn find_questions(conn: &Connection, filter: &QuestionFilter) -> SqliteResult<Vec<Question>> {
    let (query, values) = filter.to_sql();
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map(params_from_iter(values), question_from_row)?;

    let mut questions = Vec::new();
    for question in rows {
        let question = question?;
        if filter.matches(&question) {
            questions.push(question);
        }
    }
    Ok(questions)
}

/// Total number of questions in the catalog
pub fn count_questions(conn: &Connection) -> SqliteResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))
}

/// Up to `limit` questions starting at `offset`, ordered by id
pub fn get_questions_page(conn: &Connection, offset: i64, limit: i64) -> SqliteResult<Vec<Question>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC LIMIT ?1 OFFSET ?2", QUESTION_COLUMNS))?;
    let rows = stmt.query_map(params![limit, offset], question_from_row)?;
    rows.collect()
}

/// Questions whose text contains `term`, ignoring case
pub fn search_questions(conn: &Connection, term: &str) -> SqliteResult<Vec<Question>> {
    find_questions(conn, &QuestionFilter::new().containing(term))
}

/// Questions referencing `category_id`
pub fn get_questions_by_category(conn: &Connection, category_id: i64) -> SqliteResult<Vec<Question>> {
    find_questions(conn, &QuestionFilter::new().category(category_id))
}

/// Get single question by ID
pub fn get_question_by_id(conn: &Connection, question_id: i64) -> SqliteResult<Option<Question>> {
    conn.query_row(
        &format!("{} WHERE id = ?1", QUESTION_COLUMNS),
        params![question_id],
        question_from_row,
    )
    .optional()
}

/// Persist a new question and return it with its assigned id
pub fn add_question(conn: &Connection, new: &NewQuestion) -> SqliteResult<Question> {
    insert_question(conn, None, new)
}

/// Insert with an explicit id when one is given (seeding), otherwise let SQLite assign it
pub(crate) fn insert_question(conn: &Connection, id: Option<i64>, new: &NewQuestion) -> SqliteResult<Question> {
    conn.execute(
        "INSERT INTO questions (id, question, answer, difficulty, category) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, new.question, new.answer, new.difficulty, new.category],
    )?;

    Ok(Question {
        id: conn.last_insert_rowid(),
        question: new.question.clone(),
        answer: new.answer.clone(),
        difficulty: new.difficulty,
        category: new.category,
    })
}

/// Delete a question. Returns `false` when no such question existed.
pub fn delete_question(conn: &Connection, question_id: i64) -> SqliteResult<bool> {
    let deleted = conn.execute("DELETE FROM questions WHERE id = ?1", params![question_id])?;
    Ok(deleted > 0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::seed;
    use std::path::PathBuf;

    /// In-memory database loaded with the catalog shipped under `data/`
    pub(crate) fn seeded_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
        seed::load_categories(&conn, &data.join("categories.csv")).unwrap();
        seed::load_questions(&conn, &data.join("questions.csv")).unwrap();
        conn
    }

    fn ids(questions: &[Question]) -> Vec<i64> {
        questions.iter().map(|q| q.id).collect()
    }

    #[test]
    fn test_list_categories_ordered() {
        let conn = seeded_conn();
        let categories = list_categories(&conn).unwrap();
        assert_eq!(categories.len(), 6);
        assert_eq!(categories[0], Category { id: 1, kind: "Science".into() });
        assert_eq!(categories[2].kind, "Geography");
    }

    #[test]
    fn test_get_category_missing() {
        let conn = seeded_conn();
        assert_eq!(get_category(&conn, 3).unwrap().unwrap().kind, "Geography");
        assert!(get_category(&conn, 1000).unwrap().is_none());
    }

    #[test]
    fn test_pages_are_disjoint_and_stable() {
        let conn = seeded_conn();
        let first = get_questions_page(&conn, 0, 10).unwrap();
        let second = get_questions_page(&conn, 10, 10).unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 9);
        assert!(ids(&first).iter().all(|id| !ids(&second).contains(id)));
        assert_eq!(first, get_questions_page(&conn, 0, 10).unwrap());

        let mut sorted = ids(&first);
        sorted.sort();
        assert_eq!(sorted, ids(&first));
    }

    #[test]
    fn test_search_ignores_case() {
        let conn = seeded_conn();
        let upper = search_questions(&conn, "WHAT").unwrap();
        let lower = search_questions(&conn, "what").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 8);
    }

    #[test]
    fn test_search_only_looks_at_question_text() {
        let conn = seeded_conn();
        // "Muhammad Ali" is an answer, not part of any question
        assert!(search_questions(&conn, "Muhammad").unwrap().is_empty());
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let conn = seeded_conn();
        let created = add_question(
            &conn,
            &NewQuestion {
                question: "Qu'est-ce que l'ÉTÉ?".into(),
                answer: "Summer".into(),
                difficulty: 1,
                category: Some(5),
            },
        )
        .unwrap();
        assert_eq!(ids(&search_questions(&conn, "été").unwrap()), vec![created.id]);
        assert_eq!(ids(&search_questions(&conn, "ÉTÉ").unwrap()), vec![created.id]);
    }

    #[test]
    fn test_large_exclusion_list() {
        let conn = seeded_conn();
        let mut excluded: Vec<i64> = (1000..41000).collect();
        excluded.extend([20, 22, 20]);
        let filter = QuestionFilter::new().category(1).excluding(&excluded);
        assert_eq!(ids(&find_questions(&conn, &filter).unwrap()), vec![21]);
    }

    #[test]
    fn test_search_wildcards_are_literal() {
        let conn = seeded_conn();
        assert!(search_questions(&conn, "%").unwrap().is_empty());
        assert!(search_questions(&conn, "_").unwrap().is_empty());
    }

    #[test]
    fn test_filter_composes_category_and_exclusions() {
        let conn = seeded_conn();
        let filter = QuestionFilter::new().category(1).excluding(&[20, 22]);
        assert_eq!(ids(&find_questions(&conn, &filter).unwrap()), vec![21]);
        assert_eq!(ids(&get_questions_by_category(&conn, 3).unwrap()), vec![13, 14, 15]);
    }

    #[test]
    fn test_add_then_delete() {
        let conn = seeded_conn();
        let created = add_question(
            &conn,
            &NewQuestion {
                question: "Hello".into(),
                answer: "Hi".into(),
                difficulty: 5,
                category: Some(5),
            },
        )
        .unwrap();
        assert!(created.id > 23);
        assert_eq!(get_question_by_id(&conn, created.id).unwrap(), Some(created.clone()));
        assert_eq!(count_questions(&conn).unwrap(), 20);

        assert!(delete_question(&conn, created.id).unwrap());
        assert!(!delete_question(&conn, created.id).unwrap());
    }

    #[test]
    fn test_dangling_category_is_accepted() {
        let conn = seeded_conn();
        let created = add_question(
            &conn,
            &NewQuestion {
                question: "Orphan?".into(),
                answer: "Yes".into(),
                difficulty: 1,
                category: Some(999),
            },
        )
        .unwrap();
        assert_eq!(ids(&get_questions_by_category(&conn, 999).unwrap()), vec![created.id]);
        assert!(get_category(&conn, 999).unwrap().is_none());
    }
}
