//! Setup-time seeding of the catalog from CSV or Excel files

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::db::{self, NewQuestion};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("Failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Missing required '{0}' column in file header")]
    MissingColumn(&'static str),

    #[error("Empty file - no header row")]
    Empty,

    #[error("Failed to store seed rows: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Header row plus data rows, already trimmed to strings
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn column(&self, names: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| names.contains(&h.to_lowercase().trim()))
    }

    fn required(&self, names: &[&'static str]) -> Result<usize, SeedError> {
        self.column(names).ok_or(SeedError::MissingColumn(names[0]))
    }
}

fn cell(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
        .map(|s| s.as_str())
        .filter(|s| !s.is_empty())
}

/// Integers in spreadsheets often come back as "3.0"
fn parse_int(value: &str) -> Option<i64> {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| {
            value
                .parse::<f64>()
                .ok()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        })
}

/// Read a file into a table, picking the parser from the extension
fn read_table(path: &Path) -> Result<Table, SeedError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xls" => read_excel(path),
        "csv" => read_csv(path),
        _ => Err(SeedError::UnsupportedFormat(extension)),
    }
}

fn read_error(path: &Path, err: impl std::fmt::Display) -> SeedError {
    SeedError::Read {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn read_csv(path: &Path) -> Result<Table, SeedError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| read_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| read_error(path, e))?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| read_error(path, e))?;
        rows.push(record.iter().map(|s| s.trim().to_string()).collect::<Vec<String>>());
    }

    Ok(Table { headers, rows })
}

fn read_excel(path: &Path) -> Result<Table, SeedError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| read_error(path, e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SeedError::Empty)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| read_error(path, e))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or(SeedError::Empty)?
        .iter()
        .map(get_cell_string)
        .collect();
    let rows = rows
        .map(|row| row.iter().map(get_cell_string).collect::<Vec<String>>())
        .collect();

    Ok(Table { headers, rows })
}

/// Helper to extract string from Excel cell
fn get_cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

/// Load categories (`id`, `type` columns). Returns the number stored.
pub fn load_categories(conn: &Connection, path: &Path) -> Result<usize, SeedError> {
    let table = read_table(path)?;
    let id_col = table.required(&["id"])?;
    let type_col = table.required(&["type", "name", "category"])?;

    let mut count = 0;
    for row in &table.rows {
        let id = cell(row, Some(id_col)).and_then(parse_int);
        let kind = cell(row, Some(type_col));
        match (id, kind) {
            (Some(id), Some(kind)) => {
                db::insert_category(conn, id, kind)?;
                count += 1;
            }
            _ => log::warn!("Skipping incomplete category row in {}: {:?}", path.display(), row),
        }
    }

    log::info!("Seeded {} categories from {}", count, path.display());
    Ok(count)
}

/// Load questions (`question`, `answer`, `difficulty`, `category`, optional `id`).
/// Rows lacking any of the four required values are skipped.
pub fn load_questions(conn: &Connection, path: &Path) -> Result<usize, SeedError> {
    let table = read_table(path)?;
    let id_col = table.column(&["id"]);
    let question_col = Some(table.required(&["question", "questions"])?);
    let answer_col = Some(table.required(&["answer", "answers"])?);
    let difficulty_col = Some(table.required(&["difficulty"])?);
    let category_col = Some(table.required(&["category", "category_id"])?);

    let mut count = 0;
    for row in &table.rows {
        let question = cell(row, question_col);
        let answer = cell(row, answer_col);
        let difficulty = cell(row, difficulty_col).and_then(parse_int);
        let category = cell(row, category_col).and_then(parse_int);

        let (Some(question), Some(answer), Some(difficulty), Some(category)) =
            (question, answer, difficulty, category)
        else {
            log::warn!("Skipping incomplete question row in {}: {:?}", path.display(), row);
            continue;
        };

        let new = NewQuestion {
            question: question.to_string(),
            answer: answer.to_string(),
            difficulty,
            category: Some(category),
        };
        db::insert_question(conn, cell(row, id_col).and_then(parse_int), &new)?;
        count += 1;
    }

    log::info!("Seeded {} questions from {}", count, path.display());
    Ok(count)
}
