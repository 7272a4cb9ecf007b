//! HTTP routes: translate requests into store and policy calls, shape the JSON replies

use actix_web::{web, HttpRequest, HttpResponse};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::db::{self, Category, DbPool, NewQuestion, Question};
use crate::error::{TriviaError, TriviaResult};
use crate::pagination::{self, Page};
use crate::quiz;
use crate::request::{NewQuestionRequest, PageQuery, QuizRequest, SearchRequest};
use crate::search;

/// Shared by every worker
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        AppState { pool }
    }
}

#[derive(Debug, Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Debug, Serialize)]
struct QuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<BTreeMap<i64, String>>,
    current_category: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatedResponse {
    success: bool,
    created: i64,
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    success: bool,
    deleted: i64,
}

#[derive(Debug, Serialize)]
struct QuizResponse {
    success: bool,
    question: Option<Question>,
}

/// `{id: type, ...}`
fn categories_map(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

/// Run store work on the blocking pool with a pooled connection
async fn with_conn<F, T>(state: &AppState, f: F) -> TriviaResult<T>
where
    F: FnOnce(&Connection) -> TriviaResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = state.pool.clone();
    web::block(move || {
        let conn = pool.get()?;
        f(&conn)
    })
    .await?
}

/// GET /categories
async fn list_categories(state: web::Data<AppState>) -> TriviaResult<HttpResponse> {
    let categories = with_conn(&state, |conn| Ok(db::list_categories(conn)?)).await?;
    if categories.is_empty() {
        return Err(TriviaError::NotFound);
    }

    Ok(HttpResponse::Ok().json(CategoriesResponse {
        success: true,
        categories: categories_map(categories),
    }))
}

/// GET /questions?page=N
async fn list_questions(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> TriviaResult<HttpResponse> {
    let page = Page::from_param(query.page.as_deref());
    let listing = with_conn(&state, move |conn| pagination::list_questions(conn, page)).await?;

    Ok(HttpResponse::Ok().json(QuestionsResponse {
        success: true,
        questions: listing.questions,
        total_questions: listing.total_questions,
        categories: Some(categories_map(listing.categories)),
        current_category: None,
    }))
}

/// DELETE /questions/{id}
async fn delete_question(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> TriviaResult<HttpResponse> {
    let question_id = path.into_inner();

    with_conn(&state, move |conn| {
        match db::delete_question(conn, question_id) {
            Ok(true) => Ok(()),
            Ok(false) => Err(TriviaError::NotFound),
            Err(e) => Err(TriviaError::processing(e)),
        }
    })
    .await?;

    log::info!("Deleted question {}", question_id);
    Ok(HttpResponse::Ok().json(DeletedResponse {
        success: true,
        deleted: question_id,
    }))
}

/// Every field must be present; text fields must not be blank
fn validate_new_question(req: NewQuestionRequest) -> TriviaResult<NewQuestion> {
    let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

    match (non_blank(req.question), non_blank(req.answer), req.difficulty, req.category) {
        (Some(question), Some(answer), Some(difficulty), Some(category)) => Ok(NewQuestion {
            question,
            answer,
            difficulty,
            category: Some(category),
        }),
        _ => Err(TriviaError::InvalidRequest),
    }
}

/// POST /questions
async fn create_question(
    state: web::Data<AppState>,
    body: web::Json<NewQuestionRequest>,
) -> TriviaResult<HttpResponse> {
    let new = validate_new_question(body.into_inner())?;

    let created = with_conn(&state, move |conn| {
        db::add_question(conn, &new).map_err(TriviaError::processing)
    })
    .await?;

    log::info!("Created question {} in category {:?}", created.id, created.category);
    Ok(HttpResponse::Ok().json(CreatedResponse {
        success: true,
        created: created.id,
    }))
}

/// POST /questions/search
async fn search_questions(
    state: web::Data<AppState>,
    body: web::Json<SearchRequest>,
) -> TriviaResult<HttpResponse> {
    let term = body.into_inner().search_term;
    let questions = with_conn(&state, move |conn| search::search(conn, term.as_deref())).await?;

    Ok(HttpResponse::Ok().json(QuestionsResponse {
        success: true,
        total_questions: questions.len() as i64,
        questions,
        categories: None,
        current_category: None,
    }))
}

/// GET /categories/{id}/questions
async fn questions_by_category(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> TriviaResult<HttpResponse> {
    let category_id = path.into_inner();

    let (questions, category) = with_conn(&state, move |conn| {
        let questions = db::get_questions_by_category(conn, category_id)?;
        if questions.is_empty() {
            return Err(TriviaError::NotFound);
        }
        Ok((questions, db::get_category(conn, category_id)?))
    })
    .await?;

    Ok(HttpResponse::Ok().json(QuestionsResponse {
        success: true,
        total_questions: questions.len() as i64,
        questions,
        categories: None,
        // questions may point at a category that was never seeded
        current_category: category.map(|c| c.kind),
    }))
}

/// POST /quizzes
async fn next_quiz_question(
    state: web::Data<AppState>,
    body: web::Json<QuizRequest>,
) -> TriviaResult<HttpResponse> {
    let QuizRequest {
        previous_questions,
        quiz_category,
    } = body.into_inner();
    let previous = previous_questions.unwrap_or_default();

    let question = with_conn(&state, move |conn| {
        let mut rng = rand::thread_rng();
        quiz::next_question(conn, &mut rng, &previous, quiz_category.as_ref())
    })
    .await?;

    Ok(HttpResponse::Ok().json(QuizResponse {
        success: true,
        question,
    }))
}

async fn not_found(_req: HttpRequest) -> TriviaResult<HttpResponse> {
    Err(TriviaError::NotFound)
}

/// Register every route plus extractor error mapping
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected request body: {}", err);
        TriviaError::InvalidRequest.into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected query string: {}", err);
        TriviaError::InvalidRequest.into()
    }))
    // a non-numeric id cannot name an existing record
    .app_data(web::PathConfig::default().error_handler(|_err, _req| TriviaError::NotFound.into()))
    .route("/categories", web::get().to(list_categories))
    .route("/categories/", web::get().to(list_categories))
    .route("/categories/{id}/questions", web::get().to(questions_by_category))
    .route("/questions", web::get().to(list_questions))
    .route("/questions/", web::get().to(list_questions))
    .route("/questions", web::post().to(create_question))
    .route("/questions/", web::post().to(create_question))
    .route("/questions/search", web::post().to(search_questions))
    .route("/questions/{id}", web::delete().to(delete_question))
    .route("/quizzes", web::post().to(next_quiz_question))
    .default_service(web::to(not_found));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(question: Option<&str>, answer: Option<&str>, difficulty: Option<i64>, category: Option<i64>) -> NewQuestionRequest {
        NewQuestionRequest {
            question: question.map(String::from),
            answer: answer.map(String::from),
            difficulty,
            category,
        }
    }

    #[test]
    fn test_each_missing_field_is_invalid() {
        let cases = [
            request(None, Some("Hi"), Some(5), Some(5)),
            request(Some("Hello"), None, Some(5), Some(5)),
            request(Some("Hello"), Some("Hi"), None, Some(5)),
            request(Some("Hello"), Some("Hi"), Some(5), None),
            request(Some("   "), Some("Hi"), Some(5), Some(5)),
        ];
        for case in cases {
            assert!(matches!(validate_new_question(case), Err(TriviaError::InvalidRequest)));
        }
    }

    #[test]
    fn test_complete_request_validates() {
        let new = validate_new_question(request(Some("Hello"), Some("Hi"), Some(5), Some(5))).unwrap();
        assert_eq!(new.question, "Hello");
        assert_eq!(new.category, Some(5));
    }

    #[test]
    fn test_categories_map_uses_ids_as_keys() {
        let map = categories_map(vec![
            Category { id: 2, kind: "Art".into() },
            Category { id: 1, kind: "Science".into() },
        ]);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({ "1": "Science", "2": "Art" }));
    }
}
