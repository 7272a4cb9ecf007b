//! Request bodies and query strings accepted by the HTTP surface

use serde::{de, Deserialize, Deserializer};

/// Web forms tend to submit numbers as strings; accept both
#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

impl IntOrString {
    fn into_int<E: de::Error>(self) -> Result<i64, E> {
        match self {
            IntOrString::Int(i) => Ok(i),
            IntOrString::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected an integer, got {:?}", s))),
        }
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    IntOrString::deserialize(deserializer)?.into_int()
}

fn lenient_opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Option::<IntOrString>::deserialize(deserializer)?
        .map(IntOrString::into_int)
        .transpose()
}

/// `GET /questions?page=N`; kept as raw text so a bad value falls back to page 1
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// `POST /questions`. Every field is optional here so absence maps to `InvalidRequest`.
#[derive(Debug, Default, Deserialize)]
pub struct NewQuestionRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_int")]
    pub difficulty: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_int")]
    pub category: Option<i64>,
}

/// `POST /questions/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default, rename = "searchTerm")]
    pub search_term: Option<String>,
}

/// Category selector sent by the quiz client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizCategory {
    #[serde(deserialize_with = "lenient_int")]
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// `POST /quizzes`
#[derive(Debug, Default, Deserialize)]
pub struct QuizRequest {
    #[serde(default)]
    pub previous_questions: Option<Vec<i64>>,
    #[serde(default)]
    pub quiz_category: Option<QuizCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_question_accepts_numeric_strings() {
        let req: NewQuestionRequest = serde_json::from_value(json!({
            "question": "Q", "answer": "A", "difficulty": "3", "category": 2
        }))
        .unwrap();
        assert_eq!(req.difficulty, Some(3));
        assert_eq!(req.category, Some(2));
    }

    #[test]
    fn test_new_question_missing_and_null_fields() {
        let req: NewQuestionRequest = serde_json::from_value(json!({ "answer": null })).unwrap();
        assert!(req.question.is_none());
        assert!(req.answer.is_none());
        assert!(req.difficulty.is_none());
        assert!(req.category.is_none());
    }

    #[test]
    fn test_non_numeric_category_is_rejected() {
        let res = serde_json::from_value::<NewQuestionRequest>(json!({ "category": "science" }));
        assert!(res.is_err());
    }

    #[test]
    fn test_quiz_request_shapes() {
        let req: QuizRequest = serde_json::from_value(json!({
            "previous_questions": [20, 22],
            "quiz_category": { "id": "1", "type": "Science" }
        }))
        .unwrap();
        assert_eq!(req.previous_questions, Some(vec![20, 22]));
        assert_eq!(
            req.quiz_category,
            Some(QuizCategory { id: 1, kind: Some("Science".into()) })
        );

        let req: QuizRequest =
            serde_json::from_value(json!({ "previous_questions": [], "quiz_category": null })).unwrap();
        assert!(req.quiz_category.is_none());
    }

    #[test]
    fn test_search_term_field_name() {
        let req: SearchRequest = serde_json::from_value(json!({ "searchTerm": "title" })).unwrap();
        assert_eq!(req.search_term.as_deref(), Some("title"));
    }
}
