use crate::db::{self, Choice, Question};
use crate::error::PollError;
use crate::polls::{self, QuestionDetail, VoteOutcome};
use crate::startup::AppState;
use axum::{
    Form,
    extract::{Extension, Json, Path, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::debug;

const ANONYMOUS_USER: &str = "AnonymousUser";

// Page DTOs
#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub latest_question_list: Vec<QuestionSummary>,
}

#[derive(Debug, Serialize)]
pub struct QuestionSummary {
    pub id: i64,
    pub question_text: String,
    pub pub_date: String,
    pub was_published_recently: bool,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: i64,
    pub question_text: String,
    pub pub_date: String,
}

#[derive(Debug, Serialize)]
pub struct ChoiceResponse {
    pub id: i64,
    pub choice_text: String,
}

#[derive(Debug, Serialize)]
pub struct ChoiceWithVotesResponse {
    pub id: i64,
    pub choice_text: String,
    pub votes: i64,
}

#[derive(Debug, Serialize)]
pub struct DetailPage {
    pub question: QuestionResponse,
    pub choices: Vec<ChoiceResponse>,
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResultsPage {
    pub question: QuestionResponse,
    pub choices: Vec<ChoiceWithVotesResponse>,
}

/// The vote submission. Built from raw form pairs so a repeated `choice`
/// field keeps its last value instead of failing extraction.
#[derive(Debug, Default)]
pub struct VoteForm {
    pub choice: Option<String>,
}

impl VoteForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let choice = pairs
            .into_iter()
            .rev()
            .find_map(|(key, value)| (key == "choice").then_some(value));

        VoteForm { choice }
    }
}

impl From<&Question> for QuestionResponse {
    fn from(question: &Question) -> Self {
        QuestionResponse {
            id: question.id,
            question_text: question.question_text.clone(),
            pub_date: question.pub_date.to_rfc3339(),
        }
    }
}

impl From<&Choice> for ChoiceResponse {
    fn from(choice: &Choice) -> Self {
        ChoiceResponse {
            id: choice.id,
            choice_text: choice.choice_text.clone(),
        }
    }
}

impl From<&Choice> for ChoiceWithVotesResponse {
    fn from(choice: &Choice) -> Self {
        ChoiceWithVotesResponse {
            id: choice.id,
            choice_text: choice.choice_text.clone(),
            votes: choice.votes,
        }
    }
}

impl DetailPage {
    fn new(detail: &QuestionDetail, error_message: Option<&str>) -> Self {
        DetailPage {
            question: QuestionResponse::from(&detail.question),
            choices: detail.choices.iter().map(ChoiceResponse::from).collect(),
            error_message: error_message.map(str::to_string),
        }
    }
}

pub fn results_path(question_id: i64) -> String {
    format!("/polls/{question_id}/results/")
}

async fn current_username(session: &Session) -> String {
    session
        .get::<String>("username")
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| ANONYMOUS_USER.to_string())
}

/// Latest published questions
pub async fn index(Extension(app_state): Extension<AppState>) -> Result<impl IntoResponse, PollError> {
    let now = Utc::now();
    let questions = polls::latest_questions(&app_state.db, now).await?;

    let latest_question_list = questions
        .iter()
        .map(|q| QuestionSummary {
            id: q.id,
            question_text: q.question_text.clone(),
            pub_date: q.pub_date.to_rfc3339(),
            was_published_recently: q.was_published_recently(now),
        })
        .collect();

    Ok((StatusCode::OK, Json(IndexPage { latest_question_list })))
}

/// A published question and the choices to vote on
pub async fn detail(
    Extension(app_state): Extension<AppState>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, PollError> {
    let detail = polls::question_detail(&app_state.db, question_id, Utc::now()).await?;

    Ok((StatusCode::OK, Json(DetailPage::new(&detail, None))))
}

/// Vote tallies for a question
pub async fn results(
    Extension(app_state): Extension<AppState>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, PollError> {
    let detail = polls::question_results(&app_state.db, question_id).await?;

    let page = ResultsPage {
        question: QuestionResponse::from(&detail.question),
        choices: detail.choices.iter().map(ChoiceWithVotesResponse::from).collect(),
    };

    Ok((StatusCode::OK, Json(page)))
}

/// Counts a vote, then redirects to the results so a refresh cannot resubmit it
pub async fn vote(
    Extension(app_state): Extension<AppState>,
    session: Session,
    Path(question_id): Path<i64>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Response, PollError> {
    // An unreadable body counts as a submission without a choice.
    let form = match form {
        Ok(Form(pairs)) => VoteForm::from_pairs(pairs),
        Err(rejection) => {
            debug!("Vote form rejected: {}", rejection);
            VoteForm::default()
        }
    };
    let username = current_username(&session).await;

    let outcome =
        polls::cast_vote(&app_state.db, question_id, form.choice.as_deref(), &username).await?;

    let response = match outcome {
        VoteOutcome::Recorded { question_id, .. } => {
            Redirect::to(&results_path(question_id)).into_response()
        }
        VoteOutcome::Rejected {
            detail,
            error_message,
        } => (StatusCode::OK, Json(DetailPage::new(&detail, Some(error_message)))).into_response(),
    };

    Ok(response)
}

pub async fn health(Extension(app_state): Extension<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&app_state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "database": "connected",
                "pool": db::get_pool_stats(&app_state.db),
            })),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "database": "disconnected"
            })),
        ),
    }
}

pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
