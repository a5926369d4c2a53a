// handlers.rs
use axum::extract::rejection::{FormRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use chrono::Utc;
use http::{header, StatusCode};

use crate::error::{AppError, AppResult};
use crate::models::VoteForm;
use crate::poll::{self, LATEST_QUESTIONS_LIMIT};
use crate::state::AppState;
use crate::templates::{self, DetailContext, IndexContext, ResultsContext, NO_CHOICE_SELECTED};

/// Latest published questions
pub async fn index(State(state): State<AppState>) -> AppResult<Response> {
    let latest_question_list =
        poll::latest_questions(&state.pool, Utc::now(), LATEST_QUESTIONS_LIMIT).await?;

    Ok(templates::render(
        IndexContext { latest_question_list },
        &state.urls,
    ))
}

/// Voting form for one question
pub async fn detail(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let question_id = question_id(path)?;
    let question = poll::get_visible_question(&state.pool, question_id, Utc::now()).await?;
    let choices = poll::choices_for(&state.pool, question.id).await?;

    Ok(templates::render(
        DetailContext {
            question,
            choices,
            error_message: None,
        },
        &state.urls,
    ))
}

/// Vote counts for one question
pub async fn results(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let question_id = question_id(path)?;
    let question = poll::get_visible_question(&state.pool, question_id, Utc::now()).await?;
    let choices = poll::choices_for(&state.pool, question.id).await?;

    Ok(templates::render(
        ResultsContext { question, choices },
        &state.urls,
    ))
}

/// Record a vote, then redirect to the results. A missing or foreign choice
/// redisplays the voting form with an error instead.
pub async fn vote(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> AppResult<Response> {
    let question_id = question_id(path)?;
    let question = poll::get_visible_question(&state.pool, question_id, Utc::now()).await?;

    // An unreadable body counts as no selection
    let form = form
        .map(|Form(pairs)| VoteForm::from_pairs(pairs))
        .unwrap_or_default();

    let recorded = match form.choice_id() {
        Some(choice_id) => poll::record_vote(&state.pool, question.id, choice_id).await?,
        None => false,
    };

    if !recorded {
        tracing::debug!(question_id, choice = ?form.choice, "vote without a valid choice");
        let choices = poll::choices_for(&state.pool, question.id).await?;
        return Ok(templates::render(
            DetailContext {
                question,
                choices,
                error_message: Some(NO_CHOICE_SELECTED.to_string()),
            },
            &state.urls,
        ));
    }

    tracing::info!(question_id, choice = ?form.choice, "vote recorded");
    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, state.urls.results(question.id))],
    )
        .into_response())
}

fn question_id(path: Result<Path<i64>, PathRejection>) -> AppResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::NotFound(format!("bad question id: {}", rejection)))
}
