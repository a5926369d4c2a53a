// services.rs
use sqlx::SqlitePool;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::QuestionFixture;
use crate::poll;

/// Loads questions and their choices from a JSON fixture file. The whole
/// file goes in one transaction; returns the number of questions in it.
///
/// Loading is repeatable: records already present are matched by `id`, or
/// by their content when the fixture gives no `id`, instead of being
/// inserted again.
pub async fn load_fixture(pool: &SqlitePool, path: &Path) -> AppResult<usize> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::FixtureError(format!("cannot read {}: {}", path.display(), e))
    })?;
    let count = load_fixture_str(pool, &raw).await?;
    tracing::info!(path = %path.display(), questions = count, "fixture loaded");
    Ok(count)
}

pub async fn load_fixture_str(pool: &SqlitePool, raw: &str) -> AppResult<usize> {
    let fixtures: Vec<QuestionFixture> = serde_json::from_str(raw)?;

    let mut tx = pool.begin().await?;
    for fixture in &fixtures {
        let question = poll::upsert_question(
            &mut tx,
            fixture.id,
            &fixture.question_text,
            fixture.pub_date,
        )
        .await?;
        for choice in &fixture.choices {
            poll::upsert_choice(&mut tx, question.id, choice.id, &choice.choice_text, choice.votes)
                .await?;
        }
    }
    tx.commit().await?;

    Ok(fixtures.len())
}
