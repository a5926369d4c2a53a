// src/poll.rs
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::models::{Choice, Question};

/// Number of questions shown on the index page.
pub const LATEST_QUESTIONS_LIMIT: i64 = 5;

/// Most recent published questions, newest first. Questions dated after
/// `now` are left out.
pub async fn latest_questions(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    // pub_date is stored as RFC 3339 text in UTC, so text order is time order
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question_text, pub_date
        FROM questions
        WHERE pub_date <= ?
        ORDER BY pub_date DESC
        LIMIT ?
        "#,
    )
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn find_question(pool: &SqlitePool, id: i64) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>("SELECT id, question_text, pub_date FROM questions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Looks a question up for display or voting. A question that does not
/// exist and one that is not published yet both come back as `NotFound`.
pub async fn get_visible_question(
    pool: &SqlitePool,
    id: i64,
    now: DateTime<Utc>,
) -> AppResult<Question> {
    match find_question(pool, id).await? {
        Some(question) if question.is_visible(now) => Ok(question),
        _ => Err(AppError::NotFound("Question not found".to_string())),
    }
}

pub async fn choices_for(pool: &SqlitePool, question_id: i64) -> Result<Vec<Choice>, sqlx::Error> {
    sqlx::query_as::<_, Choice>(
        r#"
        SELECT id, question_id, choice_text, votes
        FROM choices
        WHERE question_id = ?
        ORDER BY id
        "#,
    )
    .bind(question_id)
    .fetch_all(pool)
    .await
}

pub async fn find_choice(pool: &SqlitePool, id: i64) -> Result<Option<Choice>, sqlx::Error> {
    sqlx::query_as::<_, Choice>(
        "SELECT id, question_id, choice_text, votes FROM choices WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Adds one vote to `choice_id`, provided it belongs to `question_id`.
///
/// Resolution and increment happen in a single statement, so concurrent
/// votes never lose an update. Returns `false` when the choice is not one of
/// the question's choices.
pub async fn record_vote(
    pool: &SqlitePool,
    question_id: i64,
    choice_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE choices
        SET votes = votes + 1
        WHERE id = ? AND question_id = ?
        "#,
    )
    .bind(choice_id)
    .bind(question_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn create_question<'e, E>(
    executor: E,
    question_text: &str,
    pub_date: DateTime<Utc>,
) -> Result<Question, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO questions (question_text, pub_date)
        VALUES (?, ?)
        RETURNING id, question_text, pub_date
        "#,
    )
    .bind(question_text)
    .bind(pub_date)
    .fetch_one(executor)
    .await
}

pub async fn create_choice<'e, E>(
    executor: E,
    question_id: i64,
    choice_text: &str,
    votes: u32,
) -> Result<Choice, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Choice>(
        r#"
        INSERT INTO choices (question_id, choice_text, votes)
        VALUES (?, ?, ?)
        RETURNING id, question_id, choice_text, votes
        "#,
    )
    .bind(question_id)
    .bind(choice_text)
    .bind(votes)
    .fetch_one(executor)
    .await
}

/// Seeds a question. With an `id` the row is inserted or overwritten in
/// place; without one an identical question (same text and publication
/// date) is reused before a new row is created.
pub async fn upsert_question(
    conn: &mut SqliteConnection,
    id: Option<i64>,
    question_text: &str,
    pub_date: DateTime<Utc>,
) -> Result<Question, sqlx::Error> {
    let Some(id) = id else {
        let existing = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, question_text, pub_date
            FROM questions
            WHERE question_text = ? AND pub_date = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(question_text)
        .bind(pub_date)
        .fetch_optional(&mut *conn)
        .await?;

        return match existing {
            Some(question) => Ok(question),
            None => create_question(&mut *conn, question_text, pub_date).await,
        };
    };

    sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO questions (id, question_text, pub_date)
        VALUES (?, ?, ?)
        ON CONFLICT (id) DO UPDATE
        SET question_text = excluded.question_text,
            pub_date = excluded.pub_date
        RETURNING id, question_text, pub_date
        "#,
    )
    .bind(id)
    .bind(question_text)
    .bind(pub_date)
    .fetch_one(&mut *conn)
    .await
}

/// Seeds a choice the same way as `upsert_question`. `votes` only applies
/// to a new row; an existing choice keeps the votes it has collected.
pub async fn upsert_choice(
    conn: &mut SqliteConnection,
    question_id: i64,
    id: Option<i64>,
    choice_text: &str,
    votes: u32,
) -> Result<Choice, sqlx::Error> {
    let Some(id) = id else {
        let existing = sqlx::query_as::<_, Choice>(
            r#"
            SELECT id, question_id, choice_text, votes
            FROM choices
            WHERE question_id = ? AND choice_text = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(question_id)
        .bind(choice_text)
        .fetch_optional(&mut *conn)
        .await?;

        return match existing {
            Some(choice) => Ok(choice),
            None => create_choice(&mut *conn, question_id, choice_text, votes).await,
        };
    };

    sqlx::query_as::<_, Choice>(
        r#"
        INSERT INTO choices (id, question_id, choice_text, votes)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE
        SET question_id = excluded.question_id,
            choice_text = excluded.choice_text
        RETURNING id, question_id, choice_text, votes
        "#,
    )
    .bind(id)
    .bind(question_id)
    .bind(choice_text)
    .bind(votes)
    .fetch_one(&mut *conn)
    .await
}

/// Deletes a question together with its choices. Returns `false` if there
/// was nothing to delete.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Duration;

    async fn pool() -> SqlitePool {
        let pool = db::memory_pool().await.unwrap();
        db::migrate(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn latest_questions_skips_future_and_orders_newest_first() {
        let pool = pool().await;
        let now = Utc::now();
        let old = create_question(&pool, "Old", now - Duration::days(30)).await.unwrap();
        let recent = create_question(&pool, "Recent", now - Duration::days(5)).await.unwrap();
        create_question(&pool, "Future", now + Duration::days(30)).await.unwrap();

        let latest = latest_questions(&pool, now, LATEST_QUESTIONS_LIMIT).await.unwrap();
        assert_eq!(latest, vec![recent, old]);
    }

    #[tokio::test]
    async fn latest_questions_is_limited() {
        let pool = pool().await;
        let now = Utc::now();
        for days in 1..=7 {
            create_question(&pool, &format!("Q{}", days), now - Duration::days(days))
                .await
                .unwrap();
        }

        let latest = latest_questions(&pool, now, LATEST_QUESTIONS_LIMIT).await.unwrap();
        let texts: Vec<_> = latest.iter().map(|q| q.question_text.as_str()).collect();
        assert_eq!(texts, ["Q1", "Q2", "Q3", "Q4", "Q5"]);
    }

    #[tokio::test]
    async fn visible_question_lookup() {
        let pool = pool().await;
        let now = Utc::now();
        let past = create_question(&pool, "Past", now - Duration::days(5)).await.unwrap();
        let future = create_question(&pool, "Future", now + Duration::days(5)).await.unwrap();

        assert_eq!(get_visible_question(&pool, past.id, now).await.unwrap(), past);
        assert!(matches!(
            get_visible_question(&pool, future.id, now).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            get_visible_question(&pool, 999, now).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn record_vote_only_touches_choice_of_question() {
        let pool = pool().await;
        let now = Utc::now();
        let question = create_question(&pool, "Q", now).await.unwrap();
        let other = create_question(&pool, "Other", now).await.unwrap();
        let a = create_choice(&pool, question.id, "A", 0).await.unwrap();
        let b = create_choice(&pool, question.id, "B", 4).await.unwrap();
        let foreign = create_choice(&pool, other.id, "Foreign", 0).await.unwrap();

        assert!(record_vote(&pool, question.id, a.id).await.unwrap());
        assert!(!record_vote(&pool, question.id, foreign.id).await.unwrap());
        assert!(!record_vote(&pool, question.id, 999).await.unwrap());

        let votes: Vec<_> = choices_for(&pool, question.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.id, c.votes))
            .collect();
        assert_eq!(votes, vec![(a.id, 1), (b.id, 4)]);
        assert_eq!(find_choice(&pool, foreign.id).await.unwrap().unwrap().votes, 0);
    }

    #[tokio::test]
    async fn deleting_question_cascades_to_choices() {
        let pool = pool().await;
        let question = create_question(&pool, "Q", Utc::now()).await.unwrap();
        let choice = create_choice(&pool, question.id, "A", 0).await.unwrap();

        assert!(delete_question(&pool, question.id).await.unwrap());
        assert!(find_choice(&pool, choice.id).await.unwrap().is_none());
        assert!(!delete_question(&pool, question.id).await.unwrap());
    }

    #[tokio::test]
    async fn choice_requires_existing_question() {
        let pool = pool().await;
        assert!(create_choice(&pool, 42, "Orphan", 0).await.is_err());
    }
}
