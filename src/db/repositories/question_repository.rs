use crate::db::connection::DbPool;
use crate::db::models::Question;
use chrono::{DateTime, Utc};
use sqlx::Error;

pub async fn create_question(
    pool: &DbPool,
    question_text: &str,
    pub_date: DateTime<Utc>,
) -> Result<i64, Error> {
    let result = sqlx::query("INSERT INTO polls_question (question_text, pub_date) VALUES (?, ?)")
        .bind(question_text)
        .bind(pub_date)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_question(pool: &DbPool, question_id: i64) -> Result<Option<Question>, Error> {
    let row = sqlx::query_as::<_, Question>(
        "SELECT id, question_text, pub_date FROM polls_question WHERE id = ?",
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Like [`get_question`], but hides questions whose `pub_date` is after `now`.
pub async fn get_published_question(
    pool: &DbPool,
    question_id: i64,
    now: DateTime<Utc>,
) -> Result<Option<Question>, Error> {
    let row = sqlx::query_as::<_, Question>(
        "SELECT id, question_text, pub_date FROM polls_question WHERE id = ? AND pub_date <= ?",
    )
    .bind(question_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn get_latest_published_questions(
    pool: &DbPool,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Question>, Error> {
    let rows = sqlx::query_as::<_, Question>(
        "SELECT id, question_text, pub_date FROM polls_question WHERE pub_date <= ? ORDER BY pub_date DESC LIMIT ?",
    )
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn question_text_exists(pool: &DbPool, question_text: &str) -> Result<bool, Error> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM polls_question WHERE question_text = ?)")
            .bind(question_text)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Deletes a question. Its choices go with it through the foreign key cascade.
pub async fn delete_question(pool: &DbPool, question_id: i64) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM polls_question WHERE id = ?")
        .bind(question_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
