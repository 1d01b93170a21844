use crate::db::connection::DbPool;
use crate::db::models::Choice;
use sqlx::Error;

pub async fn add_choice(pool: &DbPool, question_id: i64, choice_text: &str) -> Result<i64, Error> {
    let result = sqlx::query("INSERT INTO polls_choice (question_id, choice_text) VALUES (?, ?)")
        .bind(question_id)
        .bind(choice_text)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_choices(pool: &DbPool, question_id: i64) -> Result<Vec<Choice>, Error> {
    let rows = sqlx::query_as::<_, Choice>(
        "SELECT id, question_id, choice_text, votes FROM polls_choice WHERE question_id = ? ORDER BY id",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_choice(pool: &DbPool, choice_id: i64) -> Result<Option<Choice>, Error> {
    let row = sqlx::query_as::<_, Choice>(
        "SELECT id, question_id, choice_text, votes FROM polls_choice WHERE id = ?",
    )
    .bind(choice_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
