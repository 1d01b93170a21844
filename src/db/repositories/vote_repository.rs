use crate::db::connection::DbPool;
use crate::db::models::Choice;
use sqlx::Error;

/// Adds one vote to a choice of the given question.
///
/// The increment happens inside the store as a single statement, so
/// concurrent votes on the same choice never overwrite each other. Returns
/// the updated choice, or `None` when `choice_id` does not belong to
/// `question_id`.
pub async fn increment_votes(
    pool: &DbPool,
    question_id: i64,
    choice_id: i64,
) -> Result<Option<Choice>, Error> {
    let row = sqlx::query_as::<_, Choice>(
        r#"
        UPDATE polls_choice SET votes = votes + 1
        WHERE id = ? AND question_id = ?
        RETURNING id, question_id, choice_text, votes
        "#,
    )
    .bind(choice_id)
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
