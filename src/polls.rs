//! Poll operations: listing, detail, results and voting.
//!
//! Each operation takes the pool and an explicit `now` where publication
//! time matters, and returns plain data for the HTTP layer to render.

use crate::db::{self, Choice, DbPool, Question};
use crate::error::PollError;
use chrono::{DateTime, Utc};
use tracing::info;

/// Number of questions shown on the index page.
pub const LATEST_QUESTIONS_LIMIT: i64 = 5;

pub const NO_CHOICE_MESSAGE: &str = "You didn't select a choice.";

#[derive(Debug, Clone)]
pub struct QuestionDetail {
    pub question: Question,
    pub choices: Vec<Choice>,
}

#[derive(Debug)]
pub enum VoteOutcome {
    /// The vote was counted; the caller should redirect to the results page.
    Recorded { question_id: i64, choice: Choice },
    /// Nothing was counted; the caller should re-render the detail page.
    Rejected {
        detail: QuestionDetail,
        error_message: &'static str,
    },
}

/// The most recently published questions, newest first. Questions scheduled
/// for the future are left out.
pub async fn latest_questions(pool: &DbPool, now: DateTime<Utc>) -> Result<Vec<Question>, PollError> {
    let questions = db::get_latest_published_questions(pool, now, LATEST_QUESTIONS_LIMIT).await?;
    Ok(questions)
}

/// A published question with its choices.
pub async fn question_detail(
    pool: &DbPool,
    question_id: i64,
    now: DateTime<Utc>,
) -> Result<QuestionDetail, PollError> {
    let question = db::get_published_question(pool, question_id, now)
        .await?
        .ok_or(PollError::QuestionNotFound)?;

    let choices = db::get_choices(pool, question.id).await?;

    Ok(QuestionDetail { question, choices })
}

/// Any question with its choices and tallies, published or not.
pub async fn question_results(pool: &DbPool, question_id: i64) -> Result<QuestionDetail, PollError> {
    let question = db::get_question(pool, question_id)
        .await?
        .ok_or(PollError::QuestionNotFound)?;

    let choices = db::get_choices(pool, question.id).await?;

    Ok(QuestionDetail { question, choices })
}

/// Counts one vote for `choice` on the given question.
///
/// `choice` is the raw form field. A missing, malformed or foreign choice id
/// is not an error: it yields [`VoteOutcome::Rejected`] and no tally changes.
/// Publication time is not checked here.
pub async fn cast_vote(
    pool: &DbPool,
    question_id: i64,
    choice: Option<&str>,
    voter: &str,
) -> Result<VoteOutcome, PollError> {
    let question = db::get_question(pool, question_id)
        .await?
        .ok_or(PollError::QuestionNotFound)?;
    info!("Question: {}", question.question_text);

    let choice_id = choice.and_then(|raw| raw.trim().parse::<i64>().ok());

    let updated = match choice_id {
        Some(choice_id) => db::increment_votes(pool, question.id, choice_id).await?,
        None => None,
    };

    match updated {
        Some(choice) => {
            info!("User {} choice: {}", voter, choice.choice_text);
            Ok(VoteOutcome::Recorded {
                question_id: question.id,
                choice,
            })
        }
        None => {
            info!("User {} didn't make a choice", voter);
            let choices = db::get_choices(pool, question.id).await?;
            Ok(VoteOutcome::Rejected {
                detail: QuestionDetail { question, choices },
                error_message: NO_CHOICE_MESSAGE,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use chrono::Duration;

    async fn seed_question(pool: &DbPool, text: &str, offset: Duration) -> i64 {
        db::create_question(pool, text, Utc::now() + offset).await.unwrap()
    }

    async fn vote_counts(pool: &DbPool, question_id: i64) -> Vec<(i64, i64)> {
        db::get_choices(pool, question_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.id, c.votes))
            .collect()
    }

    #[tokio::test]
    async fn listing_is_empty_without_questions() {
        let pool = memory_pool().await;
        let questions = latest_questions(&pool, Utc::now()).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn listing_skips_future_questions() {
        let pool = memory_pool().await;
        seed_question(&pool, "Past question", Duration::days(-30)).await;
        seed_question(&pool, "Future question", Duration::days(30)).await;

        let questions = latest_questions(&pool, Utc::now()).await.unwrap();
        let texts: Vec<_> = questions.iter().map(|q| q.question_text.as_str()).collect();
        assert_eq!(texts, vec!["Past question"]);
    }

    #[tokio::test]
    async fn listing_returns_five_newest_first() {
        let pool = memory_pool().await;
        for day in 1..=7 {
            seed_question(&pool, &format!("Question {day}"), Duration::days(-day)).await;
        }

        let questions = latest_questions(&pool, Utc::now()).await.unwrap();
        let texts: Vec<_> = questions.iter().map(|q| q.question_text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Question 1", "Question 2", "Question 3", "Question 4", "Question 5"]
        );
        assert!(questions.windows(2).all(|w| w[0].pub_date >= w[1].pub_date));
    }

    #[tokio::test]
    async fn detail_hides_unpublished_but_results_shows_it() {
        let pool = memory_pool().await;
        let id = seed_question(&pool, "Future question", Duration::days(5)).await;

        let detail = question_detail(&pool, id, Utc::now()).await;
        assert!(matches!(detail, Err(PollError::QuestionNotFound)));

        let results = question_results(&pool, id).await.unwrap();
        assert_eq!(results.question.question_text, "Future question");
    }

    #[tokio::test]
    async fn detail_and_results_of_missing_question_are_not_found() {
        let pool = memory_pool().await;
        assert!(matches!(
            question_detail(&pool, 42, Utc::now()).await,
            Err(PollError::QuestionNotFound)
        ));
        assert!(matches!(
            question_results(&pool, 42).await,
            Err(PollError::QuestionNotFound)
        ));
    }

    #[tokio::test]
    async fn vote_without_choice_is_rejected() {
        let pool = memory_pool().await;
        let id = seed_question(&pool, "Pick one", Duration::days(-1)).await;
        db::add_choice(&pool, id, "Yes").await.unwrap();
        db::add_choice(&pool, id, "No").await.unwrap();
        let before = vote_counts(&pool, id).await;

        let outcome = cast_vote(&pool, id, None, "AnonymousUser").await.unwrap();
        match outcome {
            VoteOutcome::Rejected {
                detail,
                error_message,
            } => {
                assert_eq!(error_message, NO_CHOICE_MESSAGE);
                assert_eq!(detail.question.id, id);
                assert_eq!(detail.choices.len(), 2);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(vote_counts(&pool, id).await, before);
    }

    #[tokio::test]
    async fn vote_with_malformed_choice_is_rejected() {
        let pool = memory_pool().await;
        let id = seed_question(&pool, "Pick one", Duration::days(-1)).await;
        db::add_choice(&pool, id, "Yes").await.unwrap();
        let before = vote_counts(&pool, id).await;

        let outcome = cast_vote(&pool, id, Some("yes please"), "alice").await.unwrap();
        assert!(matches!(outcome, VoteOutcome::Rejected { .. }));
        assert_eq!(vote_counts(&pool, id).await, before);
    }

    #[tokio::test]
    async fn vote_for_another_questions_choice_is_rejected() {
        let pool = memory_pool().await;
        let first = seed_question(&pool, "First", Duration::days(-1)).await;
        let second = seed_question(&pool, "Second", Duration::days(-1)).await;
        db::add_choice(&pool, first, "Mine").await.unwrap();
        let foreign = db::add_choice(&pool, second, "Theirs").await.unwrap();
        let before_first = vote_counts(&pool, first).await;
        let before_second = vote_counts(&pool, second).await;

        let outcome = cast_vote(&pool, first, Some(&foreign.to_string()), "alice")
            .await
            .unwrap();
        assert!(matches!(outcome, VoteOutcome::Rejected { .. }));
        assert_eq!(vote_counts(&pool, first).await, before_first);
        assert_eq!(vote_counts(&pool, second).await, before_second);
    }

    #[tokio::test]
    async fn vote_on_missing_question_is_not_found() {
        let pool = memory_pool().await;
        let outcome = cast_vote(&pool, 7, Some("1"), "alice").await;
        assert!(matches!(outcome, Err(PollError::QuestionNotFound)));
    }

    #[tokio::test]
    async fn valid_vote_increments_only_that_choice() {
        let pool = memory_pool().await;
        let id = seed_question(&pool, "Is it Friday?", Duration::days(-1)).await;
        let yes = db::add_choice(&pool, id, "Yes").await.unwrap();
        let no = db::add_choice(&pool, id, "No").await.unwrap();
        for _ in 0..3 {
            db::increment_votes(&pool, id, yes).await.unwrap();
        }
        for _ in 0..2 {
            db::increment_votes(&pool, id, no).await.unwrap();
        }

        let outcome = cast_vote(&pool, id, Some(&yes.to_string()), "alice")
            .await
            .unwrap();
        match outcome {
            VoteOutcome::Recorded {
                question_id,
                choice,
            } => {
                assert_eq!(question_id, id);
                assert_eq!(choice.id, yes);
                assert_eq!(choice.votes, 4);
            }
            other => panic!("expected a recorded vote, got {other:?}"),
        }
        assert_eq!(vote_counts(&pool, id).await, vec![(yes, 4), (no, 2)]);
    }

    #[tokio::test]
    async fn vote_on_unpublished_question_is_counted() {
        let pool = memory_pool().await;
        let id = seed_question(&pool, "Not yet", Duration::days(3)).await;
        let choice = db::add_choice(&pool, id, "Early").await.unwrap();

        let outcome = cast_vote(&pool, id, Some(&choice.to_string()), "alice")
            .await
            .unwrap();
        assert!(matches!(outcome, VoteOutcome::Recorded { .. }));
    }

    #[tokio::test]
    async fn concurrent_votes_are_not_lost() {
        let pool = memory_pool().await;
        let id = seed_question(&pool, "Busy poll", Duration::days(-1)).await;
        let choice = db::add_choice(&pool, id, "Popular").await.unwrap();
        let raw = choice.to_string();

        let votes = (0..25).map(|_| cast_vote(&pool, id, Some(&raw), "crowd"));
        let outcomes = futures::future::join_all(votes).await;
        assert!(
            outcomes
                .iter()
                .all(|o| matches!(o, Ok(VoteOutcome::Recorded { .. })))
        );

        let stored = db::get_choice(&pool, choice).await.unwrap().unwrap();
        assert_eq!(stored.votes, 25);
    }

    #[tokio::test]
    async fn deleting_question_removes_its_choices() {
        let pool = memory_pool().await;
        let id = seed_question(&pool, "Short lived", Duration::days(-1)).await;
        let choice = db::add_choice(&pool, id, "Gone soon").await.unwrap();

        assert!(db::delete_question(&pool, id).await.unwrap());
        assert!(db::get_choice(&pool, choice).await.unwrap().is_none());
    }
}
