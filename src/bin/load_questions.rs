use polls::config::Config;
use polls::db::{self, NewQuestion};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "fixtures/questions.json".to_string());

    let config = Config::load()?;
    let pool = db::init_db(&config.database_url, config.db_max_connections).await?;

    println!("Connected to database!");

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {path}: {e}"))?;
    let questions: Vec<NewQuestion> = serde_json::from_str(&contents)?;

    let mut count = 0;
    let mut skipped = 0;

    for question in questions {
        let text = question.question_text.trim();
        if text.is_empty() {
            continue;
        }

        if db::question_text_exists(&pool, text).await? {
            println!("Skipped (duplicate): {}", text);
            skipped += 1;
            continue;
        }

        let question_id = db::create_question(&pool, text, question.pub_date).await?;
        let choices = question.non_blank_choices();
        for choice in &choices {
            db::add_choice(&pool, question_id, choice).await?;
        }

        count += 1;
        println!("Loaded: {} ({} choices)", text, choices.len());
    }

    println!("\nLoaded {} new questions", count);
    if skipped > 0 {
        println!("Skipped {} duplicate questions", skipped);
    }

    Ok(())
}
