use serde_json::Value;
use tracing::{Level, event, instrument};

use crate::store::Store;
use crate::types::quiz::{QuizCategory, QuizRequest, QuizResponse, QuizResult, next_question};

#[instrument(skip(store))]
pub async fn play_quiz(store: Store, body: Value) -> Result<impl warp::Reply, warp::Rejection> {
    let request = QuizRequest::from_json(body).map_err(warp::reject::custom)?;

    let candidates = match request.quiz_category {
        QuizCategory::All => store.list_all().await,
        QuizCategory::ByCategory(id) => {
            store
                .get_category(id)
                .await
                .map_err(warp::reject::custom)?;
            store.list_by_category(id).await
        }
    }
    .map_err(warp::reject::custom)?;

    let result = next_question(
        &candidates,
        &request.previous_questions,
        &mut rand::thread_rng(),
    );
    match &result {
        QuizResult::Finished => event!(
            target: "trivia",
            Level::INFO,
            served = request.previous_questions.len(),
            "quiz finished"
        ),
        QuizResult::Question { question, .. } => event!(
            target: "trivia",
            Level::INFO,
            question_id = question.id.0,
            "serving quiz question"
        ),
    }

    Ok(warp::reply::json(&QuizResponse::from(result)))
}
