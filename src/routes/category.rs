use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{Level, event, instrument};

use crate::store::Store;
use crate::types::question::{Category, CategoryId, Question};

/// Category labels keyed by id, the shape the listing endpoints expose.
pub fn category_map(categories: Vec<Category>) -> BTreeMap<i32, String> {
    categories
        .into_iter()
        .map(|category| (category.id.0, category.kind))
        .collect()
}

#[derive(Debug, Serialize)]
struct CategoryList {
    success: bool,
    categories: BTreeMap<i32, String>,
}

#[derive(Debug, Serialize)]
struct CategoryQuestions {
    success: bool,
    category: Vec<Category>,
    current_category: String,
    questions: Vec<Question>,
    total_questions: usize,
}

#[instrument(skip(store))]
pub async fn get_categories(store: Store) -> Result<impl warp::Reply, warp::Rejection> {
    event!(target: "trivia", Level::INFO, "querying categories");
    let categories = store
        .list_categories()
        .await
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&CategoryList {
        success: true,
        categories: category_map(categories),
    }))
}

#[instrument(skip(store))]
pub async fn get_category_questions(
    id: i32,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let category = store
        .get_category(CategoryId(id))
        .await
        .map_err(warp::reject::custom)?;
    let questions = store
        .list_by_category(category.id)
        .await
        .map_err(warp::reject::custom)?;
    event!(
        target: "trivia",
        Level::INFO,
        category = id,
        count = questions.len(),
        "listing category questions"
    );

    Ok(warp::reply::json(&CategoryQuestions {
        success: true,
        current_category: category.kind.clone(),
        total_questions: questions.len(),
        category: vec![category],
        questions,
    }))
}
