use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{Level, event, instrument};

use handle_errors::Error;

use crate::routes::category::category_map;
use crate::store::{QuestionFilter, Store};
use crate::types::pagination::{Page, extract_page};
use crate::types::question::{NewQuestion, Question, QuestionId};

#[derive(Debug, Serialize)]
struct QuestionList {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<BTreeMap<i32, String>>,
}

#[derive(Debug, Serialize)]
struct Deleted {
    success: bool,
    deleted: i32,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Debug, Serialize)]
struct Created {
    success: bool,
    created: i32,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "searchTerm", default)]
    pub search_term: Option<String>,
}

async fn page_of(
    store: &Store,
    filter: &QuestionFilter,
    page: usize,
    page_size: usize,
) -> Result<Page<Question>, Error> {
    let questions = store.list_questions(filter).await?;
    let total = store.count_questions(filter).await?;
    Ok(Page::new(&questions, page, page_size, total))
}

#[instrument(skip(store))]
pub async fn get_questions(
    params: HashMap<String, String>,
    page_size: usize,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    event!(target: "trivia", Level::INFO, "querying questions");
    let page = extract_page(&params);
    let res = page_of(&store, &QuestionFilter::All, page, page_size)
        .await
        .map_err(warp::reject::custom)?;
    if res.items.is_empty() {
        return Err(warp::reject::custom(Error::NotFound(format!(
            "page {} of questions",
            page
        ))));
    }
    let categories = store
        .list_categories()
        .await
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&QuestionList {
        success: true,
        questions: res.items,
        total_questions: res.total,
        categories: Some(category_map(categories)),
    }))
}

#[instrument(skip(store))]
pub async fn add_question(
    store: Store,
    new_question: NewQuestion,
) -> Result<impl warp::Reply, warp::Rejection> {
    let new_question = new_question.validate().map_err(warp::reject::custom)?;
    match store.get_category(new_question.category_id()).await {
        Ok(_) => {}
        Err(Error::NotFound(what)) => {
            return Err(warp::reject::custom(Error::InvalidRequest(format!(
                "unknown {}",
                what
            ))));
        }
        Err(e) => return Err(warp::reject::custom(e)),
    }

    let question = store
        .add_question(new_question)
        .await
        .map_err(warp::reject::custom)?;
    event!(target: "trivia", Level::INFO, question_id = question.id.0, "question created");

    Ok(warp::reply::json(&Created {
        success: true,
        created: question.id.0,
    }))
}

#[instrument(skip(store))]
pub async fn delete_question(
    id: i32,
    params: HashMap<String, String>,
    page_size: usize,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let question = store
        .get_question(QuestionId(id))
        .await
        .map_err(warp::reject::custom)?;
    store
        .delete_question(question.id)
        .await
        .map_err(warp::reject::custom)?;
    event!(
        target: "trivia",
        Level::INFO,
        question_id = id,
        category = question.category.0,
        "question deleted"
    );

    let res = page_of(&store, &QuestionFilter::All, extract_page(&params), page_size)
        .await
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&Deleted {
        success: true,
        deleted: id,
        questions: res.items,
        total_questions: res.total,
    }))
}

#[instrument(skip(store))]
pub async fn search_questions(
    params: HashMap<String, String>,
    page_size: usize,
    store: Store,
    search: SearchRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    let term = search.search_term.unwrap_or_default();
    if term.trim().is_empty() {
        return Err(warp::reject::custom(Error::InvalidRequest(
            "search term is empty".to_string(),
        )));
    }

    let found = store
        .find_by_substring(&term)
        .await
        .map_err(warp::reject::custom)?;
    let total = store
        .count_questions(&QuestionFilter::Search(term.clone()))
        .await
        .map_err(warp::reject::custom)?;
    let res = Page::new(&found, extract_page(&params), page_size, total);
    event!(target: "trivia", Level::INFO, term = %term, total, "searched questions");

    Ok(warp::reply::json(&QuestionList {
        success: true,
        questions: res.items,
        total_questions: res.total,
        categories: None,
    }))
}
