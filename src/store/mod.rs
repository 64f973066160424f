use std::sync::Arc;

use async_trait::async_trait;

use handle_errors::Error;

use crate::types::question::{Category, CategoryId, NewQuestion, Question, QuestionId};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle the routes hold on to.
pub type Store = Arc<dyn QuestionStore>;

/// Selects a subset of the question bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionFilter {
    All,
    Category(CategoryId),
    /// Case-insensitive substring of the question text.
    Search(String),
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        match self {
            QuestionFilter::All => true,
            QuestionFilter::Category(id) => question.category == *id,
            QuestionFilter::Search(term) => question
                .question
                .to_lowercase()
                .contains(&term.to_lowercase()),
        }
    }
}

/// Durable collection of questions and their categories.
///
/// Listings are ordered by ascending id. Lookups of a single missing record
/// fail with `Error::NotFound`; backend failures surface unchanged.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, Error>;

    async fn get_category(&self, id: CategoryId) -> Result<Category, Error>;

    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>, Error>;

    async fn count_questions(&self, filter: &QuestionFilter) -> Result<usize, Error>;

    async fn get_question(&self, id: QuestionId) -> Result<Question, Error>;

    async fn add_question(&self, new_question: NewQuestion) -> Result<Question, Error>;

    async fn delete_question(&self, id: QuestionId) -> Result<(), Error>;

    async fn list_all(&self) -> Result<Vec<Question>, Error> {
        self.list_questions(&QuestionFilter::All).await
    }

    async fn list_by_category(&self, id: CategoryId) -> Result<Vec<Question>, Error> {
        self.list_questions(&QuestionFilter::Category(id)).await
    }

    /// A blank term matches nothing. Any other term is matched as given,
    /// surrounding whitespace included.
    async fn find_by_substring(&self, term: &str) -> Result<Vec<Question>, Error> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.list_questions(&QuestionFilter::Search(term.to_string()))
            .await
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;

    fn question(id: i32, text: &str, category: i32) -> Question {
        Question {
            id: QuestionId(id),
            question: text.to_string(),
            answer: "answer".to_string(),
            category: CategoryId(category),
            difficulty: 1,
        }
    }

    #[test]
    fn filters_match_questions() {
        let q = question(1, "What boxer's original name is Cassius Clay?", 4);
        assert!(QuestionFilter::All.matches(&q));
        assert!(QuestionFilter::Category(CategoryId(4)).matches(&q));
        assert!(!QuestionFilter::Category(CategoryId(3)).matches(&q));
        assert!(QuestionFilter::Search("cassius".to_string()).matches(&q));
        assert!(QuestionFilter::Search("BOXER".to_string()).matches(&q));
        assert!(!QuestionFilter::Search("tom hanks".to_string()).matches(&q));
    }
}
