use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{Level, event};

use handle_errors::Error;

use super::{QuestionFilter, QuestionStore};
use crate::types::question::{Category, CategoryId, NewQuestion, Question, QuestionId};

const DEFAULT_CATEGORIES: [&str; 6] = [
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

/// Question bank kept in process memory. Ids are handed out from 1 upwards.
#[derive(Debug, Default)]
pub struct MemoryStore {
    categories: RwLock<BTreeMap<CategoryId, Category>>,
    questions: RwLock<BTreeMap<QuestionId, Question>>,
    last_question_id: AtomicI32,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Seeds the same six categories the database migration creates.
    pub fn with_default_categories() -> Self {
        let store = MemoryStore::new();
        for kind in DEFAULT_CATEGORIES {
            store.add_category(kind);
        }
        store
    }

    pub fn add_category(&self, kind: &str) -> Category {
        let mut categories = self.categories.write();
        let id = categories
            .keys()
            .next_back()
            .map_or(CategoryId(1), |last| CategoryId(last.0 + 1));
        let category = Category {
            id,
            kind: kind.to_string(),
        };
        categories.insert(id, category.clone());
        category
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        Ok(self.categories.read().values().cloned().collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Category, Error> {
        self.categories
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("category {}", id.0)))
    }

    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>, Error> {
        Ok(self
            .questions
            .read()
            .values()
            .filter(|question| filter.matches(question))
            .cloned()
            .collect())
    }

    async fn count_questions(&self, filter: &QuestionFilter) -> Result<usize, Error> {
        Ok(self
            .questions
            .read()
            .values()
            .filter(|question| filter.matches(question))
            .count())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Question, Error> {
        self.questions
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("question {}", id.0)))
    }

    async fn add_question(&self, new_question: NewQuestion) -> Result<Question, Error> {
        let category = new_question.category_id();
        if !self.categories.read().contains_key(&category) {
            return Err(Error::NotFound(format!("category {}", category.0)));
        }

        let id = QuestionId(self.last_question_id.fetch_add(1, Ordering::SeqCst) + 1);
        let question = Question {
            id,
            question: new_question.question,
            answer: new_question.answer,
            category,
            difficulty: new_question.difficulty,
        };
        self.questions.write().insert(id, question.clone());
        event!(target: "trivia", Level::DEBUG, question_id = id.0, "question stored in memory");
        Ok(question)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), Error> {
        match self.questions.write().remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(format!("question {}", id.0))),
        }
    }
}

#[cfg(test)]
mod memory_store_tests {
    use super::*;

    fn new_question(text: &str, category: i32) -> NewQuestion {
        NewQuestion {
            question: text.to_string(),
            answer: "answer".to_string(),
            category,
            difficulty: 2,
        }
    }

    #[tokio::test]
    async fn seeds_default_categories_in_order() {
        let store = MemoryStore::with_default_categories();
        let categories = store.list_categories().await.unwrap();
        let labels: Vec<&str> = categories.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(labels, DEFAULT_CATEGORIES);
        assert_eq!(categories[0].id, CategoryId(1));
        assert_eq!(store.get_category(CategoryId(6)).await.unwrap().kind, "Sports");
        assert!(matches!(
            store.get_category(CategoryId(7)).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn lists_filters_and_counts() {
        let store = MemoryStore::with_default_categories();
        store.add_question(new_question("What is the capital of Peru?", 3)).await.unwrap();
        store.add_question(new_question("Who painted the Mona Lisa?", 2)).await.unwrap();
        store.add_question(new_question("Which river flows through Lima?", 3)).await.unwrap();

        let all = store.list_all().await.unwrap();
        let ids: Vec<QuestionId> = all.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![QuestionId(1), QuestionId(2), QuestionId(3)]);

        let geography = store.list_by_category(CategoryId(3)).await.unwrap();
        assert_eq!(geography.len(), 2);
        assert_eq!(
            store
                .count_questions(&QuestionFilter::Category(CategoryId(3)))
                .await
                .unwrap(),
            2
        );

        let found = store.find_by_substring("mona").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, QuestionId(2));
    }

    #[tokio::test]
    async fn empty_search_term_finds_nothing() {
        let store = MemoryStore::with_default_categories();
        store.add_question(new_question("What is the capital of Peru?", 3)).await.unwrap();
        assert!(store.find_by_substring("").await.unwrap().is_empty());
        assert!(store.find_by_substring("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_term_keeps_its_whitespace() {
        let store = MemoryStore::with_default_categories();
        store.add_question(new_question("What is 1 + 1?", 1)).await.unwrap();
        store.add_question(new_question("How many players make 11?", 6)).await.unwrap();

        let spaced = store.find_by_substring("1 ").await.unwrap();
        assert_eq!(spaced.len(), 1);
        assert_eq!(spaced[0].question, "What is 1 + 1?");

        assert_eq!(store.find_by_substring("1").await.unwrap().len(), 2);
        assert_eq!(
            store
                .count_questions(&QuestionFilter::Search("1 ".to_string()))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn deleting_removes_and_reports_missing() {
        let store = MemoryStore::with_default_categories();
        let created = store
            .add_question(new_question("What is the capital of Peru?", 3))
            .await
            .unwrap();
        store.delete_question(created.id).await.unwrap();
        assert!(matches!(
            store.get_question(created.id).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.delete_question(created.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::with_default_categories();
        let first = store.add_question(new_question("one?", 1)).await.unwrap();
        store.delete_question(first.id).await.unwrap();
        let second = store.add_question(new_question("two?", 1)).await.unwrap();
        assert_eq!(second.id, QuestionId(2));
    }

    #[tokio::test]
    async fn rejects_unknown_category() {
        let store = MemoryStore::with_default_categories();
        assert!(matches!(
            store.add_question(new_question("q?", 42)).await,
            Err(Error::NotFound(_))
        ));
    }
}
