use async_trait::async_trait;
use sqlx::{
    Row,
    postgres::{PgPool, PgPoolOptions, PgRow},
};
use tracing::{Level, event};

use handle_errors::Error;

use super::{QuestionFilter, QuestionStore};
use crate::types::question::{Category, CategoryId, NewQuestion, Question, QuestionId};

const SELECT_QUESTIONS: &str = "SELECT id, question, answer, category, difficulty FROM questions";

#[derive(Debug, Clone)]
pub struct PgStore {
    pub connection: PgPool,
}

impl PgStore {
    pub async fn new(db_url: &str) -> Result<Self, sqlx::Error> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;

        Ok(PgStore {
            connection: db_pool,
        })
    }
}

fn question_from_row(row: PgRow) -> Question {
    Question {
        id: QuestionId(row.get("id")),
        question: row.get("question"),
        answer: row.get("answer"),
        category: CategoryId(row.get("category")),
        difficulty: row.get("difficulty"),
    }
}

fn category_from_row(row: PgRow) -> Category {
    Category {
        id: CategoryId(row.get("id")),
        kind: row.get("type"),
    }
}

fn where_clause(filter: &QuestionFilter) -> &'static str {
    match filter {
        QuestionFilter::All => "",
        QuestionFilter::Category(_) => " WHERE category = $1",
        // strpos keeps % and _ in the term literal, unlike ILIKE.
        QuestionFilter::Search(_) => " WHERE strpos(lower(question), lower($1)) > 0",
    }
}

fn query_error(e: sqlx::Error) -> Error {
    event!(Level::ERROR, "{:?}", e);
    Error::DatabaseQueryError(e)
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        sqlx::query("SELECT id, type FROM categories ORDER BY id")
            .map(category_from_row)
            .fetch_all(&self.connection)
            .await
            .map_err(query_error)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Category, Error> {
        sqlx::query("SELECT id, type FROM categories WHERE id = $1")
            .bind(id.0)
            .map(category_from_row)
            .fetch_optional(&self.connection)
            .await
            .map_err(query_error)?
            .ok_or_else(|| Error::NotFound(format!("category {}", id.0)))
    }

    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>, Error> {
        let sql = format!("{}{} ORDER BY id", SELECT_QUESTIONS, where_clause(filter));
        let query = sqlx::query(&sql);
        let query = match filter {
            QuestionFilter::All => query,
            QuestionFilter::Category(id) => query.bind(id.0),
            QuestionFilter::Search(term) => query.bind(term.clone()),
        };

        query
            .map(question_from_row)
            .fetch_all(&self.connection)
            .await
            .map_err(query_error)
    }

    async fn count_questions(&self, filter: &QuestionFilter) -> Result<usize, Error> {
        let sql = format!("SELECT COUNT(*) AS count FROM questions{}", where_clause(filter));
        let query = sqlx::query(&sql);
        let query = match filter {
            QuestionFilter::All => query,
            QuestionFilter::Category(id) => query.bind(id.0),
            QuestionFilter::Search(term) => query.bind(term.clone()),
        };

        let count = query
            .map(|row: PgRow| row.get::<i64, _>("count"))
            .fetch_one(&self.connection)
            .await
            .map_err(query_error)?;
        Ok(count as usize)
    }

    async fn get_question(&self, id: QuestionId) -> Result<Question, Error> {
        let sql = format!("{} WHERE id = $1", SELECT_QUESTIONS);
        sqlx::query(&sql)
            .bind(id.0)
            .map(question_from_row)
            .fetch_optional(&self.connection)
            .await
            .map_err(query_error)?
            .ok_or_else(|| Error::NotFound(format!("question {}", id.0)))
    }

    async fn add_question(&self, new_question: NewQuestion) -> Result<Question, Error> {
        sqlx::query(
            "INSERT INTO questions (question, answer, category, difficulty)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, question, answer, category, difficulty",
        )
        .bind(new_question.question)
        .bind(new_question.answer)
        .bind(new_question.category)
        .bind(new_question.difficulty)
        .map(question_from_row)
        .fetch_one(&self.connection)
        .await
        .map_err(query_error)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id.0)
            .execute(&self.connection)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("question {}", id.0)));
        }
        Ok(())
    }
}
