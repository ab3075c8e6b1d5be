//! Reference data repository: diseases, questions and choices.
//!
//! These tables change rarely; the web layer caches their reads.

use std::sync::Arc;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{Choice, Disease, Question};

/// Repository for survey reference data.
#[derive(Clone)]
pub struct ReferenceRepository {
    db: Arc<Database>,
}

impl ReferenceRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Active diseases ordered by name.
    pub async fn diseases(&self) -> Result<Vec<Disease>> {
        let rows = sqlx::query_as::<_, Disease>(
            "SELECT disease_id, disease_name, description, is_active
             FROM diseases
             WHERE is_active = 1
             ORDER BY disease_name",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }

    /// Case-insensitive lookup, active or not.
    pub async fn find_disease(&self, name: &str) -> Result<Option<Disease>> {
        let row = sqlx::query_as::<_, Disease>(
            "SELECT disease_id, disease_name, description, is_active
             FROM diseases
             WHERE LOWER(disease_name) = LOWER(?)",
        )
        .bind(name)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row)
    }

    /// Active questions, optionally for one disease, in survey order.
    pub async fn questions(&self, disease_id: Option<i64>) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, Question>(
            r#"SELECT id, disease_id, question_text, "order", is_active
               FROM questions
               WHERE is_active = 1 AND (?1 IS NULL OR disease_id = ?1)
               ORDER BY disease_id, "order""#,
        )
        .bind(disease_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }

    /// Choices, optionally for one question, in display order.
    pub async fn choices(&self, question_id: Option<i64>) -> Result<Vec<Choice>> {
        let rows = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, choice_text, choice_order
             FROM choices
             WHERE (?1 IS NULL OR question_id = ?1)
             ORDER BY question_id, choice_order",
        )
        .bind(question_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }

    pub async fn insert_disease(&self, name: &str, description: Option<&str>) -> Result<i64> {
        let result = sqlx::query("INSERT INTO diseases (disease_name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(self.db.pool())
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_question(&self, disease_id: i64, text: &str, order: i64) -> Result<i64> {
        let result = sqlx::query(
            r#"INSERT INTO questions (disease_id, question_text, "order") VALUES (?, ?, ?)"#,
        )
        .bind(disease_id)
        .bind(text)
        .bind(order)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_choice(&self, question_id: i64, text: &str, order: i64) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO choices (question_id, choice_text, choice_order) VALUES (?, ?, ?)",
        )
        .bind(question_id)
        .bind(text)
        .bind(order)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn set_disease_active(&self, disease_id: i64, active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE diseases SET is_active = ? WHERE disease_id = ?")
            .bind(active)
            .bind(disease_id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("disease {disease_id}")));
        }
        Ok(())
    }

    pub async fn set_question_active(&self, question_id: i64, active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE questions SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(question_id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("question {question_id}")));
        }
        Ok(())
    }
}
