//! Response repository: individual answers and the grouped analytics query.

use std::sync::Arc;

use epidash_analytics::{AggregationFilter, RawResponseRow};
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use crate::database::Database;
use crate::error::Result;
use crate::schema::{AnalyticsRow, GroupedResponse, GroupedResponses, ResponseFilter, ResponseRecord};

const JOINED: &str = "
    FROM responses r
    JOIN diseases d ON r.disease_id = d.disease_id
    JOIN questions q ON r.question_id = q.id
    JOIN choices c ON r.choice_id = c.id
    WHERE d.is_active = 1 AND q.is_active = 1";

/// Repository for survey responses.
#[derive(Clone)]
pub struct ResponseRepository {
    db: Arc<Database>,
}

impl ResponseRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        responder_id: &str,
        disease_id: i64,
        question_id: i64,
        choice_id: i64,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO responses (responder_id, disease_id, question_id, choice_id)
             VALUES (?, ?, ?, ?)",
        )
        .bind(responder_id)
        .bind(disease_id)
        .bind(question_id)
        .bind(choice_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Joined answers for active diseases and questions, newest first.
    pub async fn responses(&self, filter: &ResponseFilter) -> Result<Vec<ResponseRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT r.id, r.responder_id, d.disease_name, q.question_text, c.choice_text, r.created_at",
        );
        qb.push(JOINED);

        if !filter.diseases.is_empty() {
            qb.push(" AND d.disease_name IN (");
            let mut list = qb.separated(", ");
            for disease in &filter.diseases {
                list.push_bind(disease.clone());
            }
            list.push_unseparated(")");
        }

        if !filter.question_ids.is_empty() {
            qb.push(" AND q.id IN (");
            let mut list = qb.separated(", ");
            for id in &filter.question_ids {
                list.push_bind(*id);
            }
            list.push_unseparated(")");
        }

        qb.push(" ORDER BY r.created_at DESC, r.id DESC");

        let rows = qb
            .build_query_as::<ResponseRecord>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows)
    }

    /// `COUNT(*)` per (disease, question, choice) for the aggregator.
    ///
    /// Diseases match case-insensitively. Each requested variable adds a
    /// `LIKE` on its question fragment, OR-ed together; with no variables
    /// every question is returned.
    pub async fn analytics_rows(&self, filter: &AggregationFilter) -> Result<Vec<RawResponseRow>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT d.disease_name, q.question_text, c.choice_text, COUNT(*) AS response_count",
        );
        qb.push(JOINED);

        if !filter.diseases.is_empty() {
            qb.push(" AND LOWER(d.disease_name) IN (");
            let mut list = qb.separated(", ");
            for disease in &filter.diseases {
                list.push_bind(disease.clone());
            }
            list.push_unseparated(")");
        }

        if !filter.variables.is_empty() {
            qb.push(" AND (");
            let mut conditions = qb.separated(" OR ");
            for key in &filter.variables {
                conditions.push("q.question_text LIKE ");
                conditions.push_bind_unseparated(key.like_pattern());
            }
            conditions.push_unseparated(")");
        }

        qb.push(
            " GROUP BY d.disease_name, q.question_text, c.choice_text
              ORDER BY d.disease_name, q.question_text, response_count DESC",
        );

        let rows = qb
            .build_query_as::<AnalyticsRow>()
            .fetch_all(self.db.pool())
            .await?;
        debug!(rows = rows.len(), "fetched analytics rows");
        Ok(rows.into_iter().map(RawResponseRow::from).collect())
    }

    /// Distinct respondents across all diseases.
    pub async fn responder_count(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT responder_id) FROM responses")
            .fetch_one(self.db.pool())
            .await?;
        Ok(n)
    }

    pub async fn total_responses(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responses")
            .fetch_one(self.db.pool())
            .await?;
        Ok(n)
    }

    /// Every answer, grouped under its disease name.
    pub async fn grouped_responses(&self) -> Result<GroupedResponses> {
        let sql = format!(
            "SELECT r.responder_id, d.disease_name, q.question_text, c.choice_text {JOINED}
             ORDER BY d.disease_name, r.id"
        );
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(&sql)
            .fetch_all(self.db.pool())
            .await?;

        let mut groups = GroupedResponses::new();
        for (responder_id, disease_name, question, answer) in rows {
            groups.entry(disease_name).or_default().push(GroupedResponse {
                responder_id,
                question,
                answer,
            });
        }
        Ok(groups)
    }
}
