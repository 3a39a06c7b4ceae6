// src/db/submission_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::submission::{NewSubmission, Submission, SubmissionPatch, SubmissionStatus},
};

const SUBMISSION_COLUMNS: &str = "id, title, description, category, owner_name, phone_number, \
     city, area, map_link, social_link, expiry_date, image_url, image, status, created_at, updated_at";

#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grava uma submissão nova. O status é sempre `pending`.
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        input: &NewSubmission,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO submissions (
                title, description, category, owner_name, phone_number, city, area,
                map_link, social_link, expiry_date, image_url, image, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'pending')
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.owner_name)
        .bind(&input.phone_number)
        .bind(&input.city)
        .bind(&input.area)
        .bind(&input.map_link)
        .bind(&input.social_link)
        .bind(&input.expiry_date)
        .bind(&input.image_url)
        .bind(&input.image)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    // ---
    // Leituras usam a pool principal; escritas recebem o executor
    // para poderem rodar dentro de uma transação.
    // ---

    /// Todas as submissões, das mais recentes para as mais antigas.
    pub async fn list_all(&self) -> Result<Vec<Submission>, AppError> {
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions ORDER BY created_at DESC"
        );
        let submissions = sqlx::query_as::<_, Submission>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(submissions)
    }

    /// Busca e trava a linha até o fim da transação.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Submission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1 FOR UPDATE");
        let submission = sqlx::query_as::<_, Submission>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(submission)
    }

    // COALESCE mantém o valor atual quando o campo não veio no patch.
    pub async fn apply_patch<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &SubmissionPatch,
    ) -> Result<Option<Submission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE submissions SET
                title        = COALESCE($2, title),
                description  = COALESCE($3, description),
                category     = COALESCE($4, category),
                owner_name   = COALESCE($5, owner_name),
                phone_number = COALESCE($6, phone_number),
                city         = COALESCE($7, city),
                area         = COALESCE($8, area),
                map_link     = COALESCE($9, map_link),
                social_link  = COALESCE($10, social_link),
                expiry_date  = COALESCE($11, expiry_date),
                image_url    = COALESCE($12, image_url),
                updated_at   = NOW()
            WHERE id = $1
            RETURNING {SUBMISSION_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Submission>(&sql)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.description)
            .bind(&patch.category)
            .bind(&patch.owner_name)
            .bind(&patch.phone_number)
            .bind(&patch.city)
            .bind(&patch.area)
            .bind(&patch.map_link)
            .bind(&patch.social_link)
            .bind(&patch.expiry_date)
            .bind(&patch.image_url)
            .fetch_optional(executor)
            .await?;

        Ok(updated)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE submissions SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::SubmissionNotFound);
        }
        Ok(())
    }

    pub async fn delete_all<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM submissions").execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Submissões aprovadas com `from <= created_at < until`, mais recentes primeiro.
    pub async fn list_approved_between(
        &self,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Submission>, AppError> {
        let sql = format!(
            r#"
            SELECT {SUBMISSION_COLUMNS} FROM submissions
            WHERE status = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            ORDER BY created_at DESC
            "#
        );

        let submissions = sqlx::query_as::<_, Submission>(&sql)
            .bind(SubmissionStatus::Approved)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;
        Ok(submissions)
    }
}
