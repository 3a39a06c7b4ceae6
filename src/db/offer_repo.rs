// src/db/offer_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::offer::{NewOffer, Offer, OfferQuery, UpdateOfferRequest},
};

const OFFER_COLUMNS: &str = "id, title, description, image, map_link, category, expiry_date, \
     city, area, owner_name, phone_number, social_link, submission_id, created_at, updated_at";

const OFFER_COUNTER: &str = "offers";

#[derive(Clone)]
pub struct OfferRepository {
    pool: PgPool,
}

impl OfferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ofertas vigentes (sem validade ou com validade depois de `today`).
    /// Consulta pura: nada é apagado aqui.
    pub async fn list_active(
        &self,
        today: NaiveDate,
        query: &OfferQuery,
    ) -> Result<Vec<Offer>, AppError> {
        let sql = format!(
            r#"
            SELECT {OFFER_COLUMNS} FROM offers
            WHERE (expiry_date IS NULL OR expiry_date > $1)
              AND ($2::text IS NULL OR city = $2)
              AND ($3::text IS NULL OR area = $3)
              AND ($4::text IS NULL OR category = $4)
            ORDER BY created_at DESC, id DESC
            "#
        );

        let offers = sqlx::query_as::<_, Offer>(&sql)
            .bind(today)
            .bind(&query.city)
            .bind(&query.area)
            .bind(&query.category)
            .fetch_all(&self.pool)
            .await?;
        Ok(offers)
    }

    /// Reserva o próximo id de oferta: maior id existente + 1 (1 com a tabela vazia).
    /// A linha do contador fica travada até o fim da transação, então duas
    /// alocações concorrentes nunca recebem o mesmo número. O MAX roda numa
    /// instrução separada, depois da trava, e enxerga os commits de quem
    /// segurava a linha antes.
    pub async fn next_offer_id(&self, conn: &mut PgConnection) -> Result<i64, AppError> {
        sqlx::query("SELECT value FROM id_counters WHERE name = $1 FOR UPDATE")
            .bind(OFFER_COUNTER)
            .fetch_one(&mut *conn)
            .await?;

        let id: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM offers")
            .fetch_one(&mut *conn)
            .await?;

        sqlx::query("UPDATE id_counters SET value = $2 WHERE name = $1")
            .bind(OFFER_COUNTER)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(id)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &NewOffer,
        submission_id: Option<Uuid>,
    ) -> Result<Offer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO offers (
                id, title, description, image, map_link, category, expiry_date,
                city, area, owner_name, phone_number, social_link, submission_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {OFFER_COLUMNS}
            "#
        );

        let offer = sqlx::query_as::<_, Offer>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.image)
            .bind(&input.map_link)
            .bind(&input.category)
            .bind(input.expiry_date)
            .bind(&input.city)
            .bind(&input.area)
            .bind(&input.owner_name)
            .bind(&input.phone_number)
            .bind(&input.social_link)
            .bind(submission_id)
            .fetch_one(executor)
            .await?;
        Ok(offer)
    }

    pub async fn find_id_by_submission<'e, E>(
        &self,
        executor: E,
        submission_id: Uuid,
    ) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar("SELECT id FROM offers WHERE submission_id = $1")
            .bind(submission_id)
            .fetch_optional(executor)
            .await?;
        Ok(id)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        input: &UpdateOfferRequest,
    ) -> Result<Option<Offer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE offers SET
                title        = COALESCE($2, title),
                description  = COALESCE($3, description),
                image        = COALESCE($4, image),
                map_link     = COALESCE($5, map_link),
                category     = COALESCE($6, category),
                expiry_date  = COALESCE($7, expiry_date),
                city         = COALESCE($8, city),
                area         = COALESCE($9, area),
                owner_name   = COALESCE($10, owner_name),
                phone_number = COALESCE($11, phone_number),
                social_link  = COALESCE($12, social_link),
                updated_at   = NOW()
            WHERE id = $1
            RETURNING {OFFER_COLUMNS}
            "#
        );

        let offer = sqlx::query_as::<_, Offer>(&sql)
            .bind(input.id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.image)
            .bind(&input.map_link)
            .bind(&input.category)
            .bind(input.expiry_date)
            .bind(&input.city)
            .bind(&input.area)
            .bind(&input.owner_name)
            .bind(&input.phone_number)
            .bind(&input.social_link)
            .fetch_optional(executor)
            .await?;
        Ok(offer)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apaga as ofertas vencidas (validade em `today` ou antes) e devolve os ids.
    pub async fn delete_expired<'e, E>(
        &self,
        executor: E,
        today: NaiveDate,
    ) -> Result<Vec<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar(
            "DELETE FROM offers WHERE expiry_date IS NOT NULL AND expiry_date <= $1 RETURNING id",
        )
        .bind(today)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }
}
