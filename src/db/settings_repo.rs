use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::settings::{
        month_key, AiSettings, SiteSettings, UpdateAiSettingsRequest, UpdateSiteSettingsRequest,
    },
};

// As duas tabelas têm uma única linha, garantida pelo CHECK (id = 1) da migração.
const SITE_COLUMNS: &str = "site_name, tagline, contact_email, contact_phone, whatsapp_number, \
     logo_url, footer_text, updated_at";

const AI_COLUMNS: &str = "image_generation_enabled, title_generation_enabled, \
     description_generation_enabled, daily_limit, monthly_limit, current_daily_usage, \
     current_monthly_usage, last_reset_date, last_month_reset, updated_at";

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Configurações do site
    // ---

    pub async fn get_site_settings(&self) -> Result<SiteSettings, AppError> {
        let sql = format!("SELECT {SITE_COLUMNS} FROM site_settings WHERE id = 1");
        let settings = sqlx::query_as::<_, SiteSettings>(&sql)
            .fetch_optional(&self.pool)
            .await?;

        // Banco sem a linha semeada: trata como vazio.
        Ok(settings.unwrap_or_default())
    }

    pub async fn update_site_settings<'e, E>(
        &self,
        executor: E,
        input: &UpdateSiteSettingsRequest,
    ) -> Result<SiteSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let sql = format!(
            r#"
            INSERT INTO site_settings (
                id, site_name, tagline, contact_email, contact_phone,
                whatsapp_number, logo_url, footer_text, updated_at
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                site_name = COALESCE(EXCLUDED.site_name, site_settings.site_name),
                tagline = COALESCE(EXCLUDED.tagline, site_settings.tagline),
                contact_email = COALESCE(EXCLUDED.contact_email, site_settings.contact_email),
                contact_phone = COALESCE(EXCLUDED.contact_phone, site_settings.contact_phone),
                whatsapp_number = COALESCE(EXCLUDED.whatsapp_number, site_settings.whatsapp_number),
                logo_url = COALESCE(EXCLUDED.logo_url, site_settings.logo_url),
                footer_text = COALESCE(EXCLUDED.footer_text, site_settings.footer_text),
                updated_at = NOW()
            RETURNING {SITE_COLUMNS}
            "#
        );

        let settings = sqlx::query_as::<_, SiteSettings>(&sql)
            .bind(&input.site_name)
            .bind(&input.tagline)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .bind(&input.whatsapp_number)
            .bind(&input.logo_url)
            .bind(&input.footer_text)
            .fetch_one(executor)
            .await?;

        Ok(settings)
    }

    // ---
    // Configurações e cotas de IA
    // ---

    pub async fn get_ai_settings(&self) -> Result<AiSettings, AppError> {
        let sql = format!("SELECT {AI_COLUMNS} FROM ai_settings WHERE id = 1");
        let settings = sqlx::query_as::<_, AiSettings>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(settings)
    }

    pub async fn update_ai_settings<'e, E>(
        &self,
        executor: E,
        input: &UpdateAiSettingsRequest,
        today: NaiveDate,
    ) -> Result<AiSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE ai_settings SET
                image_generation_enabled = COALESCE($1, image_generation_enabled),
                title_generation_enabled = COALESCE($2, title_generation_enabled),
                description_generation_enabled = COALESCE($3, description_generation_enabled),
                daily_limit = COALESCE($4, daily_limit),
                monthly_limit = COALESCE($5, monthly_limit),
                current_daily_usage = CASE WHEN $6 THEN 0 ELSE current_daily_usage END,
                current_monthly_usage = CASE WHEN $6 THEN 0 ELSE current_monthly_usage END,
                last_reset_date = CASE WHEN $6 THEN $7 ELSE last_reset_date END,
                last_month_reset = CASE WHEN $6 THEN $8 ELSE last_month_reset END,
                updated_at = NOW()
            WHERE id = 1
            RETURNING {AI_COLUMNS}
            "#
        );

        let settings = sqlx::query_as::<_, AiSettings>(&sql)
            .bind(input.image_generation_enabled)
            .bind(input.title_generation_enabled)
            .bind(input.description_generation_enabled)
            .bind(input.daily_limit)
            .bind(input.monthly_limit)
            .bind(input.reset_usage)
            .bind(today)
            .bind(month_key(today))
            .fetch_one(executor)
            .await?;

        Ok(settings)
    }

    /// Reserva uma unidade de cota numa única instrução.
    /// A virada de dia/mês, a checagem dos limites e o incremento acontecem
    /// juntos, então chamadas concorrentes não ultrapassam o limite e um
    /// reset nunca se perde. `None` = cota esgotada, nada foi incrementado.
    pub async fn try_reserve_quota<'e, E>(
        &self,
        executor: E,
        today: NaiveDate,
    ) -> Result<Option<AiSettings>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE ai_settings SET
                current_daily_usage =
                    (CASE WHEN last_reset_date = $1 THEN current_daily_usage ELSE 0 END) + 1,
                current_monthly_usage =
                    (CASE WHEN last_month_reset = $2 THEN current_monthly_usage ELSE 0 END) + 1,
                last_reset_date = $1,
                last_month_reset = $2,
                updated_at = NOW()
            WHERE id = 1
              AND (CASE WHEN last_reset_date = $1 THEN current_daily_usage ELSE 0 END) < daily_limit
              AND (CASE WHEN last_month_reset = $2 THEN current_monthly_usage ELSE 0 END) < monthly_limit
            RETURNING {AI_COLUMNS}
            "#
        );

        let settings = sqlx::query_as::<_, AiSettings>(&sql)
            .bind(today)
            .bind(month_key(today))
            .fetch_optional(executor)
            .await?;

        Ok(settings)
    }

    /// Devolve uma unidade reservada (chamada ao provedor falhou).
    pub async fn release_quota<'e, E>(
        &self,
        executor: E,
        today: NaiveDate,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE ai_settings SET
                current_daily_usage = CASE WHEN last_reset_date = $1
                    THEN GREATEST(current_daily_usage - 1, 0) ELSE current_daily_usage END,
                current_monthly_usage = CASE WHEN last_month_reset = $2
                    THEN GREATEST(current_monthly_usage - 1, 0) ELSE current_monthly_usage END,
                updated_at = NOW()
            WHERE id = 1
            "#,
        )
        .bind(today)
        .bind(month_key(today))
        .execute(executor)
        .await?;

        Ok(())
    }
}
