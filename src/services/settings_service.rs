// src/services/settings_service.rs

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Postgres};
use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::SettingsRepository,
    models::settings::{
        AiAvailability, AiFeature, AiSettings, QuotaWindow, SiteSettings,
        UpdateAiSettingsRequest, UpdateSiteSettingsRequest,
    },
};

// ---
// Configurações do site
// Lidas em toda página pública; ficam em cache até a próxima gravação.
// ---
#[derive(Clone)]
pub struct SiteSettingsService {
    repo: SettingsRepository,
    cache: Arc<RwLock<Option<SiteSettings>>>,
}

impl SiteSettingsService {
    pub fn new(repo: SettingsRepository) -> Self {
        Self {
            repo,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn get(&self) -> Result<SiteSettings, AppError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(cached.clone());
        }
        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<SiteSettings, AppError> {
        let settings = self.repo.get_site_settings().await?;
        *self.cache.write().await = Some(settings.clone());
        Ok(settings)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        input: &UpdateSiteSettingsRequest,
    ) -> Result<SiteSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = self.repo.update_site_settings(executor, input).await?;
        *self.cache.write().await = Some(settings.clone());
        tracing::info!("⚙️ Configurações do site atualizadas");
        Ok(settings)
    }
}

// ---
// Configurações e cotas de IA
// Sem cache: os contadores mudam a cada geração.
// ---
#[derive(Clone)]
pub struct AiSettingsService {
    repo: SettingsRepository,
}

impl AiSettingsService {
    pub fn new(repo: SettingsRepository) -> Self {
        Self { repo }
    }

    pub async fn get(&self) -> Result<AiSettings, AppError> {
        self.repo.get_ai_settings().await
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        input: &UpdateAiSettingsRequest,
    ) -> Result<AiSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = self
            .repo
            .update_ai_settings(executor, input, today())
            .await?;
        if input.reset_usage {
            tracing::info!("🤖 Contadores de uso de IA zerados pelo admin");
        }
        Ok(settings)
    }

    pub async fn availability(&self) -> Result<AiAvailability, AppError> {
        Ok(self.get().await?.availability(today()))
    }

    /// Portão de uso: recurso habilitado, cota disponível e reserva de uma unidade.
    /// A checagem prévia dá o erro certo (403 ou 429); a reserva atômica
    /// resolve a corrida entre requisições simultâneas.
    pub async fn reserve<'e, E>(
        &self,
        executor: E,
        feature: AiFeature,
    ) -> Result<AiSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let today = today();
        let current = self.get().await?;
        current.check_available(feature, today)?;

        match self.repo.try_reserve_quota(executor, today).await? {
            Some(reserved) => Ok(reserved),
            // Outra requisição consumiu a última unidade no meio tempo.
            None => {
                let latest = self.get().await?;
                Err(latest
                    .check_quota(today)
                    .err()
                    .unwrap_or(AppError::AiQuotaExceeded(QuotaWindow::Daily)))
            }
        }
    }

    pub async fn release<'e, E>(&self, executor: E) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.release_quota(executor, today()).await
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    use crate::models::settings::month_key;

    #[sqlx::test(migrations = "./migrations")]
    async fn stale_counters_roll_over_on_reserve(pool: PgPool) {
        let repo = SettingsRepository::new(pool.clone());
        let today = today();
        let yesterday = today.pred_opt().unwrap();

        // Limite diário esgotado ontem, mês atual com folga.
        sqlx::query(
            "UPDATE ai_settings SET daily_limit = 2, current_daily_usage = 2, \
             current_monthly_usage = 7, last_reset_date = $1, last_month_reset = $2",
        )
        .bind(yesterday)
        .bind(month_key(yesterday))
        .execute(&pool)
        .await
        .unwrap();

        let reserved = repo.try_reserve_quota(&pool, today).await.unwrap().unwrap();
        assert_eq!(reserved.current_daily_usage, 1);
        assert_eq!(reserved.last_reset_date, today);
        let expected_monthly = if month_key(yesterday) == month_key(today) { 8 } else { 1 };
        assert_eq!(reserved.current_monthly_usage, expected_monthly);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn reserve_stops_exactly_at_the_limit(pool: PgPool) {
        let service = AiSettingsService::new(SettingsRepository::new(pool.clone()));
        let limits = UpdateAiSettingsRequest {
            daily_limit: Some(2),
            reset_usage: true,
            ..Default::default()
        };
        service.update(&pool, &limits).await.unwrap();

        service.reserve(&pool, AiFeature::Image).await.unwrap();
        service.reserve(&pool, AiFeature::Image).await.unwrap();
        assert!(matches!(
            service.reserve(&pool, AiFeature::Image).await,
            Err(AppError::AiQuotaExceeded(QuotaWindow::Daily))
        ));
        assert_eq!(service.get().await.unwrap().current_daily_usage, 2);

        let availability = service.availability().await.unwrap();
        assert_eq!(availability.remaining_daily, 0);

        // Devolver nunca deixa o contador negativo.
        service.release(&pool).await.unwrap();
        service.release(&pool).await.unwrap();
        service.release(&pool).await.unwrap();
        assert_eq!(service.get().await.unwrap().current_daily_usage, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn site_settings_update_merges_and_refreshes_cache(pool: PgPool) {
        let service = SiteSettingsService::new(SettingsRepository::new(pool.clone()));
        assert_eq!(service.get().await.unwrap().site_name, None);

        let first = UpdateSiteSettingsRequest {
            site_name: Some("Ofertas do Bairro".into()),
            ..Default::default()
        };
        service.update(&pool, &first).await.unwrap();

        let second = UpdateSiteSettingsRequest {
            tagline: Some("As melhores da cidade".into()),
            ..Default::default()
        };
        service.update(&pool, &second).await.unwrap();

        let cached = service.get().await.unwrap();
        assert_eq!(cached.site_name.as_deref(), Some("Ofertas do Bairro"));
        assert_eq!(cached.tagline.as_deref(), Some("As melhores da cidade"));
    }
}
