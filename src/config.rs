// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{LocationRepository, OfferRepository, SettingsRepository, SubmissionRepository},
    services::{
        ai_service::{AiProvider, AiService, OpenAiProvider},
        auth::AuthService,
        export_service::ExportService,
        location_service::LocationService,
        offer_service::OfferService,
        settings_service::{AiSettingsService, SiteSettingsService},
        submission_service::SubmissionService,
    },
};

#[derive(Debug, Clone)]
pub struct AiConfig {
    // Sem chave, as rotas de geração respondem "provedor não configurado".
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password_hash: String,
    // 0 desliga a varredura em segundo plano
    pub expiry_sweep_interval_secs: u64,
    pub ai: AiConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave -> valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{key} deve ser definida"))
        };
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_number(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: optional("BIND_ADDR", "0.0.0.0:3000"),
            jwt_secret: required("JWT_SECRET")?,
            admin_email: required("ADMIN_EMAIL")?,
            admin_password_hash: required("ADMIN_PASSWORD_HASH")?,
            expiry_sweep_interval_secs: parse_number(&lookup, "EXPIRY_SWEEP_INTERVAL_SECS", 3600)?,
            ai: AiConfig {
                api_key: lookup("AI_API_KEY").filter(|v| !v.trim().is_empty()),
                base_url: optional("AI_BASE_URL", "https://api.openai.com/v1"),
                text_model: optional("AI_TEXT_MODEL", "gpt-4o-mini"),
                image_model: optional("AI_IMAGE_MODEL", "dall-e-3"),
                timeout_secs: parse_number(&lookup, "AI_TIMEOUT_SECS", 60)?,
            },
        })
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.expiry_sweep_interval_secs > 0)
            .then(|| Duration::from_secs(self.expiry_sweep_interval_secs))
    }
}

// Valor fora do tipo (ex: u32 estourado) é erro, nunca truncamento.
fn parse_number<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{key} deve ser um número inteiro válido")),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub submission_service: SubmissionService,
    pub offer_service: OfferService,
    pub export_service: ExportService,
    pub location_service: LocationService,
    pub site_settings: SiteSettingsService,
    pub ai_settings: AiSettingsService,
    pub ai_service: AiService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let provider = Arc::new(OpenAiProvider::new(&config.ai)?);
        Ok(Self::with_pool(config, db_pool, provider))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(config: Config, db_pool: PgPool, provider: Arc<dyn AiProvider>) -> Self {
        let submission_repo = SubmissionRepository::new(db_pool.clone());
        let offer_repo = OfferRepository::new(db_pool.clone());
        let location_repo = LocationRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            config.admin_email.clone(),
            config.admin_password_hash.clone(),
            config.jwt_secret.clone(),
        );
        let ai_settings = AiSettingsService::new(settings_repo.clone());

        Self {
            auth_service,
            submission_service: SubmissionService::new(submission_repo.clone(), offer_repo.clone()),
            offer_service: OfferService::new(offer_repo),
            export_service: ExportService::new(submission_repo),
            location_service: LocationService::new(location_repo),
            site_settings: SiteSettingsService::new(settings_repo),
            ai_service: AiService::new(provider, ai_settings.clone(), db_pool.clone()),
            ai_settings,
            i18n_store: Arc::new(I18nStore::new()),
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("DATABASE_URL", "postgres://localhost/deals"),
        ("JWT_SECRET", "segredo"),
        ("ADMIN_EMAIL", "admin@ofertas.com"),
        ("ADMIN_PASSWORD_HASH", "$2b$12$abc"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.sweep_interval(), Some(Duration::from_secs(3600)));
        assert_eq!(config.ai.api_key, None);
        assert_eq!(config.ai.text_model, "gpt-4o-mini");
        assert_eq!(config.ai.timeout_secs, 60);
    }

    #[test]
    fn zero_interval_disables_the_sweeper() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EXPIRY_SWEEP_INTERVAL_SECS", "0"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.sweep_interval(), None);
    }

    #[test]
    fn missing_required_var_is_reported() {
        let err = Config::from_lookup(lookup(&REQUIRED[..3])).unwrap_err();
        assert!(err.to_string().contains("ADMIN_PASSWORD_HASH"));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("AI_TIMEOUT_SECS", "um minuto"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn oversized_pool_size_is_rejected_instead_of_truncated() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DATABASE_MAX_CONNECTIONS", "4294967301"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));
    }
}
