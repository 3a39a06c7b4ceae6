// src/services/ai_service.rs

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    config::AiConfig,
    models::{
        ai::{GenerateContentRequest, GenerateImageRequest},
        settings::AiFeature,
    },
    services::settings_service::AiSettingsService,
};

/// Provedor de geração de texto e imagem.
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn complete(&self, instruction: &str) -> Result<String, AppError>;

    /// Devolve a URL da imagem gerada.
    async fn generate_image(&self, prompt: &str) -> Result<String, AppError>;
}

// ---
// API compatível com OpenAI (chat/completions e images/generations)
// ---
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl OpenAiProvider {
    pub fn new(config: &AiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, AppError> {
        let api_key = self.api_key.as_deref().ok_or(AppError::AiNotConfigured)?;

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let payload: Value = response.json().await?;

        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(AppError::Upstream(message));
        }

        Ok(payload)
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn complete(&self, instruction: &str) -> Result<String, AppError> {
        let payload = self
            .post(
                "chat/completions",
                json!({
                    "model": self.text_model,
                    "messages": [{ "role": "user", "content": instruction }],
                    "temperature": 0.7,
                }),
            )
            .await?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(clean_completion)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Upstream("empty completion".into()))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, AppError> {
        let payload = self
            .post(
                "images/generations",
                json!({
                    "model": self.image_model,
                    "prompt": prompt,
                    "n": 1,
                    "size": "1024x1024",
                }),
            )
            .await?;

        payload["data"][0]["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AppError::Upstream("missing image url".into()))
    }
}

// Modelos costumam devolver o texto entre aspas.
fn clean_completion(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

// ---
// Serviço: portão de habilitação e cota em volta do provedor.
// ---
#[derive(Clone)]
pub struct AiService {
    provider: Arc<dyn AiProvider>,
    settings: AiSettingsService,
    pool: PgPool,
}

impl AiService {
    pub fn new(provider: Arc<dyn AiProvider>, settings: AiSettingsService, pool: PgPool) -> Self {
        Self {
            provider,
            settings,
            pool,
        }
    }

    pub async fn generate_content(&self, input: &GenerateContentRequest) -> Result<String, AppError> {
        let feature = input.kind.feature();
        let instruction = input.instruction();
        self.gated(feature, || self.provider.complete(&instruction))
            .await
    }

    pub async fn generate_image(&self, input: &GenerateImageRequest) -> Result<String, AppError> {
        let prompt = input.prompt.trim().to_string();
        self.gated(AiFeature::Image, || self.provider.generate_image(&prompt))
            .await
    }

    // Reserva a cota antes da chamada e devolve se o provedor falhar.
    async fn gated<F, Fut>(&self, feature: AiFeature, call: F) -> Result<String, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, AppError>>,
    {
        if let Err(e) = self.settings.reserve(&self.pool, feature).await {
            tracing::info!("🤖 Geração de {} recusada: {}", feature, e);
            return Err(e);
        }

        match call().await {
            Ok(output) => Ok(output),
            Err(e) => {
                if let Err(release_err) = self.settings.release(&self.pool).await {
                    tracing::error!("Falha ao devolver cota de IA: {}", release_err);
                }
                tracing::warn!("🤖 Provedor falhou na geração de {}: {}", feature, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::{
        db::SettingsRepository,
        models::{ai::ContentKind, settings::{QuotaWindow, UpdateAiSettingsRequest}},
    };

    // Provedor falso: conta as chamadas e responde o que foi configurado.
    struct ScriptedProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ScriptedProvider {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }

        fn answer(&self, text: &str) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::Upstream("modelo indisponível".into()))
            } else {
                Ok(text.to_string())
            }
        }
    }

    #[async_trait]
    impl AiProvider for ScriptedProvider {
        async fn complete(&self, _instruction: &str) -> Result<String, AppError> {
            self.answer("Pizza em dobro")
        }

        async fn generate_image(&self, _prompt: &str) -> Result<String, AppError> {
            self.answer("https://img/gerada.png")
        }
    }

    async fn setup(
        pool: &PgPool,
        provider: Arc<ScriptedProvider>,
        limits: UpdateAiSettingsRequest,
    ) -> (AiService, AiSettingsService) {
        let settings = AiSettingsService::new(SettingsRepository::new(pool.clone()));
        settings.update(pool, &limits).await.unwrap();
        let service = AiService::new(provider, settings.clone(), pool.clone());
        (service, settings)
    }

    fn title_request() -> GenerateContentRequest {
        GenerateContentRequest {
            kind: ContentKind::Title,
            prompt: "Pizzaria no centro".into(),
            category: None,
            city: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn successful_generation_consumes_one_unit(pool: PgPool) {
        let provider = ScriptedProvider::new(false);
        let limits = UpdateAiSettingsRequest {
            daily_limit: Some(1),
            reset_usage: true,
            ..Default::default()
        };
        let (service, settings) = setup(&pool, provider.clone(), limits).await;

        let title = service.generate_content(&title_request()).await.unwrap();
        assert_eq!(title, "Pizza em dobro");
        assert_eq!(settings.get().await.unwrap().current_daily_usage, 1);

        // Limite atingido: o provedor não é chamado de novo.
        assert!(matches!(
            service.generate_content(&title_request()).await,
            Err(AppError::AiQuotaExceeded(QuotaWindow::Daily))
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(settings.get().await.unwrap().current_daily_usage, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn provider_failure_gives_the_unit_back(pool: PgPool) {
        let provider = ScriptedProvider::new(true);
        let limits = UpdateAiSettingsRequest {
            reset_usage: true,
            ..Default::default()
        };
        let (service, settings) = setup(&pool, provider.clone(), limits).await;

        let request = GenerateImageRequest {
            prompt: "Pizza na mesa".into(),
        };
        assert!(matches!(
            service.generate_image(&request).await,
            Err(AppError::Upstream(_))
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let after = settings.get().await.unwrap();
        assert_eq!(after.current_daily_usage, 0);
        assert_eq!(after.current_monthly_usage, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn disabled_feature_is_refused_before_the_provider(pool: PgPool) {
        let provider = ScriptedProvider::new(false);
        let limits = UpdateAiSettingsRequest {
            title_generation_enabled: Some(false),
            reset_usage: true,
            ..Default::default()
        };
        let (service, settings) = setup(&pool, provider.clone(), limits).await;

        assert!(matches!(
            service.generate_content(&title_request()).await,
            Err(AppError::AiFeatureDisabled(AiFeature::Title))
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(settings.get().await.unwrap().current_daily_usage, 0);
    }

    #[test]
    fn completion_quotes_are_stripped() {
        assert_eq!(clean_completion("  \"Pizza em dobro\"\n"), "Pizza em dobro");
        assert_eq!(clean_completion("Sem aspas"), "Sem aspas");
    }

    #[tokio::test]
    async fn missing_api_key_is_reported_before_any_request() {
        let provider = OpenAiProvider::new(&AiConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".into(),
            text_model: "m".into(),
            image_model: "i".into(),
            timeout_secs: 1,
        })
        .unwrap();

        assert!(matches!(
            provider.complete("oi").await,
            Err(AppError::AiNotConfigured)
        ));
    }
}
