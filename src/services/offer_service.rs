// src/services/offer_service.rs

use std::time::Duration;

use chrono::Utc;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use tokio::task::JoinHandle;

use crate::{
    common::error::AppError,
    db::OfferRepository,
    models::offer::{NewOffer, Offer, OfferQuery, SweepReport, UpdateOfferRequest},
};

#[derive(Clone)]
pub struct OfferService {
    repo: OfferRepository,
}

impl OfferService {
    pub fn new(repo: OfferRepository) -> Self {
        Self { repo }
    }

    // --- VITRINE PÚBLICA ---
    // Só leitura: ofertas vencidas ficam de fora, mas continuam no banco
    // até a próxima varredura.
    pub async fn list_active(&self, query: OfferQuery) -> Result<Vec<Offer>, AppError> {
        let today = Utc::now().date_naive();
        self.repo.list_active(today, &query.normalized()).await
    }

    // --- CRIAÇÃO MANUAL (admin) ---
    pub async fn create<'e, E>(&self, executor: E, input: &NewOffer) -> Result<Offer, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let id = self.repo.next_offer_id(&mut *tx).await?;
        let offer = self.repo.insert(&mut *tx, id, input, None).await?;

        tx.commit().await?;

        tracing::info!("🆕 Oferta #{} criada pelo admin", offer.id);
        Ok(offer)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        input: &UpdateOfferRequest,
    ) -> Result<Offer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, input)
            .await?
            .ok_or(AppError::OfferNotFound)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, id).await? {
            return Err(AppError::OfferNotFound);
        }
        tracing::info!("🗑️ Oferta #{} removida", id);
        Ok(())
    }

    // --- LIMPEZA DE VENCIDAS ---
    pub async fn sweep_expired<'e, E>(&self, executor: E) -> Result<SweepReport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let today = Utc::now().date_naive();
        let deleted_ids = self.repo.delete_expired(executor, today).await?;

        if !deleted_ids.is_empty() {
            tracing::info!(
                "🧹 {} ofertas vencidas removidas: {:?}",
                deleted_ids.len(),
                deleted_ids
            );
        }

        Ok(SweepReport {
            deleted_count: deleted_ids.len(),
            deleted_ids,
        })
    }
}

/// Varredura periódica das ofertas vencidas.
/// Erros são registrados e a tarefa segue para o próximo ciclo.
pub fn spawn_expiry_sweeper(service: OfferService, pool: PgPool, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = service.sweep_expired(&pool).await {
                tracing::error!("Falha na varredura de ofertas vencidas: {}", e);
            }
        }
    })
}
