// src/services/submission_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OfferRepository, SubmissionRepository},
    models::{
        offer::NewOffer,
        submission::{
            NewSubmission, Submission, SubmissionAction, SubmissionFilter, SubmissionPatch,
            SubmissionStatus, Transition,
        },
    },
};

/// Resultado de uma ação de moderação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Approved {
        // None quando a oferta promovida já foi apagada depois
        offer_id: Option<i64>,
        promoted_now: bool,
    },
    Rejected {
        rejected_now: bool,
    },
}

#[derive(Clone)]
pub struct SubmissionService {
    repo: SubmissionRepository,
    offer_repo: OfferRepository,
}

impl SubmissionService {
    pub fn new(repo: SubmissionRepository, offer_repo: OfferRepository) -> Self {
        Self { repo, offer_repo }
    }

    // --- ENTRADA (formulário público) ---
    pub async fn submit<'e, E>(&self, executor: E, input: &NewSubmission) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = self.repo.insert(executor, input).await?;
        tracing::info!("📥 Nova submissão recebida: {}", id);
        Ok(id)
    }

    // --- LISTAGEM DO ADMIN ---
    // Busca tudo e filtra em memória.
    pub async fn list(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>, AppError> {
        let all = self.repo.list_all().await?;
        Ok(filter.apply(all))
    }

    // --- EDIÇÃO DO ADMIN ---
    pub async fn edit<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &SubmissionPatch,
    ) -> Result<Submission, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = self
            .repo
            .apply_patch(executor, id, patch)
            .await?
            .ok_or(AppError::SubmissionNotFound)?;

        // A API não restringe a edição a submissões pendentes; só registramos.
        if updated.status != SubmissionStatus::Pending {
            tracing::warn!(
                "Submissão {} editada com status '{}'.",
                updated.id,
                updated.status
            );
        }

        Ok(updated)
    }

    // --- APROVAÇÃO / REJEIÇÃO ---
    // Tudo numa transação: a linha da submissão fica travada, então duas
    // aprovações simultâneas da mesma submissão não geram duas ofertas, e
    // uma falha no meio desfaz a oferta criada.
    pub async fn apply_action<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        action: SubmissionAction,
    ) -> Result<ActionOutcome, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let submission = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::SubmissionNotFound)?;

        let outcome = match submission.status.transition(action)? {
            Transition::Promote => {
                let offer_id = self.offer_repo.next_offer_id(&mut *tx).await?;
                let new_offer = NewOffer::from_submission(&submission);
                let offer = self
                    .offer_repo
                    .insert(&mut *tx, offer_id, &new_offer, Some(submission.id))
                    .await?;
                self.repo
                    .set_status(&mut *tx, id, SubmissionStatus::Approved)
                    .await?;

                tracing::info!("✅ Submissão {} aprovada como oferta #{}", id, offer.id);
                ActionOutcome::Approved {
                    offer_id: Some(offer.id),
                    promoted_now: true,
                }
            }
            Transition::Reject => {
                self.repo
                    .set_status(&mut *tx, id, SubmissionStatus::Rejected)
                    .await?;
                tracing::info!("🚫 Submissão {} rejeitada", id);
                ActionOutcome::Rejected { rejected_now: true }
            }
            Transition::AlreadyDone => match action {
                SubmissionAction::Approve => ActionOutcome::Approved {
                    offer_id: self.offer_repo.find_id_by_submission(&mut *tx, id).await?,
                    promoted_now: false,
                },
                SubmissionAction::Reject => ActionOutcome::Rejected {
                    rejected_now: false,
                },
            },
        };

        tx.commit().await?;
        Ok(outcome)
    }

    // --- LIMPEZA GERAL ---
    pub async fn clear_all<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self.repo.delete_all(executor).await?;
        tracing::warn!("🧹 {} submissões apagadas pelo admin.", deleted);
        Ok(deleted)
    }
}
