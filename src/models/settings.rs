// src/models/settings.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::error::AppError;

// ---
// Configurações do site (linha única)
// ---
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[schema(example = "Ofertas da Cidade")]
    pub site_name: Option<String>,

    #[schema(example = "As melhores promoções do seu bairro")]
    pub tagline: Option<String>,

    #[schema(example = "contato@ofertas.com")]
    pub contact_email: Option<String>,

    #[schema(example = "(11) 99999-8888")]
    pub contact_phone: Option<String>,

    #[schema(example = "5511999998888")]
    pub whatsapp_number: Option<String>,

    pub logo_url: Option<String>,
    pub footer_text: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteSettingsRequest {
    pub site_name: Option<String>,
    pub tagline: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub whatsapp_number: Option<String>,
    pub logo_url: Option<String>,
    pub footer_text: Option<String>,
}

// ---
// Configurações e cotas de IA (linha única)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AiFeature {
    Title,
    Description,
    Image,
}

impl fmt::Display for AiFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiFeature::Title => write!(f, "title"),
            AiFeature::Description => write!(f, "description"),
            AiFeature::Image => write!(f, "image"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaWindow {
    Daily,
    Monthly,
}

impl fmt::Display for QuotaWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaWindow::Daily => write!(f, "daily"),
            QuotaWindow::Monthly => write!(f, "monthly"),
        }
    }
}

/// Chave do mês usada no controle de reset mensal ("2025-03").
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub image_generation_enabled: bool,
    pub title_generation_enabled: bool,
    pub description_generation_enabled: bool,

    #[schema(example = 50)]
    pub daily_limit: i32,

    #[schema(example = 1000)]
    pub monthly_limit: i32,

    pub current_daily_usage: i32,
    pub current_monthly_usage: i32,
    pub last_reset_date: NaiveDate,

    #[schema(example = "2025-03")]
    pub last_month_reset: String,

    pub updated_at: Option<DateTime<Utc>>,
}

impl AiSettings {
    pub fn is_enabled(&self, feature: AiFeature) -> bool {
        match feature {
            AiFeature::Title => self.title_generation_enabled,
            AiFeature::Description => self.description_generation_enabled,
            AiFeature::Image => self.image_generation_enabled,
        }
    }

    /// Uso efetivo (diário, mensal) considerando a virada de dia/mês ainda não gravada.
    pub fn effective_usage(&self, today: NaiveDate) -> (i32, i32) {
        let daily = if self.last_reset_date == today {
            self.current_daily_usage
        } else {
            0
        };
        let monthly = if self.last_month_reset == month_key(today) {
            self.current_monthly_usage
        } else {
            0
        };
        (daily, monthly)
    }

    pub fn check_quota(&self, today: NaiveDate) -> Result<(), AppError> {
        let (daily, monthly) = self.effective_usage(today);
        if daily >= self.daily_limit {
            return Err(AppError::AiQuotaExceeded(QuotaWindow::Daily));
        }
        if monthly >= self.monthly_limit {
            return Err(AppError::AiQuotaExceeded(QuotaWindow::Monthly));
        }
        Ok(())
    }

    /// Portão completo: recurso habilitado e cota disponível.
    pub fn check_available(&self, feature: AiFeature, today: NaiveDate) -> Result<(), AppError> {
        if !self.is_enabled(feature) {
            return Err(AppError::AiFeatureDisabled(feature));
        }
        self.check_quota(today)
    }

    pub fn availability(&self, today: NaiveDate) -> AiAvailability {
        let (daily, monthly) = self.effective_usage(today);
        let quota_available = self.check_quota(today).is_ok();
        AiAvailability {
            title_generation: self.title_generation_enabled && quota_available,
            description_generation: self.description_generation_enabled && quota_available,
            image_generation: self.image_generation_enabled && quota_available,
            quota_available,
            remaining_daily: (self.daily_limit - daily).max(0),
            remaining_monthly: (self.monthly_limit - monthly).max(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiAvailability {
    pub title_generation: bool,
    pub description_generation: bool,
    pub image_generation: bool,
    pub quota_available: bool,
    pub remaining_daily: i32,
    pub remaining_monthly: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAiSettingsRequest {
    pub image_generation_enabled: Option<bool>,
    pub title_generation_enabled: Option<bool>,
    pub description_generation_enabled: Option<bool>,

    #[validate(range(min = 0, message = "limit_negative"))]
    pub daily_limit: Option<i32>,

    #[validate(range(min = 0, message = "limit_negative"))]
    pub monthly_limit: Option<i32>,

    // Zera os contadores de uso
    #[serde(default)]
    pub reset_usage: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settings(daily_usage: i32, daily_limit: i32, today: NaiveDate) -> AiSettings {
        AiSettings {
            image_generation_enabled: true,
            title_generation_enabled: true,
            description_generation_enabled: false,
            daily_limit,
            monthly_limit: 100,
            current_daily_usage: daily_usage,
            current_monthly_usage: daily_usage,
            last_reset_date: today,
            last_month_reset: month_key(today),
            updated_at: None,
        }
    }

    #[test]
    fn usage_at_daily_limit_is_rejected() {
        let today = day(2025, 3, 10);
        let s = settings(5, 5, today);
        assert!(matches!(
            s.check_available(AiFeature::Title, today),
            Err(AppError::AiQuotaExceeded(QuotaWindow::Daily))
        ));
    }

    #[test]
    fn usage_below_limit_is_allowed() {
        let today = day(2025, 3, 10);
        assert!(settings(4, 5, today).check_available(AiFeature::Title, today).is_ok());
    }

    #[test]
    fn yesterdays_usage_does_not_count_today() {
        let yesterday = day(2025, 3, 9);
        let s = settings(5, 5, yesterday);
        let today = day(2025, 3, 10);
        assert_eq!(s.effective_usage(today), (0, 5));
        assert!(s.check_quota(today).is_ok());
    }

    #[test]
    fn monthly_limit_applies_across_days() {
        let today = day(2025, 3, 10);
        let mut s = settings(0, 50, today);
        s.current_monthly_usage = 100;
        assert!(matches!(
            s.check_quota(today),
            Err(AppError::AiQuotaExceeded(QuotaWindow::Monthly))
        ));
        // Novo mês zera o contador mensal.
        assert!(s.check_quota(day(2025, 4, 1)).is_ok());
    }

    #[test]
    fn disabled_feature_is_rejected_before_quota() {
        let today = day(2025, 3, 10);
        let s = settings(5, 5, today);
        assert!(matches!(
            s.check_available(AiFeature::Description, today),
            Err(AppError::AiFeatureDisabled(AiFeature::Description))
        ));
    }

    #[test]
    fn availability_reports_remaining_quota() {
        let today = day(2025, 3, 10);
        let a = settings(3, 5, today).availability(today);
        assert!(a.quota_available);
        assert!(!a.description_generation);
        assert_eq!(a.remaining_daily, 2);
        assert_eq!(a.remaining_monthly, 97);
    }
}
