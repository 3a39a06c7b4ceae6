// src/common/i18n.rs

use std::collections::HashMap;

const FALLBACK_LANG: &str = "en";

const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("invalid_argument", "Invalid or missing value: {value}."),
    ("unknown_action", "Unknown action '{value}'. Use 'approve' or 'reject'."),
    ("invalid_date", "Invalid date '{value}'. Expected YYYY-MM-DD."),
    ("invalid_credentials", "Invalid email or password."),
    ("missing_session", "Authentication required."),
    ("invalid_token", "Invalid or expired session."),
    ("forbidden", "You do not have access to this resource."),
    ("submission_not_found", "Submission not found."),
    ("offer_not_found", "Offer not found."),
    ("location_not_found", "City '{city}' not found."),
    ("location_already_exists", "City '{city}' already exists."),
    (
        "invalid_status_transition",
        "A submission in status '{from}' does not accept the '{action}' action.",
    ),
    ("ai_feature_disabled", "AI {feature} generation is disabled."),
    ("ai_daily_quota_exceeded", "The daily AI usage limit has been reached."),
    ("ai_monthly_quota_exceeded", "The monthly AI usage limit has been reached."),
    ("ai_not_configured", "The AI provider is not configured."),
    ("upstream_failure", "The external provider failed to process the request."),
    ("internal_error", "An unexpected error occurred."),
    // Mensagens de validação
    ("description_too_long", "The description must have at most 30 words."),
    ("city_required", "The city is required."),
    ("prompt_required", "The prompt is required."),
    ("limit_negative", "Limits cannot be negative."),
    ("email_required", "The email is required."),
    ("password_required", "The password is required."),
];

const PT: &[(&str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos."),
    ("invalid_argument", "Valor inválido ou ausente: {value}."),
    ("unknown_action", "Ação desconhecida '{value}'. Use 'approve' ou 'reject'."),
    ("invalid_date", "Data inválida '{value}'. Use AAAA-MM-DD."),
    ("invalid_credentials", "E-mail ou senha inválidos."),
    ("missing_session", "Autenticação necessária."),
    ("invalid_token", "Sessão inválida ou expirada."),
    ("forbidden", "Você não tem acesso a este recurso."),
    ("submission_not_found", "Submissão não encontrada."),
    ("offer_not_found", "Oferta não encontrada."),
    ("location_not_found", "Cidade '{city}' não encontrada."),
    ("location_already_exists", "A cidade '{city}' já existe."),
    (
        "invalid_status_transition",
        "Uma submissão com status '{from}' não aceita a ação '{action}'.",
    ),
    ("ai_feature_disabled", "A geração de {feature} por IA está desabilitada."),
    ("ai_daily_quota_exceeded", "O limite diário de uso de IA foi atingido."),
    ("ai_monthly_quota_exceeded", "O limite mensal de uso de IA foi atingido."),
    ("ai_not_configured", "O provedor de IA não está configurado."),
    ("upstream_failure", "O provedor externo falhou ao processar a requisição."),
    ("internal_error", "Ocorreu um erro inesperado."),
    ("description_too_long", "A descrição deve ter no máximo 30 palavras."),
    ("city_required", "A cidade é obrigatória."),
    ("prompt_required", "O prompt é obrigatório."),
    ("limit_negative", "Os limites não podem ser negativos."),
    ("email_required", "O e-mail é obrigatório."),
    ("password_required", "A senha é obrigatória."),
];

/// Catálogo de mensagens por idioma (en, pt).
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        messages.insert("en", EN.iter().copied().collect());
        messages.insert("pt", PT.iter().copied().collect());
        Self { messages }
    }

    /// Busca a mensagem no idioma pedido, cai para inglês e por fim devolve a própria chave.
    /// Placeholders `{nome}` são substituídos pelos argumentos.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        let template = self
            .messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(FALLBACK_LANG).and_then(|m| m.get(key)))
            .copied()
            .unwrap_or(key);

        args.iter().fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{}}}", name), value)
        })
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("de", "offer_not_found", &[]),
            "Offer not found."
        );
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("pt", "no_such_key", &[]), "no_such_key");
    }

    #[test]
    fn placeholders_are_filled() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("en", "location_already_exists", &[("city", "Lisbon")]),
            "City 'Lisbon' already exists."
        );
    }
}
