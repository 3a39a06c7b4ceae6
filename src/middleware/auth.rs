// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::{Claims, ADMIN_ROLE},
};

pub const SESSION_COOKIE: &str = "admin_session";

// Token da sessão: cabeçalho Bearer primeiro, depois o cookie.
async fn session_token<S>(parts: &mut Parts, state: &S) -> Option<String>
where
    S: Send + Sync,
{
    if let Ok(TypedHeader(Authorization(bearer))) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
    {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

fn authorize(app_state: &AppState, token: Option<String>) -> Result<Claims, AppError> {
    let token = token.ok_or(AppError::MissingSession)?;
    let claims = app_state.auth_service.validate_token(&token)?;
    if claims.role != ADMIN_ROLE {
        return Err(AppError::Forbidden);
    }
    Ok(claims)
}

/// Exige uma sessão de administrador válida.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Claims);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = session_token(parts, state).await;

        authorize(&app_state, token).map(AdminSession).map_err(|e| {
            let locale = Locale::from_headers(&parts.headers);
            e.to_api_error(&locale, &app_state.i18n_store)
        })
    }
}

/// Sessão opcional: rotas públicas que mostram mais dados ao admin.
/// Token ausente ou inválido vira visitante anônimo.
#[derive(Debug, Clone)]
pub struct MaybeAdmin(pub Option<Claims>);

impl MaybeAdmin {
    pub fn is_admin(&self) -> bool {
        self.0.is_some()
    }
}

impl<S> FromRequestParts<S> for MaybeAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = session_token(parts, state).await;
        Ok(MaybeAdmin(authorize(&app_state, token).ok()))
    }
}
