// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Claims, ADMIN_ROLE},
};

const SESSION_DAYS: i64 = 7;

// Um único administrador, definido na configuração.
#[derive(Clone)]
pub struct AuthService {
    admin_email: String,
    admin_password_hash: String,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(admin_email: String, admin_password_hash: String, jwt_secret: String) -> Self {
        Self {
            admin_email,
            admin_password_hash,
            jwt_secret,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        if !email.trim().eq_ignore_ascii_case(&self.admin_email) {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = self.admin_password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            tracing::warn!("Tentativa de login com senha inválida para {}", email);
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("🔑 Admin {} autenticado", self.admin_email);
        self.create_token(&self.admin_email)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    pub(crate) fn create_token(&self, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(SESSION_DAYS);

        let claims = Claims {
            sub: email.to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        // Custo mínimo para o teste não ficar lento.
        let hash = bcrypt::hash("segredo", 4).unwrap();
        AuthService::new("admin@ofertas.com".into(), hash, "jwt-test-secret".into())
    }

    #[tokio::test]
    async fn valid_credentials_issue_an_admin_token() {
        let auth = service();
        let token = auth.login("Admin@Ofertas.com", "segredo").await.unwrap();
        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "admin@ofertas.com");
        assert_eq!(claims.role, ADMIN_ROLE);
    }

    #[tokio::test]
    async fn wrong_password_or_email_is_rejected() {
        let auth = service();
        assert!(matches!(
            auth.login("admin@ofertas.com", "errada").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("outro@ofertas.com", "segredo").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_invalid() {
        let other = AuthService::new("a".into(), String::new(), "outro".into());
        let token = other.create_token("a").unwrap();
        assert!(matches!(
            service().validate_token(&token),
            Err(AppError::InvalidToken)
        ));
    }
}
