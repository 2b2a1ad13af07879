// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Claims, Role},
};

// O middleware em si: valida o Bearer emitido pelo provedor de identidade
// e deixa as claims nos "extensions" da requisição.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let claims = validar_token(token, &app_state.jwt_secret)?;
            request.extensions_mut().insert(claims);
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::InvalidToken)
}

pub fn validar_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let dados = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(dados.claims)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Clone)]
pub struct AuthenticatedUser(pub Claims);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

/// Operações restritas (mexer no environment, excluir pickups em massa)
/// exigem ADMIN.
pub fn exigir_admin(user: &AuthenticatedUser) -> Result<(), AppError> {
    if user.0.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::AcessoNegado)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    use super::*;

    fn token_para(role: Role, secret: &str) -> String {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "operador@example.com".to_string(),
            role,
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn token_valido_devolve_as_claims() {
        let token = token_para(Role::Operador, "segredo");
        let claims = validar_token(&token, "segredo").unwrap();
        assert_eq!(claims.email, "operador@example.com");
        assert_eq!(claims.role, Role::Operador);
    }

    #[test]
    fn segredo_errado_e_rejeitado() {
        let token = token_para(Role::Operador, "segredo");
        assert!(validar_token(&token, "outro-segredo").is_err());
    }

    #[test]
    fn exigir_admin_barra_operador() {
        let token = token_para(Role::Operador, "s");
        let user = AuthenticatedUser(validar_token(&token, "s").unwrap());
        assert!(matches!(exigir_admin(&user), Err(AppError::AcessoNegado)));

        let token = token_para(Role::Admin, "s");
        let admin = AuthenticatedUser(validar_token(&token, "s").unwrap());
        assert!(exigir_admin(&admin).is_ok());
    }
}
