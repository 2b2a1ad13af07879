// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Papel do operador dentro do sistema. Só ADMIN pode mexer nas
// configurações do Tiny e excluir pickups em massa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Operador,
}

// Estrutura de dados ("claims") dentro do JWT emitido pelo provedor de
// identidade. O backend só valida e lê, nunca emite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub email: String,
    pub role: Role,
    pub exp: usize, // Expiration time (quando o token expira)
}
