// Identity attached to a request once its bearer token has been verified

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Rol, Usuario};

/// Authenticated user information, loaded from the database after JWT validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub rol: Rol,
    pub email: String,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.rol == Rol::Admin
    }
}

impl From<&Usuario> for AuthenticatedUser {
    fn from(usuario: &Usuario) -> Self {
        Self {
            id: usuario.id,
            rol: usuario.rol,
            email: usuario.email.clone(),
        }
    }
}
