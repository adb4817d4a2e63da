use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};

string_enum! {
    pub enum AdminRole {
        SuperAdmin => "super_admin",
        Admin => "admin",
        Moderator => "moderator",
    }
}

string_enum! {
    /// Role tag carried in session tokens and checked by route guards.
    pub enum PrincipalKind {
        Admin => "admin",
        Client => "client",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminPrincipal {
    pub id: Uuid,
    pub role: AdminRole,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientPrincipal {
    pub id: Uuid,
    pub is_active: bool,
}

/// Actor resolved from a session token, fixed for the lifetime of a request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Principal {
    Admin(AdminPrincipal),
    Client(ClientPrincipal),
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::Admin(admin) => admin.id,
            Principal::Client(client) => client.id,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::Admin(_) => PrincipalKind::Admin,
            Principal::Client(_) => PrincipalKind::Client,
        }
    }
}

/// Route guard decision. A missing principal is a 401, a principal with the
/// wrong role tag is a 403.
pub fn require(principal: Option<&Principal>, kind: PrincipalKind) -> Result<&Principal> {
    let principal = principal.ok_or_else(|| {
        Error::Unauthenticated("Authentication required, please log in again".into())
    })?;
    if principal.kind() != kind {
        return Err(Error::Forbidden(format!(
            "This operation requires the {} role",
            kind
        )));
    }
    Ok(principal)
}
