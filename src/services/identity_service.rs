use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::account_dto::LoginResponse;
use crate::error::{Error, Result};
use crate::models::principal::{Principal, PrincipalKind};
use crate::services::admin_service::AdminService;
use crate::services::client_service::ClientService;
use crate::utils::crypto::verify_password;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid or expired session token")]
    InvalidToken,
    #[error("Account is inactive or no longer exists")]
    InactiveOrMissingAccount,
    #[error("Unrecognized principal type '{0}'")]
    UnrecognizedPrincipalType(String),
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Unauthenticated(err.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    iat: i64,
    exp: i64,
}

/// HS256 signing and verification of session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(ttl_hours.max(1)),
        }
    }

    pub fn issue(&self, subject: Uuid, kind: PrincipalKind) -> Result<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            sub: subject.to_string(),
            kind: Some(kind.as_str().to_string()),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| Error::Internal(format!("Failed to sign session token: {}", e)))?;
        Ok((token, expires_at))
    }

    /// Verifies signature and expiry, then reads the subject and role tag.
    pub fn decode(&self, token: &str) -> std::result::Result<(Uuid, PrincipalKind), AuthError> {
        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        let subject = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let raw_kind = data.claims.kind.ok_or(AuthError::InvalidToken)?;
        let kind = raw_kind
            .parse::<PrincipalKind>()
            .map_err(|_| AuthError::UnrecognizedPrincipalType(raw_kind.clone()))?;
        Ok((subject, kind))
    }
}

#[derive(Clone)]
pub struct IdentityService {
    keys: SessionKeys,
    admins: AdminService,
    clients: ClientService,
}

impl IdentityService {
    pub fn new(keys: SessionKeys, admins: AdminService, clients: ClientService) -> Self {
        Self {
            keys,
            admins,
            clients,
        }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Resolves a bearer token to a live principal. Inactive or deleted
    /// accounts are rejected even while their token is unexpired.
    pub async fn authenticate(&self, token: &str) -> Result<Principal> {
        let (subject, kind) = self.keys.decode(token)?;
        let principal = match kind {
            PrincipalKind::Admin => self
                .admins
                .find_by_id(subject)
                .await?
                .filter(|admin| admin.is_active)
                .map(|admin| Principal::Admin(admin.principal())),
            PrincipalKind::Client => self
                .clients
                .find_by_id(subject)
                .await?
                .filter(|client| client.is_active)
                .map(|client| Principal::Client(client.principal())),
        };
        principal.ok_or_else(|| AuthError::InactiveOrMissingAccount.into())
    }

    pub async fn login_admin(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let admin = self
            .admins
            .find_by_email(email)
            .await?
            .filter(|admin| verify_password(password, &admin.password_hash))
            .ok_or_else(invalid_credentials)?;
        if !admin.is_active {
            return Err(Error::Unauthenticated("Account is disabled".into()));
        }

        stamp_login(self.admins.record_login(admin.id).await, admin.id);
        self.session_for(Principal::Admin(admin.principal()))
    }

    pub async fn login_client(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let client = self
            .clients
            .find_by_email(email)
            .await?
            .filter(|client| verify_password(password, &client.password_hash))
            .ok_or_else(invalid_credentials)?;
        if !client.is_active {
            return Err(Error::Unauthenticated("Account is disabled".into()));
        }

        stamp_login(self.clients.record_login(client.id).await, client.id);
        self.session_for(Principal::Client(client.principal()))
    }

    fn session_for(&self, principal: Principal) -> Result<LoginResponse> {
        let (token, expires_at) = self.keys.issue(principal.id(), principal.kind())?;
        Ok(LoginResponse {
            token,
            token_type: "Bearer",
            expires_at,
            principal,
        })
    }

    /// Best-effort activity stamp; failures are logged and never reach the
    /// request that triggered them.
    pub fn spawn_touch(&self, principal: &Principal) {
        let admins = self.admins.clone();
        let clients = self.clients.clone();
        let id = principal.id();
        let kind = principal.kind();
        tokio::spawn(async move {
            let outcome = match kind {
                PrincipalKind::Admin => admins.touch_last_seen(id).await,
                PrincipalKind::Client => clients.touch_last_seen(id).await,
            };
            if let Err(e) = outcome {
                tracing::debug!(error = %e, principal_id = %id, "Failed to record last-seen time");
            }
        });
    }
}

/// The login stamp never decides whether a login succeeds.
fn stamp_login(outcome: Result<()>, id: Uuid) -> bool {
    match outcome {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, account_id = %id, "Failed to record login time");
            false
        }
    }
}

fn invalid_credentials() -> Error {
    Error::Unauthenticated("Invalid email or password".into())
}
