//! Signed session tokens.
//!
//! A session is an HS256 token carrying the caller's identity and role. It is
//! delivered as an HTTP-only cookie and also accepted as a bearer token, and
//! is reconstructed on every request without touching the store.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jwt_simple::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{config::SessionConfig, models::Role};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionPayload {
    name: String,
    email: String,
    role: Role,
}

/// Identity resolved from a valid session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionClaims {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl SessionClaims {
    pub fn can_manage_admins(&self) -> bool {
        self.role.can_manage_admins()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    #[schema(example = "Grace Achieng")]
    pub name: String,
    #[schema(example = "pm@chedcom.org")]
    pub email: String,
    pub role: Role,
    pub can_manage_admins: bool,
}

impl From<&SessionClaims> for SessionUser {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            id: claims.id,
            name: claims.name.clone(),
            email: claims.email.clone(),
            role: claims.role,
            can_manage_admins: claims.can_manage_admins(),
        }
    }
}

#[derive(Clone)]
pub struct SessionKeys {
    key: HS256Key,
    pub max_age_secs: u64,
    pub cookie_secure: bool,
}

impl SessionKeys {
    /// Without a secret a random key is generated, so sessions die with the
    /// process.
    pub fn new(secret: Option<&str>, max_age_secs: u64, cookie_secure: bool) -> Self {
        let key = match secret {
            Some(secret) => HS256Key::from_bytes(secret.as_bytes()),
            None => {
                warn!("SESSION_SECRET not set, using a random per-process session key");
                HS256Key::generate()
            }
        };

        Self {
            key,
            max_age_secs,
            cookie_secure,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.secret.as_deref(),
            config.max_age_secs,
            config.cookie_secure,
        )
    }

    pub fn issue(&self, claims: &SessionClaims) -> Result<String, jwt_simple::Error> {
        let payload = SessionPayload {
            name: claims.name.clone(),
            email: claims.email.clone(),
            role: claims.role,
        };

        let claims = Claims::with_custom_claims(payload, Duration::from_secs(self.max_age_secs))
            .with_subject(claims.id.to_string());

        self.key.authenticate(claims)
    }

    /// Fails closed: any malformed, expired or foreign token yields `None`.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        let token_data = self.key.verify_token::<SessionPayload>(token, None).ok()?;
        let id = token_data.subject.as_deref().and_then(|s| Uuid::parse_str(s).ok())?;

        Some(SessionClaims {
            id,
            name: token_data.custom.name,
            email: token_data.custom.email,
            role: token_data.custom.role,
        })
    }

    /// Looks for the session cookie first, then an `Authorization: Bearer`
    /// header.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<SessionClaims> {
        let jar = CookieJar::from_headers(headers);
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            return self.verify(cookie.value());
        }

        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))?;
        self.verify(token)
    }

    pub fn cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .max_age(time::Duration::seconds(self.max_age_secs as i64))
            .build()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .max_age(time::Duration::ZERO)
            .build()
    }
}
