//! Session context and opaque bearer tokens.
//!
//! The data services perform no authorization themselves; handlers gate write
//! operations on an admin session obtained here. Sessions live in process
//! memory and disappear on restart.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Reader,
    Admin,
}

#[derive(Clone, Debug)]
pub struct SessionContext {
    pub token: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthService {
    admin_key: Arc<str>,
    sessions: Arc<RwLock<HashMap<String, SessionContext>>>,
}

impl AuthService {
    pub fn new(admin_key: impl Into<String>) -> Self {
        Self {
            admin_key: Arc::from(admin_key.into()),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Exchange the bootstrap admin key for an admin session token.
    pub fn login(&self, key: &str) -> Result<SessionContext, CoreError> {
        if key != self.admin_key.as_ref() {
            return Err(CoreError::Unauthorized("invalid credentials".to_string()));
        }
        Ok(self.issue(Role::Admin))
    }

    pub fn issue(&self, role: Role) -> SessionContext {
        let context = SessionContext {
            token: format!("mh_{}", Uuid::new_v4().simple()),
            role,
            issued_at: Utc::now(),
        };
        self.sessions
            .write()
            .expect("session table poisoned")
            .insert(context.token.clone(), context.clone());
        context
    }

    pub fn verify(&self, token: &str) -> Option<SessionContext> {
        self.sessions
            .read()
            .expect("session table poisoned")
            .get(token)
            .cloned()
    }

    /// Tear down a session. Returns false if the token was already gone.
    pub fn logout(&self, token: &str) -> bool {
        self.sessions
            .write()
            .expect("session table poisoned")
            .remove(token)
            .is_some()
    }

    /// Resolve the bearer token from request headers into an admin session.
    pub fn require_admin(&self, headers: &HeaderMap) -> Result<SessionContext, CoreError> {
        let token = bearer_token(headers)
            .ok_or_else(|| CoreError::Unauthorized("missing bearer token".to_string()))?;
        let context = self
            .verify(token)
            .ok_or_else(|| CoreError::Unauthorized("invalid or expired token".to_string()))?;
        if context.role != Role::Admin {
            return Err(CoreError::Forbidden(
                "administrator role required".to_string(),
            ));
        }
        Ok(context)
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
