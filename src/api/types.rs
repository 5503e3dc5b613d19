//! Shared types for the portal API layer.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::crypto::PBKDF2_ITERATIONS;
use crate::db;

/// Sessions expire this long after login.
pub const SESSION_TTL_SECS: u64 = 24 * 60 * 60;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the portal router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: PathBuf,
    pub sessions: Arc<Mutex<SessionRegistry>>,
    /// PBKDF2 work factor for newly hashed passwords.
    pub password_iterations: u32,
    schema_ready: Arc<AtomicBool>,
}

impl ApiContext {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            sessions: Arc::new(Mutex::new(SessionRegistry::new(Duration::from_secs(
                SESSION_TTL_SECS,
            )))),
            password_iterations: PBKDF2_ITERATIONS,
            schema_ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_password_iterations(mut self, iterations: u32) -> Self {
        self.password_iterations = iterations;
        self
    }

    /// Apply pending migrations once for this context and its clones.
    pub fn ensure_schema(&self) -> Result<(), db::DatabaseError> {
        if self.schema_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        let conn = db::connect(&self.db_path)?;
        let version = db::migrate(&conn)?;
        self.schema_ready.store(true, Ordering::Release);
        tracing::debug!(version, path = %self.db_path.display(), "Portal schema ready");
        Ok(())
    }

    /// One connection per request; SQLite handles cross-connection locking.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        self.ensure_schema()?;
        db::connect(&self.db_path).map_err(ApiError::from)
    }

    pub fn lock_sessions(&self) -> Result<std::sync::MutexGuard<'_, SessionRegistry>, ApiError> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock poisoned".into()))
    }
}

// ═══════════════════════════════════════════════════════════
// Customer context: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated customer, injected into request extensions by the auth
/// middleware after successful token validation.
#[derive(Debug, Clone)]
pub struct CustomerContext {
    pub customer_id: Uuid,
    pub med_id: String,
    pub token_hash: [u8; 32],
}

// ═══════════════════════════════════════════════════════════
// Session registry
// ═══════════════════════════════════════════════════════════

#[derive(Debug)]
struct SessionEntry {
    customer_id: Uuid,
    med_id: String,
    expires: Instant,
}

/// In-memory bearer sessions keyed by token hash. Raw tokens are never kept.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<[u8; 32], SessionEntry>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Issue a fresh token for a customer. Returns the raw token.
    pub fn issue(&mut self, customer_id: Uuid, med_id: &str) -> String {
        // Periodic cleanup when the registry grows large
        if self.sessions.len() > 1000 {
            self.cleanup();
        }
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            SessionEntry {
                customer_id,
                med_id: med_id.to_string(),
                expires: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Resolve a raw bearer token. Expired sessions are dropped.
    pub fn validate(&mut self, token: &str) -> Option<CustomerContext> {
        let token_hash = hash_token(token);
        let expired = match self.sessions.get(&token_hash) {
            None => return None,
            Some(entry) => Instant::now() >= entry.expires,
        };
        if expired {
            self.sessions.remove(&token_hash);
            return None;
        }
        self.sessions.get(&token_hash).map(|entry| CustomerContext {
            customer_id: entry.customer_id,
            med_id: entry.med_id.clone(),
            token_hash,
        })
    }

    /// Revoke by token hash. Returns `true` if a session was removed.
    pub fn revoke(&mut self, token_hash: &[u8; 32]) -> bool {
        self.sessions.remove(token_hash).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn cleanup(&mut self) {
        let now = Instant::now();
        self.sessions.retain(|_, entry| entry.expires > now);
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
