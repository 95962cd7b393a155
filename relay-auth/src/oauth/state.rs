//! CSRF state tracking for in-flight OAuth authorization attempts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use log::*;
use rand::Rng;

/// Age after which an unconsumed state is considered abandoned.
pub const DEFAULT_STATE_TTL_SECS: i64 = 600;

/// Pending state records keyed by their CSRF token.
pub type PendingStates = HashMap<String, PendingAuthState>;

/// One record per authorization attempt that has not reached its callback yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAuthState {
    /// Opaque random identifier sent to the provider as the `state` parameter.
    pub token: String,
    /// When the attempt began. Only used to compute expiry.
    pub created_at: DateTime<Utc>,
    /// Where to send the caller once the callback succeeds.
    pub return_url: String,
    /// Address of the request that began the flow. Diagnostic only.
    pub origin_address: String,
}

impl PendingAuthState {
    /// Age of this record at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }
}

/// In-memory cache of pending CSRF state tokens with expiration.
///
/// A token is removed the first time it is consumed, so a replayed callback
/// never validates twice. Tokens that are never consumed are evicted by
/// [`PendingStateCache::sweep`], normally driven by a
/// [`StateSweeper`](super::StateSweeper).
#[derive(Clone)]
pub struct PendingStateCache {
    states: Arc<Mutex<PendingStates>>,
    ttl: Duration,
}

impl PendingStateCache {
    /// Create a new cache with the default TTL of 10 minutes.
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_STATE_TTL_SECS))
    }

    /// Create a new cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            states: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// The maximum age a pending state may reach before it is rejected.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Begin tracking a new authorization attempt.
    ///
    /// # Arguments
    ///
    /// * `return_url` - Where to redirect the caller after a successful callback
    /// * `origin_address` - Address of the initiating request, kept for logging
    ///
    /// # Returns
    ///
    /// The generated state token to embed in the authorization request.
    pub fn begin(&self, return_url: String, origin_address: String) -> String {
        self.begin_at(return_url, origin_address, Utc::now())
    }

    /// Same as [`begin`](Self::begin) with an explicit creation time.
    pub fn begin_at(
        &self,
        return_url: String,
        origin_address: String,
        created_at: DateTime<Utc>,
    ) -> String {
        let mut states = self.lock();

        let token = loop {
            let candidate = Self::generate_token();
            if !states.contains_key(&candidate) {
                break candidate;
            }
        };

        debug!("Tracking OAuth state for request from {origin_address}");

        states.insert(
            token.clone(),
            PendingAuthState {
                token: token.clone(),
                created_at,
                return_url,
                origin_address,
            },
        );

        token
    }

    /// Look up and remove the record for `token`.
    ///
    /// Returns `None` when the token was never issued, was already consumed,
    /// or has expired. Callers cannot tell these cases apart.
    pub fn consume(&self, token: &str) -> Option<PendingAuthState> {
        self.consume_at(token, Utc::now())
    }

    /// Same as [`consume`](Self::consume) evaluated at `now`.
    pub fn consume_at(&self, token: &str, now: DateTime<Utc>) -> Option<PendingAuthState> {
        // Removal happens regardless of age so an expired token is gone even
        // if the sweeper has not run yet.
        let state = self.lock().remove(token)?;

        if state.age(now) > self.ttl {
            return None;
        }
        Some(state)
    }

    /// Evict every record older than the TTL at `now`.
    ///
    /// # Returns
    ///
    /// Number of records removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut states = self.lock();
        sweep_expired(&mut states, now, self.ttl)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, PendingStates> {
        // Every mutation is a single HashMap call, so a poisoned map is still consistent.
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate a cryptographically random state token.
    fn generate_token() -> String {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        hex::encode(random_bytes)
    }
}

impl Default for PendingStateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove every record whose age at `now` exceeds `max_age`.
///
/// Returns the number of records removed.
pub fn sweep_expired(states: &mut PendingStates, now: DateTime<Utc>, max_age: Duration) -> usize {
    let before = states.len();
    states.retain(|_, state| state.age(now) <= max_age);
    before - states.len()
}
