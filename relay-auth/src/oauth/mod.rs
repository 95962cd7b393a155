//! OAuth 2.0 authorization-code infrastructure.
//!
//! Tracks pending CSRF state between the authorization redirect and the
//! provider's callback, and defines the provider boundary for code exchange,
//! user info and refresh.

mod provider;
mod state;
mod sweeper;

pub mod providers;
pub mod token;

pub use provider::{Provider, ProviderKind, UserInfo};
pub use state::{
    sweep_expired, PendingAuthState, PendingStateCache, PendingStates, DEFAULT_STATE_TTL_SECS,
};
pub use sweeper::{StateSweeper, DEFAULT_SWEEP_INTERVAL};
