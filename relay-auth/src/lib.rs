//! # relay-auth
//!
//! OAuth 2.0 plumbing for the authorization-code relay:
//! - Pending CSRF state tracking with time-based expiry
//! - A background sweeper that evicts abandoned authorization attempts
//! - The identity provider boundary (`oauth::Provider`) and its Google implementation
//! - Token types returned from code exchange and refresh
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_auth::oauth::{providers::google, PendingStateCache, Provider, StateSweeper};
//!
//! let cache = PendingStateCache::new();
//! let token = cache.begin("https://app.example/dash".to_string(), "1.2.3.4".to_string());
//! let url = provider.authorization_url(&token);
//! ```

pub mod error;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
