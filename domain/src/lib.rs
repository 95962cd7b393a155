//! Flow orchestration for the OAuth relay.
//!
//! `web` calls into this crate and never touches `relay-auth` error types
//! directly; everything it needs is re-exported here.
pub use relay_auth::oauth::token::Tokens;
pub use relay_auth::oauth::{PendingStateCache, Provider, StateSweeper, UserInfo};

pub mod error;
pub mod oauth_flow;
