//! OAuth token types returned by code exchange and refresh.

mod tokens;

pub use tokens::{TokenResponse, Tokens};
