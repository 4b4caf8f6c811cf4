//! Accounts, session tokens and route protection.
//!
//! Sessions are stateless HS256 JWTs carried in an http-only `token` cookie
//! (or a Bearer header for non-browser callers).

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod token;
