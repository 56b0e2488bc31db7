// handlers/protected/mod.rs - Handlers that resolve the caller from the session cookie
//
// Each handler validates its input first, then authenticates, then applies the
// ownership rules in auth::rules before touching the store.

pub mod auth;
pub mod invites;
pub mod items;
pub mod lists;
