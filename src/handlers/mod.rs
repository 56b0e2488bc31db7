// handlers/mod.rs - Two tiers of HTTP handlers
//
// public:    no session required (OAuth, mock login, logout)
// protected: session cookie required (lists, items, invites, auth/me)

pub mod protected;
pub mod public;

pub(crate) mod utils;
