// handlers/public/auth/mod.rs - Session acquisition and teardown
//
// Routes:
//   GET /api/login/google, /api/login/github           -> provider consent page
//   GET /api/auth/google/callback, /api/auth/github/callback -> session cookie
//   GET /api/auth/mock-admin, /api/auth/mock/:user     -> development sessions
//   GET /api/auth/logout                               -> cookie cleared

pub mod logout;
pub mod mock;
pub mod oauth;

pub use logout::logout;
pub use mock::{mock_admin, mock_user};
pub use oauth::{github_callback, github_login, google_callback, google_login};
