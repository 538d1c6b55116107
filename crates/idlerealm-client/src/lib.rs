//! Idlerealm Client - Backend access for the player and admin screens
//!
//! - [`ApiClient`]: bearer-authenticated JSON requests with the global
//!   logout on 401/403
//! - [`HttpAdminApi`]: the admin tables, implementing
//!   [`idlerealm_admin::AdminApi`]
//! - [`PlayerApi`]: profile fetch and player actions
//! - [`StateSync`]: polling that never lets an older response win
//! - [`RepeatingTask`]: hold-to-repeat with a cancellable handle
//!
//! Configuration is a RON file:
//!
//! ```ron
//! (
//!     base_url: "https://idlerealm.example",
//!     token_path: Some("/home/me/.idlerealm/token"),
//!     poll_interval_ms: 1000,
//! )
//! ```

pub mod admin;
pub mod auth;
pub mod config;
mod error;
pub mod http;
pub mod player;
pub mod poller;
pub mod repeat;

pub use admin::HttpAdminApi;
pub use auth::{SessionEvent, TokenStore};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::ApiClient;
pub use player::PlayerApi;
pub use poller::{Snapshot, StateSync};
pub use repeat::RepeatingTask;
