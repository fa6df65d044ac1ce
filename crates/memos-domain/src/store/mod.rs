//! User store: client-side user state kept in sync with the remote
//! services.
//!
//! State changes are published through a `tokio::sync::watch` channel, so
//! any number of views can [`subscribe`](UserStore::subscribe) and re-render
//! when it changes.

mod bootstrap;
mod state;
mod user_store;

pub use bootstrap::{initialize_user_store, BootstrapContext, BootstrapOutcome};
pub use state::{next_state_id, UserState};
pub use user_store::UserStore;
