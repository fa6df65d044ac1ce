//! memos-domain: Client-side state layer for memos
//!
//! This crate contains the client-side logic including:
//! - Request deduplication for concurrent identical reads
//! - The user store and its session bootstrap sequence
//! - Remote service traits standing in for the RPC clients
//! - Base path and DooTask host helpers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                memos-domain                  │
//! ├─────────────────────────────────────────────┤
//! │  dedup/     - In-flight request collapsing  │
//! │  model/     - Users, settings, stats        │
//! │  services   - Remote service traits         │
//! │  store/     - User store & bootstrap        │
//! │  web/       - Base path & DooTask helpers   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod dedup;
pub mod error;
pub mod model;
pub mod services;
pub mod store;
pub mod web;

// Re-export commonly used types at the crate root
pub use dedup::{RequestDeduplicator, RequestKey};
pub use error::{ServiceError, ServiceResult, StoreError, StoreResult};
pub use services::Services;
pub use store::{initialize_user_store, BootstrapContext, BootstrapOutcome, UserState, UserStore};
