//! memos-server: Server-side pieces of the memos DooTask integration
//!
//! This crate contains:
//! - Configuration loading (YAML file + `MEMOS_` environment overrides)
//! - Instance profile resolution (mode, data directory, DSN, base path)
//! - DooTask token sign-in with local user provisioning
//! - Frontend routing rules for the embedded web app
//! - Logging setup
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  memos-server                    │
//! ├─────────────────────────────────────────────────┤
//! │  config.rs      - Configuration management      │
//! │  profile.rs     - Resolved instance profile     │
//! │  dootask/       - DooTask sign-in               │
//! │    client.rs         - User info API client     │
//! │    auth.rs           - Provisioning and sync    │
//! │    avatar.rs         - Avatar URL normalization │
//! │  repository/    - Local user storage            │
//! │  frontend.rs    - SPA routes and caching        │
//! │  observability/ - Logging                       │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dootask;
pub mod frontend;
pub mod observability;
pub mod profile;
pub mod repository;

// Re-exports for convenience
pub use config::{ConfigLoadError, ServerConfig};
pub use dootask::{DooTaskAuthenticator, DooTaskClient, DooTaskError};
pub use frontend::{FrontendRoutes, Route};
pub use profile::{Mode, Profile};
pub use repository::{MemoryUserRepository, UserRepository};
