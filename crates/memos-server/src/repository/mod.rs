//! Local user persistence used by DooTask sign-in.

mod error;
mod memory;
mod traits;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::MemoryUserRepository;
pub use traits::{NewUser, StoredUser, UserRepository, UserUpdate};
