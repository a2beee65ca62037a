//! Domain layer - entities, request context and the repository contract

pub mod context;
pub mod director;
pub mod error;
pub mod movie;
pub mod traits;
pub mod user;

pub use context::RequestContext;
pub use director::{Director, NewDirector};
pub use error::DomainError;
pub use movie::{Movie, NewMovie};
pub use traits::{Entity, EntityStream, Repository};
pub use user::{HashedCredential, Login, NewUser, User};
