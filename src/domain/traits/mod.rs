//! Contracts shared by every entity collection

mod repository;

pub use repository::{parse_numeric_id, Entity, EntityStream, Repository};
