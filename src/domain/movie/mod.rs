//! Movie domain

mod entity;

pub use entity::{Movie, NewMovie};
