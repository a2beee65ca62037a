//! Director domain

mod entity;

pub use entity::{Director, NewDirector};
