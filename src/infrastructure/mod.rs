//! Infrastructure layer - storage, credentials, tokens and services

pub mod auth;
pub mod director;
pub mod logging;
pub mod movie;
pub mod services;
pub mod storage;
pub mod user;
