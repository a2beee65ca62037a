//! Movie entity and draft

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::traits::{parse_numeric_id, Entity};
use crate::domain::DomainError;

/// A catalogued film
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    id: i64,
    title: String,
    year: i32,
    director_id: Option<i64>,
}

impl Movie {
    pub fn new(id: i64, title: impl Into<String>, year: i32, director_id: Option<i64>) -> Self {
        Self {
            id,
            title: title.into(),
            year,
            director_id,
        }
    }

    /// Assign a store key to a validated draft
    pub fn from_draft(id: i64, draft: NewMovie) -> Self {
        Self::new(id, draft.title, draft.year, draft.director_id)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn director_id(&self) -> Option<i64> {
        self.director_id
    }
}

impl Entity for Movie {
    type Id = i64;
    type Draft = NewMovie;

    const KIND: &'static str = "movie";

    fn id(&self) -> &i64 {
        &self.id
    }

    fn parse_id(raw: &str) -> Result<i64, DomainError> {
        parse_numeric_id(Self::KIND, raw)
    }
}

/// Request body for creating a movie
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMovie {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,

    #[validate(range(min = 1888, max = 2100, message = "year must be between 1888 and 2100"))]
    pub year: i32,

    #[serde(default)]
    #[validate(range(min = 1, message = "director_id must be positive"))]
    pub director_id: Option<i64>,
}
