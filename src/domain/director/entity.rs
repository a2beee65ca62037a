//! Director entity and draft

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::traits::{parse_numeric_id, Entity};
use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Director {
    id: i64,
    name: String,
}

impl Director {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn from_draft(id: i64, draft: NewDirector) -> Self {
        Self::new(id, draft.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Director {
    type Id = i64;
    type Draft = NewDirector;

    const KIND: &'static str = "director";

    fn id(&self) -> &i64 {
        &self.id
    }

    fn parse_id(raw: &str) -> Result<i64, DomainError> {
        parse_numeric_id(Self::KIND, raw)
    }
}

/// Request body for creating a director
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewDirector {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_director_draft_validation() {
        let ok = NewDirector {
            name: "Andrei Tarkovsky".to_string(),
        };
        let empty = NewDirector {
            name: String::new(),
        };

        assert!(ok.validate().is_ok());
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_director_parse_id() {
        assert_eq!(Director::parse_id("12").unwrap(), 12);
        assert!(Director::parse_id("twelve").is_err());
    }
}
