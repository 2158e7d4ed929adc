//! Social-aid programs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use common::{
    protocol::{CreateProgramRequest, UpdateProgramRequest},
    FieldErrors, Validator,
};

use super::MAX_TEXT_BYTES;

const MAX_DESCRIPTION_BYTES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Program {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProgram {
    pub name: String,
    pub category: String,
    pub description: String,
}

impl NewProgram {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        validate_fields(&self.name, &self.category, &self.description)
    }
}

impl From<CreateProgramRequest> for NewProgram {
    fn from(req: CreateProgramRequest) -> Self {
        Self {
            name: req.name,
            category: req.category,
            description: req.description,
        }
    }
}

/// Partial update: `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl ProgramPatch {
    /// Merge into `program` and validate the result.
    pub fn apply(self, program: &mut Program) -> Result<(), FieldErrors> {
        if let Some(name) = self.name {
            program.name = name;
        }
        if let Some(category) = self.category {
            program.category = category;
        }
        if let Some(description) = self.description {
            program.description = description;
        }
        validate_fields(&program.name, &program.category, &program.description)
    }
}

impl From<UpdateProgramRequest> for ProgramPatch {
    fn from(req: UpdateProgramRequest) -> Self {
        Self {
            name: req.name,
            category: req.category,
            description: req.description,
        }
    }
}

fn validate_fields(name: &str, category: &str, description: &str) -> Result<(), FieldErrors> {
    let mut v = Validator::new();
    v.check_text(name, "name", MAX_TEXT_BYTES);
    v.check_text(category, "category", MAX_TEXT_BYTES);
    v.check_text(description, "description", MAX_DESCRIPTION_BYTES);
    v.finish()
}
