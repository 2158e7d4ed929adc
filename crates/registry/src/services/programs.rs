//! Program catalogue.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::bounded;
use crate::error::{Duplicate, Entity, RegistryError};
use crate::models::{NewProgram, Program, ProgramPatch};
use crate::store::{constraints, Store, StoreError};

#[derive(Clone)]
pub struct ProgramService {
    store: Arc<dyn Store>,
    timeout: Duration,
}

fn map_program_error(err: StoreError) -> RegistryError {
    match err {
        StoreError::NoRows => RegistryError::NotFound(Entity::Program),
        e if e.violates(constraints::PROGRAMS_NAME_KEY) => {
            RegistryError::Conflict(Duplicate::ProgramName)
        }
        e => e.into(),
    }
}

impl ProgramService {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// # Errors
    ///
    /// [`RegistryError::Conflict`] if the name is taken.
    pub async fn create(&self, new: NewProgram) -> Result<Program, RegistryError> {
        new.validate()?;
        let program = bounded(self.timeout, async {
            self.store.insert_program(&new).await.map_err(map_program_error)
        })
        .await?;
        info!(program_id = program.id, "program created");
        Ok(program)
    }

    pub async fn get(&self, id: i32) -> Result<Program, RegistryError> {
        bounded(self.timeout, async {
            self.store.get_program_by_id(id).await.map_err(map_program_error)
        })
        .await
    }

    /// Apply `patch` to program `id`.
    ///
    /// The merged record is validated as a whole, so a patch cannot blank a
    /// required field.
    pub async fn update(&self, id: i32, patch: ProgramPatch) -> Result<Program, RegistryError> {
        let mut program = self.get(id).await?;
        patch.apply(&mut program)?;
        let updated_at = bounded(self.timeout, async {
            self.store
                .update_program_by_id(&program)
                .await
                .map_err(map_program_error)
        })
        .await?;
        program.updated_at = updated_at;
        info!(program_id = program.id, "program updated");
        Ok(program)
    }
}
