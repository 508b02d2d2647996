//! Class management.

use chrono::Utc;
use quotebook_common::{AppResult, id::IdGenerator};
use quotebook_db::entities::{class, user};
use quotebook_db::repositories::ClassRepository;
use sea_orm::Set;
use tracing::info;

use crate::permission;
use crate::prepare::{self, PreparedClass};
use crate::validate;

/// Service for classes. Classes are created by admins and immutable after
/// that; everything else is lookup.
#[derive(Clone)]
pub struct ClassService {
    class_repo: ClassRepository,
    id_gen: IdGenerator,
}

impl ClassService {
    /// Create a new class service.
    #[must_use]
    pub const fn new(class_repo: ClassRepository) -> Self {
        Self {
            class_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a class. Admin only; a duplicate name is a validation failure.
    pub async fn create(
        &self,
        actor: Option<&user::Model>,
        name: String,
    ) -> AppResult<PreparedClass> {
        let actor = permission::require_role(actor, &user::Role::Admin)?;
        validate::class_name(&name)?;

        let model = class::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            created_by: Set(actor.id.clone()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.class_repo.create(model).await?;
        info!(class_id = %created.id, name = %created.name, admin = %actor.id, "Created class");

        Ok(prepare::prepare_class(&created))
    }

    /// Fetch one class.
    pub async fn get(&self, id: &str) -> AppResult<PreparedClass> {
        let class = self.class_repo.get_by_id(id).await?;
        Ok(prepare::prepare_class(&class))
    }

    /// List classes, optionally by case-insensitive name substring.
    pub async fn search(&self, name: Option<&str>) -> AppResult<Vec<PreparedClass>> {
        let classes = self.class_repo.search(name).await?;
        Ok(classes.iter().map(prepare::prepare_class).collect())
    }
}
