//! Person (quote originator) management.

use chrono::Utc;
use quotebook_common::{AppResult, id::IdGenerator};
use quotebook_db::entities::{person::{self, PersonType}, user};
use quotebook_db::repositories::PersonRepository;
use sea_orm::Set;
use tracing::info;

use crate::permission;
use crate::prepare::{self, PreparedPerson};
use crate::validate;

/// Service for the people quotes are attributed to.
#[derive(Clone)]
pub struct PersonService {
    person_repo: PersonRepository,
    id_gen: IdGenerator,
}

impl PersonService {
    /// Create a new person service.
    #[must_use]
    pub const fn new(person_repo: PersonRepository) -> Self {
        Self {
            person_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a person. Admin only; a duplicate name is a validation
    /// failure.
    pub async fn create(
        &self,
        actor: Option<&user::Model>,
        name: String,
        person_type: PersonType,
    ) -> AppResult<PreparedPerson> {
        let actor = permission::require_role(actor, &user::Role::Admin)?;
        validate::person_name(&name)?;

        let model = person::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            person_type: Set(person_type),
            created_by: Set(actor.id.clone()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.person_repo.create(model).await?;
        info!(person_id = %created.id, name = %created.name, admin = %actor.id, "Created person");

        Ok(prepare::prepare_person(&created))
    }

    /// Fetch one person.
    pub async fn get(&self, id: &str) -> AppResult<PreparedPerson> {
        let person = self.person_repo.get_by_id(id).await?;
        Ok(prepare::prepare_person(&person))
    }

    /// List people, optionally by case-insensitive name/type substrings.
    pub async fn search(
        &self,
        name: Option<&str>,
        person_type: Option<&str>,
    ) -> AppResult<Vec<PreparedPerson>> {
        let people = self.person_repo.search(name, person_type).await?;
        Ok(people.iter().map(prepare::prepare_person).collect())
    }
}
