//! Person repository.

use std::sync::Arc;

use crate::entities::{Person, person};
use quotebook_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Person repository for database operations.
#[derive(Clone)]
pub struct PersonRepository {
    db: Arc<DatabaseConnection>,
}

impl PersonRepository {
    /// Create a new person repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a person by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<person::Model>> {
        Person::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a person by ID, returning not-found if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<person::Model> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Find people by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<person::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Person::find()
            .filter(person::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List people, optionally filtered by case-insensitive name and type
    /// substrings.
    pub async fn search(
        &self,
        name: Option<&str>,
        person_type: Option<&str>,
    ) -> AppResult<Vec<person::Model>> {
        let mut query = Person::find();

        if let Some(name) = name {
            let pattern = format!("%{}%", name.to_lowercase());
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(person::Column::Name))).like(pattern),
            );
        }

        if let Some(person_type) = person_type {
            let pattern = format!("%{}%", person_type.to_lowercase());
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(person::Column::PersonType))).like(pattern),
            );
        }

        query
            .order_by_asc(person::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new person.
    ///
    /// A duplicate name surfaces as a validation failure.
    pub async fn create(&self, model: person::ActiveModel) -> AppResult<person::Model> {
        model.insert(self.db.as_ref()).await.map_err(super::map_write_err)
    }
}
