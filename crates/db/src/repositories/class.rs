//! Class repository.

use std::sync::Arc;

use crate::entities::{Class, class};
use quotebook_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Class repository for database operations.
#[derive(Clone)]
pub struct ClassRepository {
    db: Arc<DatabaseConnection>,
}

impl ClassRepository {
    /// Create a new class repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a class by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<class::Model>> {
        Class::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a class by ID, returning not-found if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<class::Model> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Find classes by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<class::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Class::find()
            .filter(class::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List classes, optionally filtered to a case-insensitive name substring.
    pub async fn search(&self, name: Option<&str>) -> AppResult<Vec<class::Model>> {
        let mut query = Class::find();

        if let Some(name) = name {
            let pattern = format!("%{}%", name.to_lowercase());
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(class::Column::Name))).like(pattern),
            );
        }

        query
            .order_by_asc(class::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new class.
    ///
    /// A duplicate name surfaces as a validation failure.
    pub async fn create(&self, model: class::ActiveModel) -> AppResult<class::Model> {
        model.insert(self.db.as_ref()).await.map_err(super::map_write_err)
    }
}
