//! Reaction repository.

use std::sync::Arc;

use crate::entities::{Reaction, reaction};
use quotebook_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, SqlErr,
};

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a reaction by user and quote.
    pub async fn find_by_user_and_quote(
        &self,
        user_id: &str,
        quote_id: &str,
    ) -> AppResult<Option<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::QuoteId.eq(quote_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all reactions on a quote, oldest first.
    pub async fn find_by_quote(&self, quote_id: &str) -> AppResult<Vec<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::QuoteId.eq(quote_id))
            .order_by_asc(reaction::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all reactions on a set of quotes.
    pub async fn find_by_quote_ids(&self, quote_ids: &[String]) -> AppResult<Vec<reaction::Model>> {
        if quote_ids.is_empty() {
            return Ok(vec![]);
        }

        Reaction::find()
            .filter(reaction::Column::QuoteId.is_in(quote_ids.to_vec()))
            .order_by_asc(reaction::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new reaction.
    ///
    /// The unique (quote, user) index backstops the service-level check, so
    /// a raced duplicate still surfaces as a conflict.
    pub async fn create(&self, model: reaction::ActiveModel) -> AppResult<reaction::Model> {
        model.insert(self.db.as_ref()).await.map_err(|err| {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::conflict("reaction", "Already reacted to this quote")
            } else {
                AppError::Database(err.to_string())
            }
        })
    }

    /// Update a reaction (polarity flip).
    pub async fn update(&self, model: reaction::ActiveModel) -> AppResult<reaction::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a reaction.
    pub async fn delete(&self, reaction: reaction::Model) -> AppResult<()> {
        reaction
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
