//! Quote repository.

use std::sync::Arc;

use crate::entities::{Quote, quote};
use quotebook_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};

/// Filter for quote searches. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    /// Exact originator id.
    pub originator_id: Option<String>,
    /// Exact class id.
    pub class_id: Option<String>,
    /// Case-insensitive text substring.
    pub text: Option<String>,
    /// Exact lifecycle state.
    pub state: Option<quote::QuoteState>,
}

/// Quote repository for database operations.
#[derive(Clone)]
pub struct QuoteRepository {
    db: Arc<DatabaseConnection>,
}

impl QuoteRepository {
    /// Create a new quote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a quote by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<quote::Model>> {
        Quote::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a quote by ID, returning not-found if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<quote::Model> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// List quotes matching the filter, newest first.
    pub async fn search(&self, filter: &QuoteFilter) -> AppResult<Vec<quote::Model>> {
        let mut query = Quote::find();

        if let Some(ref originator_id) = filter.originator_id {
            query = query.filter(quote::Column::OriginatorId.eq(originator_id));
        }

        if let Some(ref class_id) = filter.class_id {
            query = query.filter(quote::Column::ClassId.eq(class_id));
        }

        if let Some(ref text) = filter.text {
            let pattern = format!("%{}%", text.to_lowercase());
            query = query
                .filter(Expr::expr(Func::lower(Expr::col(quote::Column::Text))).like(pattern));
        }

        if let Some(ref state) = filter.state {
            query = query.filter(quote::Column::State.eq(state.clone()));
        }

        query
            .order_by_desc(quote::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The anonymous-visible pool: public quotes without a class.
    pub async fn find_public_classless(&self) -> AppResult<Vec<quote::Model>> {
        Quote::find()
            .filter(quote::Column::State.eq(quote::QuoteState::Public))
            .filter(quote::Column::ClassId.is_null())
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new quote.
    pub async fn create(&self, model: quote::ActiveModel) -> AppResult<quote::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a quote.
    pub async fn update(&self, model: quote::ActiveModel) -> AppResult<quote::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a quote. Reactions go with it via the FK cascade.
    pub async fn delete(&self, quote: quote::Model) -> AppResult<()> {
        quote
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
