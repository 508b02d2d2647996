//! Quote lifecycle: create, view, edit, state transitions, reactions.

use chrono::Utc;
use quotebook_common::{AppError, AppResult, ValidationKind, id::IdGenerator};
use quotebook_db::entities::{
    class, person,
    quote::{self, QuoteState},
    reaction,
    user::{self, Role},
};
use quotebook_db::repositories::{
    ClassRepository, PersonRepository, QuoteFilter, QuoteRepository, ReactionRepository,
};
use rand::Rng;
use sea_orm::{IntoActiveModel, Set};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::permission;
use crate::prepare::{self, PreparedQuote};
use crate::validate;

/// Input for submitting a quote.
#[derive(Debug, Clone)]
pub struct CreateQuoteInput {
    pub text: String,
    pub context: Option<String>,
    pub note: Option<String>,
    pub originator_id: String,
    /// Owning class; `None` makes the quote global.
    pub class_id: Option<String>,
}

/// Input for editing a quote.
///
/// `None` leaves a field unchanged. For `context`, `note`, and `class_id`
/// the empty string is the explicit unset signal, distinct from absence.
#[derive(Debug, Clone, Default)]
pub struct EditQuoteInput {
    pub text: Option<String>,
    pub context: Option<String>,
    pub note: Option<String>,
    pub class_id: Option<String>,
    pub originator_id: Option<String>,
}

/// Search filter, as handed in by the routing layer.
#[derive(Debug, Clone, Default)]
pub struct QuoteSearchInput {
    pub originator_id: Option<String>,
    pub class_id: Option<String>,
    pub text: Option<String>,
    pub state: Option<QuoteState>,
}

/// Service for the quote lifecycle.
#[derive(Clone)]
pub struct QuoteService {
    quote_repo: QuoteRepository,
    reaction_repo: ReactionRepository,
    person_repo: PersonRepository,
    class_repo: ClassRepository,
    id_gen: IdGenerator,
}

impl QuoteService {
    /// Create a new quote service.
    #[must_use]
    pub const fn new(
        quote_repo: QuoteRepository,
        reaction_repo: ReactionRepository,
        person_repo: PersonRepository,
        class_repo: ClassRepository,
    ) -> Self {
        Self {
            quote_repo,
            reaction_repo,
            person_repo,
            class_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a quote.
    ///
    /// Elevated roles publish immediately, and the approver stamp is written
    /// in the same insert — there is never a public quote without one.
    pub async fn create(
        &self,
        actor: &user::Model,
        input: CreateQuoteInput,
    ) -> AppResult<PreparedQuote> {
        validate::quote_text(&input.text)?;
        let context = normalize_annotation("context", input.context)?;
        let note = normalize_annotation("note", input.note)?;

        let originator = self
            .person_repo
            .find_by_id(&input.originator_id)
            .await?
            .ok_or_else(|| AppError::validation("originator", ValidationKind::Reference))?;

        let class = match input.class_id {
            Some(ref class_id) => Some(
                self.class_repo
                    .find_by_id(class_id)
                    .await?
                    .ok_or_else(|| AppError::validation("class", ValidationKind::Reference))?,
            ),
            None => None,
        };

        if !permission::can_create_quote(actor, input.class_id.as_deref()) {
            return Err(AppError::Forbidden(
                "Cannot create a quote for this class".to_string(),
            ));
        }

        let publishes = permission::publishes_on_create(actor);
        let model = quote::ActiveModel {
            id: Set(self.id_gen.generate()),
            state: Set(if publishes {
                QuoteState::Public
            } else {
                QuoteState::Pending
            }),
            text: Set(input.text),
            context: Set(context),
            note: Set(note),
            originator_id: Set(input.originator_id),
            class_id: Set(input.class_id),
            created_by: Set(actor.id.clone()),
            approved_by: Set(publishes.then(|| actor.id.clone())),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.quote_repo.create(model).await?;

        info!(
            quote_id = %created.id,
            user_id = %actor.id,
            state = ?created.state,
            "Created quote"
        );

        Ok(prepare::prepare_quote(
            &created,
            &originator,
            class.as_ref(),
            &[],
        ))
    }

    /// Fetch one quote, occluded: an invisible quote reads as absent.
    pub async fn get(&self, actor: Option<&user::Model>, id: &str) -> AppResult<PreparedQuote> {
        let quote = self.visible_quote(actor, id).await?;
        self.prepare_one(&quote).await
    }

    /// Filtered listing, restricted to what the actor may view.
    pub async fn search(
        &self,
        actor: Option<&user::Model>,
        input: QuoteSearchInput,
    ) -> AppResult<Vec<PreparedQuote>> {
        let filter = QuoteFilter {
            originator_id: input.originator_id,
            class_id: input.class_id,
            text: input.text,
            state: input.state,
        };

        let quotes: Vec<quote::Model> = self
            .quote_repo
            .search(&filter)
            .await?
            .into_iter()
            .filter(|q| permission::can_view_quote(actor, q))
            .collect();

        self.prepare_many(&quotes).await
    }

    /// A uniformly random quote from the anonymous-visible pool.
    ///
    /// An empty pool is a broken deployment, not a client mistake.
    pub async fn random(&self) -> AppResult<PreparedQuote> {
        let pool = self.quote_repo.find_public_classless().await?;
        if pool.is_empty() {
            return Err(AppError::Internal(
                "No public quote available for random selection".to_string(),
            ));
        }

        let pick = rand::thread_rng().gen_range(0..pool.len());
        self.prepare_one(&pool[pick]).await
    }

    /// Edit a quote's fields.
    ///
    /// For `context`, `note`, and `class`, an empty string unsets the field
    /// while absence leaves it untouched.
    pub async fn edit(
        &self,
        actor: &user::Model,
        id: &str,
        input: EditQuoteInput,
    ) -> AppResult<PreparedQuote> {
        let quote = self.visible_quote(Some(actor), id).await?;

        if !permission::can_edit_quote(actor, &quote) {
            return Err(AppError::Forbidden("Cannot edit this quote".to_string()));
        }

        let mut model = quote.clone().into_active_model();

        if let Some(text) = input.text {
            validate::quote_text(&text)?;
            model.text = Set(text);
        }
        if let Some(context) = input.context {
            model.context = Set(unset_or_value("context", context)?);
        }
        if let Some(note) = input.note {
            model.note = Set(unset_or_value("note", note)?);
        }
        if let Some(originator_id) = input.originator_id {
            if self.person_repo.find_by_id(&originator_id).await?.is_none() {
                return Err(AppError::validation("originator", ValidationKind::Reference));
            }
            model.originator_id = Set(originator_id);
        }
        if let Some(class_id) = input.class_id {
            let target = if class_id.is_empty() {
                None
            } else {
                if self.class_repo.find_by_id(&class_id).await?.is_none() {
                    return Err(AppError::validation("class", ValidationKind::Reference));
                }
                Some(class_id)
            };
            // Moving a quote between classes is gated like creating it there
            if !permission::can_create_quote(actor, target.as_deref()) {
                return Err(AppError::Forbidden(
                    "Cannot move the quote to this class".to_string(),
                ));
            }
            model.class_id = Set(target);
        }

        model.updated_at = Set(Some(Utc::now().into()));

        let updated = self.quote_repo.update(model).await?;
        info!(quote_id = %updated.id, user_id = %actor.id, "Edited quote");

        self.prepare_one(&updated).await
    }

    /// Transition a quote to `requested`.
    ///
    /// The lifecycle only moves forward: a no-op is a conflict, so is any
    /// regression, and archived is terminal. Going public stamps the actor
    /// as approver; leaving public clears the stamp in the same write.
    pub async fn set_state(
        &self,
        actor: &user::Model,
        id: &str,
        requested: QuoteState,
    ) -> AppResult<PreparedQuote> {
        let quote = self.visible_quote(Some(actor), id).await?;

        if !permission::can_set_quote_state(actor, &quote) {
            return Err(AppError::Forbidden(
                "Cannot change the state of this quote".to_string(),
            ));
        }

        if quote.state == requested {
            return Err(AppError::conflict("state", "State unchanged"));
        }
        if quote.state == QuoteState::Archived {
            return Err(AppError::conflict("state", "Archived quotes cannot change state"));
        }
        if quote.state == QuoteState::Public && requested == QuoteState::Pending {
            return Err(AppError::conflict("state", "Cannot return a quote to pending"));
        }
        if requested == QuoteState::Archived && actor.role != Role::Admin {
            return Err(AppError::Forbidden("Only admins may archive".to_string()));
        }

        let mut model = quote.clone().into_active_model();
        model.state = Set(requested.clone());
        model.approved_by = Set(match requested {
            QuoteState::Public => Some(actor.id.clone()),
            QuoteState::Pending | QuoteState::Archived => None,
        });
        model.updated_at = Set(Some(Utc::now().into()));

        let updated = self.quote_repo.update(model).await?;

        info!(
            quote_id = %updated.id,
            user_id = %actor.id,
            from = ?quote.state,
            to = ?updated.state,
            "Changed quote state"
        );

        self.prepare_one(&updated).await
    }

    /// Delete a quote and its reactions.
    pub async fn delete(&self, actor: &user::Model, id: &str) -> AppResult<()> {
        let quote = self.visible_quote(Some(actor), id).await?;

        if !permission::can_delete_quote(actor, &quote) {
            return Err(AppError::Forbidden("Cannot delete this quote".to_string()));
        }

        let quote_id = quote.id.clone();
        self.quote_repo.delete(quote).await?;

        info!(quote_id = %quote_id, user_id = %actor.id, "Deleted quote");
        Ok(())
    }

    /// Record or flip a reaction.
    ///
    /// One active reaction per user per quote: a first call inserts, an
    /// opposite-polarity call flips, and a same-polarity repeat is a
    /// conflict so double-submits stay detectable.
    pub async fn react(&self, actor: &user::Model, id: &str, like: bool) -> AppResult<PreparedQuote> {
        let quote = self.visible_quote(Some(actor), id).await?;

        match self
            .reaction_repo
            .find_by_user_and_quote(&actor.id, &quote.id)
            .await?
        {
            None => {
                let model = reaction::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    quote_id: Set(quote.id.clone()),
                    user_id: Set(actor.id.clone()),
                    is_like: Set(like),
                    created_at: Set(Utc::now().into()),
                };
                self.reaction_repo.create(model).await?;
            }
            Some(existing) if existing.is_like == like => {
                return Err(AppError::conflict("reaction", "Already reacted to this quote"));
            }
            Some(existing) => {
                let mut model = existing.into_active_model();
                model.is_like = Set(like);
                self.reaction_repo.update(model).await?;
            }
        }

        info!(quote_id = %quote.id, user_id = %actor.id, like, "Reacted to quote");

        self.prepare_one(&quote).await
    }

    /// Remove the actor's reaction; absence is a conflict, not a no-op.
    pub async fn unreact(&self, actor: &user::Model, id: &str) -> AppResult<PreparedQuote> {
        let quote = self.visible_quote(Some(actor), id).await?;

        let existing = self
            .reaction_repo
            .find_by_user_and_quote(&actor.id, &quote.id)
            .await?
            .ok_or_else(|| AppError::conflict("reaction", "No reaction to remove"))?;

        self.reaction_repo.delete(existing).await?;

        info!(quote_id = %quote.id, user_id = %actor.id, "Removed reaction");

        self.prepare_one(&quote).await
    }

    /// Load a quote the actor may view; anything else reads as absent.
    async fn visible_quote(
        &self,
        actor: Option<&user::Model>,
        id: &str,
    ) -> AppResult<quote::Model> {
        let quote = self.quote_repo.get_by_id(id).await?;
        if permission::can_view_quote(actor, &quote) {
            Ok(quote)
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn prepare_one(&self, quote: &quote::Model) -> AppResult<PreparedQuote> {
        let originator = self
            .person_repo
            .find_by_id(&quote.originator_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Quote {} references missing person {}",
                    quote.id, quote.originator_id
                ))
            })?;

        let class = match quote.class_id {
            Some(ref class_id) => {
                let found = self.class_repo.find_by_id(class_id).await?;
                if found.is_none() {
                    warn!(quote_id = %quote.id, class_id = %class_id, "Quote references missing class");
                }
                found
            }
            None => None,
        };

        let reactions = self.reaction_repo.find_by_quote(&quote.id).await?;

        Ok(prepare::prepare_quote(
            quote,
            &originator,
            class.as_ref(),
            &reactions,
        ))
    }

    async fn prepare_many(&self, quotes: &[quote::Model]) -> AppResult<Vec<PreparedQuote>> {
        let person_ids = unique_ids(quotes.iter().map(|q| q.originator_id.clone()));
        let class_ids = unique_ids(quotes.iter().filter_map(|q| q.class_id.clone()));
        let quote_ids: Vec<String> = quotes.iter().map(|q| q.id.clone()).collect();

        let persons: HashMap<String, person::Model> = self
            .person_repo
            .find_by_ids(&person_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        let classes: HashMap<String, class::Model> = self
            .class_repo
            .find_by_ids(&class_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let mut reactions_by_quote: HashMap<String, Vec<reaction::Model>> = HashMap::new();
        for reaction in self.reaction_repo.find_by_quote_ids(&quote_ids).await? {
            reactions_by_quote
                .entry(reaction.quote_id.clone())
                .or_default()
                .push(reaction);
        }

        quotes
            .iter()
            .map(|quote| {
                let originator = persons.get(&quote.originator_id).ok_or_else(|| {
                    AppError::Internal(format!(
                        "Quote {} references missing person {}",
                        quote.id, quote.originator_id
                    ))
                })?;
                let class = quote.class_id.as_ref().and_then(|id| classes.get(id));
                let reactions = reactions_by_quote
                    .get(&quote.id)
                    .map_or(&[] as &[reaction::Model], Vec::as_slice);

                Ok(prepare::prepare_quote(quote, originator, class, reactions))
            })
            .collect()
    }
}

/// Empty annotations on create collapse to "unset".
fn normalize_annotation(path: &str, value: Option<String>) -> AppResult<Option<String>> {
    match value {
        Some(value) if value.is_empty() => Ok(None),
        Some(value) => {
            validate::quote_annotation(path, &value)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Edit semantics: the empty string unsets, anything else is validated.
fn unset_or_value(path: &str, value: String) -> AppResult<Option<String>> {
    if value.is_empty() {
        Ok(None)
    } else {
        validate::quote_annotation(path, &value)?;
        Ok(Some(value))
    }
}

fn unique_ids(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quotebook_db::entities::person::PersonType;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_user(id: &str, role: Role, class_id: Option<&str>) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("u_{id}"),
            password_hash: "$argon2id$stub".to_string(),
            email: format!("{id}@example.com"),
            role,
            class_id: class_id.map(ToString::to_string),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_person(id: &str) -> person::Model {
        person::Model {
            id: id.to_string(),
            name: "Mr. Smith".to_string(),
            person_type: PersonType::Teacher,
            created_by: "admin1".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_class(id: &str, name: &str) -> class::Model {
        class::Model {
            id: id.to_string(),
            name: name.to_string(),
            created_by: "admin1".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_quote(id: &str, state: QuoteState, class_id: Option<&str>, created_by: &str) -> quote::Model {
        let approved_by = (state == QuoteState::Public).then(|| "approver1".to_string());
        quote::Model {
            id: id.to_string(),
            state,
            text: "Quote 1".to_string(),
            context: None,
            note: None,
            originator_id: "person1".to_string(),
            class_id: class_id.map(ToString::to_string),
            created_by: created_by.to_string(),
            approved_by,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> QuoteService {
        let db = Arc::new(db);
        QuoteService::new(
            QuoteRepository::new(db.clone()),
            ReactionRepository::new(db.clone()),
            PersonRepository::new(db.clone()),
            ClassRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_admin_create_publishes_with_approver_stamp() {
        let admin = test_user("admin1", Role::Admin, None);
        let mut created = test_quote("quote1", QuoteState::Public, None, "admin1");
        created.approved_by = Some("admin1".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_person("person1")]])
            .append_query_results([[created]])
            .into_connection();

        let prepared = service(db)
            .create(
                &admin,
                CreateQuoteInput {
                    text: "Quote 1".to_string(),
                    context: None,
                    note: None,
                    originator_id: "person1".to_string(),
                    class_id: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(prepared.state, QuoteState::Public);
        assert_eq!(prepared.approved_by.as_deref(), Some("admin1"));
        assert_eq!(prepared.originator.id, "person1");
    }

    #[tokio::test]
    async fn test_user_create_stays_pending_without_stamp() {
        let user = test_user("user1", Role::User, Some("class1"));
        let created = test_quote("quote1", QuoteState::Pending, Some("class1"), "user1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_person("person1")]])
            .append_query_results([[test_class("class1", "8a")]])
            .append_query_results([[created]])
            .into_connection();

        let prepared = service(db)
            .create(
                &user,
                CreateQuoteInput {
                    text: "Quote 1".to_string(),
                    context: None,
                    note: None,
                    originator_id: "person1".to_string(),
                    class_id: Some("class1".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(prepared.state, QuoteState::Pending);
        assert!(prepared.approved_by.is_none());
    }

    #[tokio::test]
    async fn test_user_cannot_create_for_foreign_class() {
        let user = test_user("user1", Role::User, Some("class1"));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_person("person1")]])
            .append_query_results([[test_class("class2", "8b")]])
            .into_connection();

        let result = service(db)
            .create(
                &user,
                CreateQuoteInput {
                    text: "Quote 1".to_string(),
                    context: None,
                    note: None,
                    originator_id: "person1".to_string(),
                    class_id: Some("class2".to_string()),
                },
            )
            .await;

        match result {
            Err(AppError::Forbidden(_)) => {}
            _ => panic!("Expected Forbidden error"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_missing_originator() {
        let admin = test_user("admin1", Role::Admin, None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<person::Model>::new()])
            .into_connection();

        let result = service(db)
            .create(
                &admin,
                CreateQuoteInput {
                    text: "Quote 1".to_string(),
                    context: None,
                    note: None,
                    originator_id: "person9".to_string(),
                    class_id: None,
                },
            )
            .await;

        match result {
            Err(AppError::Validation { path, kind }) => {
                assert_eq!(path, "originator");
                assert_eq!(kind, ValidationKind::Reference);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_get_occludes_invisible_quote() {
        let user = test_user("user1", Role::User, Some("class1"));
        let foreign_pending = test_quote("quote1", QuoteState::Pending, Some("class1"), "other");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[foreign_pending]])
            .into_connection();

        match service(db).get(Some(&user), "quote1").await {
            Err(AppError::NotFound) => {}
            _ => panic!("Expected NotFound error"),
        }
    }

    #[tokio::test]
    async fn test_publish_stamps_approver() {
        let moderator = test_user("mod1", Role::Moderator, Some("class1"));
        let pending = test_quote("quote1", QuoteState::Pending, Some("class1"), "user1");
        let mut published = pending.clone();
        published.state = QuoteState::Public;
        published.approved_by = Some("mod1".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending]])
            .append_query_results([[published]])
            .append_query_results([[test_person("person1")]])
            .append_query_results([[test_class("class1", "8a")]])
            .append_query_results([Vec::<reaction::Model>::new()])
            .into_connection();

        let prepared = service(db)
            .set_state(&moderator, "quote1", QuoteState::Public)
            .await
            .unwrap();

        assert_eq!(prepared.state, QuoteState::Public);
        assert_eq!(prepared.approved_by.as_deref(), Some("mod1"));
    }

    #[tokio::test]
    async fn test_public_to_pending_is_a_conflict_even_for_admin() {
        let admin = test_user("admin1", Role::Admin, None);
        let public = test_quote("quote1", QuoteState::Public, None, "user1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[public]])
            .into_connection();

        match service(db).set_state(&admin, "quote1", QuoteState::Pending).await {
            Err(AppError::Conflict { path, .. }) => assert_eq!(path, "state"),
            _ => panic!("Expected Conflict error"),
        }
    }

    #[tokio::test]
    async fn test_same_state_transition_is_a_conflict() {
        let admin = test_user("admin1", Role::Admin, None);
        let public = test_quote("quote1", QuoteState::Public, None, "user1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[public]])
            .into_connection();

        match service(db).set_state(&admin, "quote1", QuoteState::Public).await {
            Err(AppError::Conflict { path, .. }) => assert_eq!(path, "state"),
            _ => panic!("Expected Conflict error"),
        }
    }

    #[tokio::test]
    async fn test_archived_is_terminal() {
        let admin = test_user("admin1", Role::Admin, None);
        let mut archived = test_quote("quote1", QuoteState::Archived, None, "user1");
        archived.approved_by = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[archived]])
            .into_connection();

        match service(db).set_state(&admin, "quote1", QuoteState::Public).await {
            Err(AppError::Conflict { path, .. }) => assert_eq!(path, "state"),
            _ => panic!("Expected Conflict error"),
        }
    }

    #[tokio::test]
    async fn test_archiving_clears_approver_and_needs_admin() {
        let moderator = test_user("mod1", Role::Moderator, Some("class1"));
        let pending = test_quote("quote1", QuoteState::Pending, Some("class1"), "user1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending.clone()]])
            .into_connection();

        match service(db)
            .set_state(&moderator, "quote1", QuoteState::Archived)
            .await
        {
            Err(AppError::Forbidden(_)) => {}
            _ => panic!("Expected Forbidden error"),
        }

        let admin = test_user("admin1", Role::Admin, None);
        let public = test_quote("quote2", QuoteState::Public, None, "user1");
        let mut archived = public.clone();
        archived.state = QuoteState::Archived;
        archived.approved_by = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[public]])
            .append_query_results([[archived]])
            .append_query_results([[test_person("person1")]])
            .append_query_results([Vec::<reaction::Model>::new()])
            .into_connection();

        let prepared = service(db)
            .set_state(&admin, "quote2", QuoteState::Archived)
            .await
            .unwrap();

        assert_eq!(prepared.state, QuoteState::Archived);
        assert!(prepared.approved_by.is_none());
    }

    #[tokio::test]
    async fn test_user_cannot_publish() {
        let user = test_user("user1", Role::User, Some("class1"));
        let own_pending = test_quote("quote1", QuoteState::Pending, Some("class1"), "user1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[own_pending]])
            .into_connection();

        match service(db).set_state(&user, "quote1", QuoteState::Public).await {
            Err(AppError::Forbidden(_)) => {}
            _ => panic!("Expected Forbidden error"),
        }
    }

    #[tokio::test]
    async fn test_edit_empty_string_unsets_context() {
        let admin = test_user("admin1", Role::Admin, None);
        let mut quote = test_quote("quote1", QuoteState::Pending, None, "user1");
        quote.approved_by = None;
        quote.context = Some("during maths".to_string());
        quote.note = Some("overheard".to_string());
        let mut updated = quote.clone();
        updated.context = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[quote]])
            .append_query_results([[updated]])
            .append_query_results([[test_person("person1")]])
            .append_query_results([Vec::<reaction::Model>::new()])
            .into_connection();

        let prepared = service(db)
            .edit(
                &admin,
                "quote1",
                EditQuoteInput {
                    context: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(prepared.context.is_none());
        // The untouched field survives
        assert_eq!(prepared.note.as_deref(), Some("overheard"));
    }

    #[tokio::test]
    async fn test_edit_empty_string_unsets_note() {
        let admin = test_user("admin1", Role::Admin, None);
        let mut quote = test_quote("quote1", QuoteState::Pending, None, "user1");
        quote.approved_by = None;
        quote.context = Some("during maths".to_string());
        quote.note = Some("overheard".to_string());
        let mut updated = quote.clone();
        updated.note = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[quote]])
            .append_query_results([[updated]])
            .append_query_results([[test_person("person1")]])
            .append_query_results([Vec::<reaction::Model>::new()])
            .into_connection();

        let prepared = service(db)
            .edit(
                &admin,
                "quote1",
                EditQuoteInput {
                    note: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(prepared.note.is_none());
        assert_eq!(prepared.context.as_deref(), Some("during maths"));
    }

    #[tokio::test]
    async fn test_edit_empty_string_detaches_class() {
        let admin = test_user("admin1", Role::Admin, None);
        let mut quote = test_quote("quote1", QuoteState::Pending, Some("class1"), "user1");
        quote.approved_by = None;
        let mut updated = quote.clone();
        updated.class_id = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[quote]])
            .append_query_results([[updated]])
            .append_query_results([[test_person("person1")]])
            .append_query_results([Vec::<reaction::Model>::new()])
            .into_connection();

        let prepared = service(db)
            .edit(
                &admin,
                "quote1",
                EditQuoteInput {
                    class_id: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(prepared.class.is_none());
    }

    #[tokio::test]
    async fn test_edit_by_non_owner_is_forbidden() {
        let user = test_user("user1", Role::User, Some("class1"));
        let public = test_quote("quote1", QuoteState::Public, None, "user1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[public]])
            .into_connection();

        // Visible (public) but not editable: the quote left pending
        match service(db)
            .edit(&user, "quote1", EditQuoteInput {
                text: Some("Changed".to_string()),
                ..Default::default()
            })
            .await
        {
            Err(AppError::Forbidden(_)) => {}
            _ => panic!("Expected Forbidden error"),
        }
    }

    #[tokio::test]
    async fn test_delete_pending_own_quote() {
        let user = test_user("user1", Role::User, Some("class1"));
        let mut pending = test_quote("quote1", QuoteState::Pending, None, "user1");
        pending.approved_by = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        service(db).delete(&user, "quote1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_public_quote_forbidden_for_user() {
        let user = test_user("user1", Role::User, Some("class1"));
        let public = test_quote("quote1", QuoteState::Public, None, "user1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[public]])
            .into_connection();

        match service(db).delete(&user, "quote1").await {
            Err(AppError::Forbidden(_)) => {}
            _ => panic!("Expected Forbidden error"),
        }
    }

    #[tokio::test]
    async fn test_repeat_reaction_is_a_conflict() {
        let user = test_user("user1", Role::User, Some("class1"));
        let public = test_quote("quote1", QuoteState::Public, None, "other");
        let existing = reaction::Model {
            id: "r1".to_string(),
            quote_id: "quote1".to_string(),
            user_id: "user1".to_string(),
            is_like: true,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[public]])
            .append_query_results([[existing]])
            .into_connection();

        match service(db).react(&user, "quote1", true).await {
            Err(AppError::Conflict { path, .. }) => assert_eq!(path, "reaction"),
            _ => panic!("Expected Conflict error"),
        }
    }

    #[tokio::test]
    async fn test_opposite_reaction_flips_in_place() {
        let user = test_user("user1", Role::User, Some("class1"));
        let public = test_quote("quote1", QuoteState::Public, None, "other");
        let existing = reaction::Model {
            id: "r1".to_string(),
            quote_id: "quote1".to_string(),
            user_id: "user1".to_string(),
            is_like: false,
            created_at: Utc::now().into(),
        };
        let mut flipped = existing.clone();
        flipped.is_like = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[public]])
            .append_query_results([[existing]])
            .append_query_results([[flipped.clone()]])
            .append_query_results([[test_person("person1")]])
            .append_query_results([[flipped]])
            .into_connection();

        let prepared = service(db).react(&user, "quote1", true).await.unwrap();

        assert_eq!(prepared.reactions.len(), 1);
        assert!(prepared.reactions[0].like);
    }

    #[tokio::test]
    async fn test_unreact_without_reaction_is_a_conflict() {
        let user = test_user("user1", Role::User, Some("class1"));
        let public = test_quote("quote1", QuoteState::Public, None, "other");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[public]])
            .append_query_results([Vec::<reaction::Model>::new()])
            .into_connection();

        match service(db).unreact(&user, "quote1").await {
            Err(AppError::Conflict { path, .. }) => assert_eq!(path, "reaction"),
            _ => panic!("Expected Conflict error"),
        }
    }

    #[tokio::test]
    async fn test_search_filters_to_visible_quotes() {
        // Anonymous actor: only public classless survives the view filter
        let visible = test_quote("quote1", QuoteState::Public, None, "user1");
        let pending = test_quote("quote2", QuoteState::Pending, None, "user1");
        let class_bound = test_quote("quote3", QuoteState::Public, Some("class1"), "user1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![visible, pending, class_bound]])
            .append_query_results([[test_person("person1")]])
            .append_query_results([Vec::<reaction::Model>::new()])
            .into_connection();

        let prepared = service(db)
            .search(None, QuoteSearchInput::default())
            .await
            .unwrap();

        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared[0].id, "quote1");
    }

    #[tokio::test]
    async fn test_random_empty_pool_is_a_server_fault() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<quote::Model>::new()])
            .into_connection();

        match service(db).random().await {
            Err(AppError::Internal(_)) => {}
            _ => panic!("Expected Internal error"),
        }
    }
}
