//! Account management: self profile, self-edit, and the guest approval flow.

use chrono::Utc;
use quotebook_common::{AppError, AppResult, ValidationKind};
use quotebook_db::entities::user::{self, Role};
use quotebook_db::repositories::{ClassRepository, UserRepository};
use sea_orm::{IntoActiveModel, Set};
use tracing::info;

use crate::prepare::{self, PreparedUser};
use crate::{credentials, permission, validate};

/// Input for editing one's own account.
///
/// `None` leaves a field unchanged; for `class_id` the empty string is the
/// explicit unset signal. The role is not here on purpose.
#[derive(Debug, Clone, Default)]
pub struct SelfEditInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub class_id: Option<String>,
}

/// Service for user accounts.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    class_repo: ClassRepository,
    /// Gates the hard-delete route; production leaves it off.
    dev_mode: bool,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, class_repo: ClassRepository, dev_mode: bool) -> Self {
        Self {
            user_repo,
            class_repo,
            dev_mode,
        }
    }

    /// The actor's own prepared account.
    pub async fn me(&self, actor: &user::Model) -> AppResult<PreparedUser> {
        self.prepare(actor).await
    }

    /// Edit the actor's own account.
    ///
    /// Changed credentials re-run the registration checks. `class_id: ""`
    /// detaches the account from its class, but only for roles allowed to
    /// exist unattached: users and moderators must carry a class.
    pub async fn self_edit(&self, actor: &user::Model, input: SelfEditInput) -> AppResult<PreparedUser> {
        let mut model = actor.clone().into_active_model();

        if let Some(username) = input.username {
            validate::username(&username)?;
            if username != actor.username
                && self.user_repo.find_by_username(&username).await?.is_some()
            {
                return Err(AppError::validation("username", ValidationKind::Unique));
            }
            model.username = Set(username);
        }
        if let Some(email) = input.email {
            validate::email(&email)?;
            if email != actor.email && self.user_repo.find_by_email(&email).await?.is_some() {
                return Err(AppError::validation("email", ValidationKind::Unique));
            }
            model.email = Set(email);
        }
        if let Some(password) = input.password {
            validate::password(&password)?;
            model.password_hash = Set(credentials::hash_password(&password)?);
        }
        if let Some(class_id) = input.class_id {
            if class_id.is_empty() {
                if matches!(actor.role, Role::User | Role::Moderator) {
                    return Err(AppError::validation("class", ValidationKind::Required));
                }
                model.class_id = Set(None);
            } else {
                if self.class_repo.find_by_id(&class_id).await?.is_none() {
                    return Err(AppError::validation("class", ValidationKind::Reference));
                }
                model.class_id = Set(Some(class_id));
            }
        }

        model.updated_at = Set(Some(Utc::now().into()));

        let updated = self.user_repo.update(model).await?;
        info!(user_id = %updated.id, "Updated own account");

        self.prepare(&updated).await
    }

    /// List guests awaiting approval.
    ///
    /// Admins see every guest; a moderator sees the guests of their own
    /// class. Everyone below moderator has no business here.
    pub async fn guests(&self, actor: Option<&user::Model>) -> AppResult<Vec<PreparedUser>> {
        let actor = permission::require_role(actor, &Role::Moderator)?;

        let guests = match actor.role {
            Role::Admin => self.user_repo.find_guests(None).await?,
            _ => match actor.class_id {
                Some(ref class_id) => self.user_repo.find_guests(Some(class_id)).await?,
                // A moderator without a class moderates nobody
                None => Vec::new(),
            },
        };

        let mut prepared = Vec::with_capacity(guests.len());
        for guest in &guests {
            prepared.push(self.prepare(guest).await?);
        }
        Ok(prepared)
    }

    /// Review a guest: promote to full user, or decline.
    ///
    /// A moderator addressing a guest outside their class sees nothing at
    /// all. Declining clears the class association and keeps the account,
    /// so the guest can attach a new class and re-apply.
    pub async fn review_guest(
        &self,
        actor: Option<&user::Model>,
        target_id: &str,
        allow: bool,
    ) -> AppResult<PreparedUser> {
        let actor = permission::require_role(actor, &Role::Moderator)?;

        let target = self.user_repo.get_by_id(target_id).await?;
        if !permission::can_view_user(actor, &target) {
            return Err(AppError::NotFound);
        }

        if target.role != Role::Guest {
            return Err(AppError::conflict("role", "Account has already been reviewed"));
        }

        let mut model = target.clone().into_active_model();
        if allow {
            if target.class_id.is_none() {
                return Err(AppError::validation("class", ValidationKind::Required));
            }
            model.role = Set(Role::User);
        } else {
            model.class_id = Set(None);
        }
        model.updated_at = Set(Some(Utc::now().into()));

        let updated = self.user_repo.update(model).await?;

        info!(
            user_id = %updated.id,
            reviewer = %actor.id,
            allow,
            "Reviewed guest"
        );

        self.prepare(&updated).await
    }

    /// Hard-delete an account. Development only; in production the route
    /// behind this does not exist, so the answer is `NotFound` before any
    /// other check runs.
    pub async fn remove(&self, actor: Option<&user::Model>, target_id: &str) -> AppResult<()> {
        if !self.dev_mode {
            return Err(AppError::NotFound);
        }
        let actor = permission::require_role(actor, &Role::Admin)?;

        let target = self.user_repo.get_by_id(target_id).await?;
        let target_id = target.id.clone();
        self.user_repo.delete(target).await?;

        info!(user_id = %target_id, admin = %actor.id, "Hard-deleted user");
        Ok(())
    }

    async fn prepare(&self, user: &user::Model) -> AppResult<PreparedUser> {
        let class = match user.class_id {
            Some(ref class_id) => self.class_repo.find_by_id(class_id).await?,
            None => None,
        };
        Ok(prepare::prepare_user(user, class.as_ref()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quotebook_db::entities::class;
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

    fn test_class(id: &str) -> class::Model {
        class::Model {
            id: id.to_string(),
            name: "8a".to_string(),
            created_by: "admin1".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: sea_orm::DatabaseConnection, dev_mode: bool) -> UserService {
        let db = Arc::new(db);
        UserService::new(
            UserRepository::new(db.clone()),
            ClassRepository::new(db),
            dev_mode,
        )
    }

    #[tokio::test]
    async fn test_me_resolves_class() {
        let user = test_user("user1", Role::User, Some("class1"));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_class("class1")]])
            .into_connection();

        let prepared = service(db, false).me(&user).await.unwrap();

        assert_eq!(prepared.id, "user1");
        assert_eq!(prepared.class.as_ref().unwrap().name, "8a");
    }

    #[tokio::test]
    async fn test_self_edit_empty_class_detaches_guest() {
        let guest = test_user("guest1", Role::Guest, Some("class1"));
        let mut updated = guest.clone();
        updated.class_id = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[updated]])
            .into_connection();

        let prepared = service(db, false)
            .self_edit(
                &guest,
                SelfEditInput {
                    class_id: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(prepared.class.is_none());
    }

    #[tokio::test]
    async fn test_self_edit_user_cannot_detach_class() {
        let user = test_user("user1", Role::User, Some("class1"));

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, false)
            .self_edit(
                &user,
                SelfEditInput {
                    class_id: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(AppError::Validation { path, kind }) => {
                assert_eq!(path, "class");
                assert_eq!(kind, ValidationKind::Required);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_self_edit_moderator_cannot_detach_class() {
        let moderator = test_user("mod1", Role::Moderator, Some("class1"));

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, false)
            .self_edit(
                &moderator,
                SelfEditInput {
                    class_id: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(AppError::Validation { path, kind }) => {
                assert_eq!(path, "class");
                assert_eq!(kind, ValidationKind::Required);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_self_edit_rejects_taken_username() {
        let user = test_user("user1", Role::User, None);
        let other = test_user("user2", Role::User, None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[other]])
            .into_connection();

        let result = service(db, false)
            .self_edit(
                &user,
                SelfEditInput {
                    username: Some("u_user2".to_string()),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(AppError::Validation { path, kind }) => {
                assert_eq!(path, "username");
                assert_eq!(kind, ValidationKind::Unique);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_self_edit_short_password_never_reaches_hashing() {
        let user = test_user("user1", Role::User, None);

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db, false)
            .self_edit(
                &user,
                SelfEditInput {
                    password: Some("123".to_string()),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(AppError::Validation { path, kind }) => {
                assert_eq!(path, "password");
                assert_eq!(kind, ValidationKind::MinLength);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_guests_listing_requires_moderator() {
        let user = test_user("user1", Role::User, Some("class1"));

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        match service(db, false).guests(Some(&user)).await {
            Err(AppError::Forbidden(_)) => {}
            _ => panic!("Expected Forbidden error"),
        }
    }

    #[tokio::test]
    async fn test_guests_listing_anonymous_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        match service(db, false).guests(None).await {
            Err(AppError::Unauthorized) => {}
            _ => panic!("Expected Unauthorized error"),
        }
    }

    #[tokio::test]
    async fn test_moderator_without_class_sees_no_guests() {
        let moderator = test_user("mod1", Role::Moderator, None);

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let guests = service(db, false).guests(Some(&moderator)).await.unwrap();
        assert!(guests.is_empty());
    }

    #[tokio::test]
    async fn test_review_promotes_guest_with_class() {
        let moderator = test_user("mod1", Role::Moderator, Some("class1"));
        let guest = test_user("guest1", Role::Guest, Some("class1"));
        let mut promoted = guest.clone();
        promoted.role = Role::User;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[guest]])
            .append_query_results([[promoted]])
            .append_query_results([[test_class("class1")]])
            .into_connection();

        let prepared = service(db, false)
            .review_guest(Some(&moderator), "guest1", true)
            .await
            .unwrap();

        assert_eq!(prepared.role, Role::User);
    }

    #[tokio::test]
    async fn test_review_occludes_foreign_class_guest() {
        let moderator = test_user("mod1", Role::Moderator, Some("class1"));
        let foreign_guest = test_user("guest1", Role::Guest, Some("class2"));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[foreign_guest]])
            .into_connection();

        match service(db, false)
            .review_guest(Some(&moderator), "guest1", true)
            .await
        {
            Err(AppError::NotFound) => {}
            _ => panic!("Expected NotFound error"),
        }
    }

    #[tokio::test]
    async fn test_review_non_guest_is_a_conflict() {
        let admin = test_user("admin1", Role::Admin, None);
        let full_user = test_user("user1", Role::User, Some("class1"));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[full_user]])
            .into_connection();

        match service(db, false).review_guest(Some(&admin), "user1", true).await {
            Err(AppError::Conflict { path, .. }) => assert_eq!(path, "role"),
            _ => panic!("Expected Conflict error"),
        }
    }

    #[tokio::test]
    async fn test_review_promote_requires_class() {
        let admin = test_user("admin1", Role::Admin, None);
        let unattached_guest = test_user("guest1", Role::Guest, None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[unattached_guest]])
            .into_connection();

        match service(db, false).review_guest(Some(&admin), "guest1", true).await {
            Err(AppError::Validation { path, kind }) => {
                assert_eq!(path, "class");
                assert_eq!(kind, ValidationKind::Required);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_review_decline_clears_class_and_keeps_account() {
        let moderator = test_user("mod1", Role::Moderator, Some("class1"));
        let guest = test_user("guest1", Role::Guest, Some("class1"));
        let mut declined = guest.clone();
        declined.class_id = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[guest]])
            .append_query_results([[declined]])
            .into_connection();

        let prepared = service(db, false)
            .review_guest(Some(&moderator), "guest1", false)
            .await
            .unwrap();

        assert_eq!(prepared.role, Role::Guest);
        assert!(prepared.class.is_none());
    }

    #[tokio::test]
    async fn test_remove_outside_dev_mode_is_not_found() {
        let admin = test_user("admin1", Role::Admin, None);

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        match service(db, false).remove(Some(&admin), "user1").await {
            Err(AppError::NotFound) => {}
            _ => panic!("Expected NotFound error"),
        }
    }

    #[tokio::test]
    async fn test_remove_in_dev_mode_is_admin_only() {
        let moderator = test_user("mod1", Role::Moderator, Some("class1"));

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        match service(db, true).remove(Some(&moderator), "user1").await {
            Err(AppError::Forbidden(_)) => {}
            _ => panic!("Expected Forbidden error"),
        }
    }

    #[tokio::test]
    async fn test_remove_in_dev_mode_deletes() {
        let admin = test_user("admin1", Role::Admin, None);
        let target = test_user("user1", Role::User, None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[target]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        service(db, true).remove(Some(&admin), "user1").await.unwrap();
    }
}
