//! Registration, login, and actor resolution.

use chrono::Utc;
use quotebook_common::config::AuthConfig;
use quotebook_common::{AppError, AppResult, ValidationKind, id::IdGenerator};
use quotebook_db::entities::user::{self, Role};
use quotebook_db::repositories::{ClassRepository, UserRepository};
use sea_orm::Set;
use tracing::info;

use crate::{credentials, validate};

/// Input for registering a new account.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Class the applicant wants to join; checked for existence.
    pub class_id: Option<String>,
}

/// Input for signing in.
#[derive(Debug, Clone)]
pub struct LoginInput {
    /// Looked up first when given.
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

/// Service for credentials and identity.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    class_repo: ClassRepository,
    id_gen: IdGenerator,
    token_secret: String,
    token_expiry_secs: u64,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub fn new(user_repo: UserRepository, class_repo: ClassRepository, auth: &AuthConfig) -> Self {
        Self {
            user_repo,
            class_repo,
            id_gen: IdGenerator::new(),
            token_secret: auth.token_secret.clone(),
            token_expiry_secs: auth.token_expiry_secs,
        }
    }

    /// Register a new account with role `guest` and issue a token.
    ///
    /// Field shapes are checked first (the password before it is ever
    /// hashed), then the class reference, then uniqueness. The unique
    /// indexes backstop the pre-checks, so a raced duplicate still comes
    /// back as the same validation failure.
    pub async fn register(&self, input: RegisterInput) -> AppResult<(user::Model, String)> {
        validate::username(&input.username)?;
        validate::email(&input.email)?;
        validate::password(&input.password)?;

        if let Some(ref class_id) = input.class_id
            && self.class_repo.find_by_id(class_id).await?.is_none()
        {
            return Err(AppError::validation("class", ValidationKind::Reference));
        }

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::validation("username", ValidationKind::Unique));
        }
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::validation("email", ValidationKind::Unique));
        }

        let password_hash = credentials::hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            password_hash: Set(password_hash),
            email: Set(input.email),
            role: Set(Role::Guest),
            class_id: Set(input.class_id),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.user_repo.create(model).await?;
        let token = self.issue_token(&created.id)?;

        info!(user_id = %created.id, username = %created.username, "Registered new guest");

        Ok((created, token))
    }

    /// Authenticate by email or username and issue a token.
    ///
    /// An unknown account and a wrong password are indistinguishable to the
    /// caller.
    pub async fn login(&self, input: LoginInput) -> AppResult<(user::Model, String)> {
        let user = if let Some(ref email) = input.email {
            self.user_repo.find_by_email(email).await?
        } else if let Some(ref username) = input.username {
            self.user_repo.find_by_username(username).await?
        } else {
            None
        }
        .ok_or(AppError::Unauthorized)?;

        if !credentials::verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.issue_token(&user.id)?;
        Ok((user, token))
    }

    /// Resolve an `Authorization` header value to a user.
    ///
    /// The header is present, so anything short of a valid token for an
    /// existing account is an authentication failure; the anonymous path is
    /// the absent header, handled by the caller.
    pub async fn resolve_bearer(&self, header: &str) -> AppResult<user::Model> {
        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;
        let user_id = credentials::verify_token(token, &self.token_secret)?;

        self.user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    fn issue_token(&self, user_id: &str) -> AppResult<String> {
        credentials::issue_token(user_id, &self.token_secret, self.token_expiry_secs)
    }
}
