//! Permission resolver.
//!
//! Pure decision functions: given an actor (a resolved [`user::Model`], or
//! `None` for an anonymous request) and a target, decide whether an operation
//! is allowed. Roles escalate as a partial order, not a total one — `Admin`
//! dominates everything, `Moderator` dominates `User` and `Guest` only within
//! the same class, and `User`/`Guest` dominate nobody.
//!
//! Callers translate a failed view check into `NotFound` so that the
//! existence of an invisible quote or user is never leaked; `Forbidden` is
//! reserved for mutations on targets the actor can already see.

use quotebook_common::{AppError, AppResult};
use quotebook_db::entities::{
    quote::{self, QuoteState},
    user::{self, Role},
};

/// Whether `actor` may read `quote`.
///
/// Anonymous actors take the guest rule: public and classless only.
#[must_use]
pub fn can_view_quote(actor: Option<&user::Model>, quote: &quote::Model) -> bool {
    let Some(actor) = actor else {
        return quote.state == QuoteState::Public && quote.class_id.is_none();
    };

    match actor.role {
        Role::Admin => true,
        Role::Moderator => {
            quote.state == QuoteState::Public
                || (quote.state == QuoteState::Pending && quote.class_id == actor.class_id)
                || quote.created_by == actor.id
        }
        Role::User => {
            quote.state == QuoteState::Public
                || (quote.state == QuoteState::Pending && quote.created_by == actor.id)
        }
        Role::Guest => quote.state == QuoteState::Public && quote.class_id.is_none(),
    }
}

/// Whether `actor` may create a quote in class `class_id` (`None` = global).
#[must_use]
pub fn can_create_quote(actor: &user::Model, class_id: Option<&str>) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Moderator => class_id == actor.class_id.as_deref(),
        Role::User => class_id.is_none() || class_id == actor.class_id.as_deref(),
        Role::Guest => false,
    }
}

/// Whether a quote created by `actor` goes public immediately.
///
/// Only meaningful once [`can_create_quote`] has passed; elevated roles skip
/// the pending stage and the approver stamp is theirs.
#[must_use]
pub fn publishes_on_create(actor: &user::Model) -> bool {
    matches!(actor.role, Role::Admin | Role::Moderator)
}

/// Whether `actor` may edit `quote`.
///
/// Assumes the view check has already passed.
#[must_use]
pub fn can_edit_quote(actor: &user::Model, quote: &quote::Model) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Moderator => {
            quote.state == QuoteState::Pending
                || quote.approved_by.as_deref() == Some(actor.id.as_str())
        }
        Role::User => quote.state == QuoteState::Pending && quote.created_by == actor.id,
        Role::Guest => false,
    }
}

/// Whether `actor` may transition `quote` out of its current state at all.
///
/// Which target states are reachable is the state machine's concern; this
/// only answers "may this actor touch the state of this quote". Moderators
/// may only promote pending quotes of their own class.
#[must_use]
pub fn can_set_quote_state(actor: &user::Model, quote: &quote::Model) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Moderator => {
            quote.state == QuoteState::Pending && quote.class_id == actor.class_id
        }
        Role::User | Role::Guest => false,
    }
}

/// Whether `actor` may delete `quote`.
///
/// Assumes the view check has already passed. Everyone but admins is limited
/// to pending quotes.
#[must_use]
pub fn can_delete_quote(actor: &user::Model, quote: &quote::Model) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Moderator => quote.state == QuoteState::Pending && can_edit_quote(actor, quote),
        Role::User => quote.state == QuoteState::Pending && quote.created_by == actor.id,
        Role::Guest => false,
    }
}

/// Whether `actor` may act on the user account `target`.
///
/// Admins reach everyone, everyone reaches themselves, and moderators reach
/// accounts of their own class. Callers occlude a failed check as `NotFound`.
#[must_use]
pub fn can_view_user(actor: &user::Model, target: &user::Model) -> bool {
    if actor.role == Role::Admin || actor.id == target.id {
        return true;
    }
    actor.role == Role::Moderator && target.class_id == actor.class_id
}

/// Require an authenticated actor of at least `minimum` rank.
///
/// `None` (no credentials at all) is an authentication failure, an
/// insufficient role an authorization failure. `Guest` as the minimum
/// accepts any authenticated actor.
pub fn require_role<'a>(
    actor: Option<&'a user::Model>,
    minimum: &Role,
) -> AppResult<&'a user::Model> {
    let actor = actor.ok_or(AppError::Unauthorized)?;

    let allowed = match minimum {
        Role::Admin => actor.role == Role::Admin,
        Role::Moderator => matches!(actor.role, Role::Admin | Role::Moderator),
        Role::User => matches!(actor.role, Role::Admin | Role::Moderator | Role::User),
        Role::Guest => true,
    };

    if allowed {
        Ok(actor)
    } else {
        Err(AppError::Forbidden("Insufficient role".to_string()))
    }
}
