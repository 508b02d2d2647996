//! Prepared projections.
//!
//! The read-time transform from stored rows to API-safe output: internal
//! fields (the password digest above all) are stripped, and foreign
//! references are resolved into their own prepared forms instead of raw
//! ids. Never persisted; services assemble these right before the response.

use quotebook_db::entities::{
    class, person,
    person::PersonType,
    quote::{self, QuoteState},
    reaction,
    user::{self, Role},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

/// A class as it appears in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedClass {
    pub id: String,
    pub name: String,
}

/// A person as it appears in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedPerson {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub person_type: PersonType,
}

/// A user as it appears in responses. No credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<PreparedClass>,
}

/// One reaction entry on a prepared quote.
///
/// The user stays a bare id: resolving it would drag full accounts (email
/// included) into every public quote response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedReaction {
    pub user: String,
    pub like: bool,
}

/// A quote as it appears in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedQuote {
    pub id: String,
    pub state: QuoteState,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub originator: PreparedPerson,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<PreparedClass>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    pub reactions: Vec<PreparedReaction>,
    pub created_at: DateTimeWithTimeZone,
}

/// Project a class.
#[must_use]
pub fn prepare_class(class: &class::Model) -> PreparedClass {
    PreparedClass {
        id: class.id.clone(),
        name: class.name.clone(),
    }
}

/// Project a person.
#[must_use]
pub fn prepare_person(person: &person::Model) -> PreparedPerson {
    PreparedPerson {
        id: person.id.clone(),
        name: person.name.clone(),
        person_type: person.person_type.clone(),
    }
}

/// Project a user, resolving the class reference when the caller found one.
#[must_use]
pub fn prepare_user(user: &user::Model, class: Option<&class::Model>) -> PreparedUser {
    PreparedUser {
        id: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        class: class.map(prepare_class),
    }
}

/// Project a quote with its resolved references.
///
/// The originator is mandatory here: callers must have resolved it already,
/// treating an unresolvable one as a broken invariant. An unresolvable
/// class reference degrades to an absent field instead.
#[must_use]
pub fn prepare_quote(
    quote: &quote::Model,
    originator: &person::Model,
    class: Option<&class::Model>,
    reactions: &[reaction::Model],
) -> PreparedQuote {
    PreparedQuote {
        id: quote.id.clone(),
        state: quote.state.clone(),
        text: quote.text.clone(),
        context: quote.context.clone(),
        note: quote.note.clone(),
        originator: prepare_person(originator),
        class: class.map(prepare_class),
        created_by: quote.created_by.clone(),
        approved_by: quote.approved_by.clone(),
        reactions: reactions
            .iter()
            .map(|r| PreparedReaction {
                user: r.user_id.clone(),
                like: r.is_like,
            })
            .collect(),
        created_at: quote.created_at,
    }
}
