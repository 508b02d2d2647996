//! Quote entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Quote lifecycle states.
///
/// `pending → public → archived`, strictly forward. `public` requires an
/// approver stamp; the two always change together.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum QuoteState {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "public")]
    Public,
    #[sea_orm(string_value = "archived")]
    Archived,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lifecycle state
    pub state: QuoteState,

    /// What was said
    #[sea_orm(column_type = "Text")]
    pub text: String,

    /// Situation it was said in
    #[sea_orm(nullable)]
    pub context: Option<String>,

    /// Free-form remark by the submitter
    #[sea_orm(nullable)]
    pub note: Option<String>,

    /// The person the quote is attributed to
    #[sea_orm(indexed)]
    pub originator_id: String,

    /// Owning class; NULL = global/cross-class quote
    #[sea_orm(nullable, indexed)]
    pub class_id: Option<String>,

    /// Submitting user
    #[sea_orm(indexed)]
    pub created_by: String,

    /// Approving user; set iff state is public
    #[sea_orm(nullable)]
    pub approved_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::OriginatorId",
        to = "super::person::Column::Id"
    )]
    Originator,

    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id",
        on_delete = "SetNull"
    )]
    Class,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,

    #[sea_orm(has_many = "super::reaction::Entity")]
    Reactions,
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Originator.def()
    }
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::reaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
