//! Passport entity - links a member to one external identity provider.
//!
//! A member may hold several passports (one per linked provider), but a
//! given (provider, identifier) pair belongs to exactly one member. The
//! pair is covered by a unique index so concurrent first logins for the
//! same external account cannot create duplicates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "passport")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Reference to member.id
    pub member_id: String,
    /// Identity provider name (e.g. "google", "facebook")
    pub provider: String,
    /// Provider-specific user identifier
    pub identifier: String,
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
