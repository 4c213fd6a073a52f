//! Member entity - the provider-agnostic local user record.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Email from the provider profile, when the mapper found one
    pub email: Option<String>,
    /// Display name from the provider profile
    pub name: Option<String>,
    /// Name of the provider this member was first created from
    pub source_provider: String,
    /// Administratively disabled accounts may not log in
    pub blocked: bool,
    /// Temporary lockout; login is refused until this passes
    pub locked_out_until: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub last_login_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::passport::Entity")]
    Passports,
    #[sea_orm(has_many = "super::login_session::Entity")]
    Sessions,
}

impl Related<super::passport::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passports.def()
    }
}

impl Related<super::login_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
