//! Member mappers.
//!
//! A mapper copies resource-owner profile fields onto a member record that
//! is about to be created. Mappers are looked up by provider name through
//! [`MemberMapperRegistry`], so a provider with unusual profile data can
//! register its own strategy; everyone else gets [`GenericMemberMapper`].
//!
//! Mappers run exactly once, at member creation. Repeat logins return the
//! stored member untouched so local edits survive.

use crate::auth::resource_owner::ResourceOwner;
use crate::entity::member;
use sea_orm::ActiveValue::Set;
use std::collections::HashMap;
use std::sync::Arc;

/// Pure transform from resource-owner profile fields to member fields.
pub trait MemberMapper: Send + Sync {
    fn map(&self, member: member::ActiveModel, owner: &ResourceOwner) -> member::ActiveModel;
}

/// Default mapping: copy email and display name when the provider sent them.
pub struct GenericMemberMapper;

impl MemberMapper for GenericMemberMapper {
    fn map(&self, mut member: member::ActiveModel, owner: &ResourceOwner) -> member::ActiveModel {
        if let Some(email) = &owner.email {
            member.email = Set(Some(email.clone()));
        }
        if let Some(name) = &owner.name {
            member.name = Set(Some(name.clone()));
        }
        member
    }
}

/// Mapper factory keyed by provider name.
pub struct MemberMapperRegistry {
    mappers: HashMap<String, Arc<dyn MemberMapper>>,
    fallback: Arc<dyn MemberMapper>,
}

impl MemberMapperRegistry {
    pub fn new() -> Self {
        Self {
            mappers: HashMap::new(),
            fallback: Arc::new(GenericMemberMapper),
        }
    }

    /// Register a provider-specific mapper, replacing any previous one.
    pub fn register(&mut self, provider: impl Into<String>, mapper: Arc<dyn MemberMapper>) {
        self.mappers.insert(provider.into(), mapper);
    }

    /// The mapper for a provider, or the generic fallback.
    pub fn for_provider(&self, provider: &str) -> Arc<dyn MemberMapper> {
        self.mappers
            .get(provider)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for MemberMapperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue::{NotSet, Set};
    use time::OffsetDateTime;

    fn blank_member() -> member::ActiveModel {
        member::ActiveModel {
            id: Set("member-1".to_string()),
            email: Set(None),
            name: Set(None),
            source_provider: Set("google".to_string()),
            blocked: Set(false),
            locked_out_until: Set(None),
            created_at: Set(OffsetDateTime::UNIX_EPOCH),
            last_login_at: Set(None),
        }
    }

    fn owner(email: Option<&str>, name: Option<&str>) -> ResourceOwner {
        ResourceOwner {
            identifier: "123456789".to_string(),
            email: email.map(String::from),
            name: name.map(String::from),
        }
    }

    #[test]
    fn generic_mapper_copies_profile_fields() {
        let mapped = GenericMemberMapper.map(blank_member(), &owner(Some("a@b.com"), Some("Ada")));
        assert_eq!(mapped.email, Set(Some("a@b.com".to_string())));
        assert_eq!(mapped.name, Set(Some("Ada".to_string())));
        // Everything else passes through unchanged
        assert_eq!(mapped.source_provider, Set("google".to_string()));
        assert_eq!(mapped.blocked, Set(false));
    }

    #[test]
    fn generic_mapper_leaves_absent_fields_alone() {
        let mapped = GenericMemberMapper.map(blank_member(), &owner(None, None));
        assert_eq!(mapped.email, Set(None));
        assert_eq!(mapped.name, Set(None));
    }

    #[test]
    fn registry_falls_back_to_generic() {
        let registry = MemberMapperRegistry::new();
        let mapper = registry.for_provider("unregistered");
        let mapped = mapper.map(blank_member(), &owner(Some("a@b.com"), None));
        assert_eq!(mapped.email, Set(Some("a@b.com".to_string())));
    }

    #[test]
    fn registry_dispatches_by_provider_name() {
        struct NullMapper;
        impl MemberMapper for NullMapper {
            fn map(
                &self,
                mut member: member::ActiveModel,
                _owner: &ResourceOwner,
            ) -> member::ActiveModel {
                member.email = NotSet;
                member
            }
        }

        let mut registry = MemberMapperRegistry::new();
        registry.register("weird", Arc::new(NullMapper));

        let mapped = registry
            .for_provider("weird")
            .map(blank_member(), &owner(Some("a@b.com"), None));
        assert_eq!(mapped.email, NotSet);

        let mapped = registry
            .for_provider("google")
            .map(blank_member(), &owner(Some("a@b.com"), None));
        assert_eq!(mapped.email, Set(Some("a@b.com".to_string())));
    }
}
