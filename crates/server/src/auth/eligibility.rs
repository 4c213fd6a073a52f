//! Login eligibility gate.
//!
//! Resolving a token to a member does not mean the member may log in; the
//! gate runs after resolution and before any session is established. It is
//! a pure query over the member record.

use crate::entity::member;
use time::OffsetDateTime;

/// Outcome of an eligibility check, with human-readable reasons on failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    reasons: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn add_reason(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }

    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn into_reasons(self) -> Vec<String> {
        self.reasons
    }
}

/// Decides whether a resolved member may establish a session.
pub trait EligibilityPolicy: Send + Sync {
    fn validate_can_login(&self, member: &member::Model) -> ValidationResult;
}

/// Default policy: blocked accounts and accounts inside a lockout window
/// may not log in.
pub struct DefaultEligibilityPolicy;

impl EligibilityPolicy for DefaultEligibilityPolicy {
    fn validate_can_login(&self, member: &member::Model) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if member.blocked {
            result.add_reason("Account is blocked");
        }
        if let Some(until) = member.locked_out_until {
            if until > OffsetDateTime::now_utc() {
                result.add_reason("Account is temporarily locked");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn test_member() -> member::Model {
        member::Model {
            id: "member-1".to_string(),
            email: Some("user@example.com".to_string()),
            name: None,
            source_provider: "google".to_string(),
            blocked: false,
            locked_out_until: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_login_at: None,
        }
    }

    #[test]
    fn clean_member_is_eligible() {
        let verdict = DefaultEligibilityPolicy.validate_can_login(&test_member());
        assert!(verdict.is_valid());
        assert!(verdict.reasons().is_empty());
    }

    #[test]
    fn blocked_member_is_rejected() {
        let mut member = test_member();
        member.blocked = true;
        let verdict = DefaultEligibilityPolicy.validate_can_login(&member);
        assert!(!verdict.is_valid());
        assert_eq!(verdict.reasons(), ["Account is blocked"]);
    }

    #[test]
    fn active_lockout_is_rejected() {
        let mut member = test_member();
        member.locked_out_until = Some(OffsetDateTime::now_utc() + Duration::minutes(10));
        let verdict = DefaultEligibilityPolicy.validate_can_login(&member);
        assert!(!verdict.is_valid());
    }

    #[test]
    fn expired_lockout_is_eligible_again() {
        let mut member = test_member();
        member.locked_out_until = Some(OffsetDateTime::now_utc() - Duration::minutes(10));
        let verdict = DefaultEligibilityPolicy.validate_can_login(&member);
        assert!(verdict.is_valid());
    }

    #[test]
    fn reasons_accumulate() {
        let mut member = test_member();
        member.blocked = true;
        member.locked_out_until = Some(OffsetDateTime::now_utc() + Duration::minutes(10));
        let verdict = DefaultEligibilityPolicy.validate_can_login(&member);
        assert_eq!(verdict.reasons().len(), 2);
    }
}
