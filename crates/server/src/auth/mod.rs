//! Token-to-identity login core.
//!
//! Turns a provider access token into a logged-in local member:
//!
//! 1. [`resource_owner`] exchanges the token for the provider's view of the
//!    authenticated user,
//! 2. [`passports`] finds or creates the member holding the matching
//!    (provider, identifier) passport,
//! 3. [`eligibility`] decides whether that member may log in,
//! 4. [`session`] establishes the session.
//!
//! [`handler::LoginTokenHandler`] wires the four together. Collaborators are
//! injected, so tests substitute any of them without touching the rest.

pub mod eligibility;
pub mod handler;
pub mod mapper;
pub mod passports;
pub mod resource_owner;
pub mod session;

pub use eligibility::{DefaultEligibilityPolicy, EligibilityPolicy, ValidationResult};
pub use handler::LoginTokenHandler;
pub use mapper::{GenericMemberMapper, MemberMapper, MemberMapperRegistry};
pub use passports::PassportService;
pub use resource_owner::{ResourceOwner, ResourceOwnerClient, UserInfoClient};
pub use session::{DbSessionStore, SessionStore};
