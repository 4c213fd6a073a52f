pub mod login_session;
pub mod member;
pub mod passport;
