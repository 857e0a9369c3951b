//! Well-known role name constants.
//!
//! These must match the `chk_users_role` constraint in the users migration.

/// Default role for every new account.
pub const ROLE_USER: &str = "user";
/// Granted when the user onboards as a creator.
pub const ROLE_CREATOR: &str = "creator";
