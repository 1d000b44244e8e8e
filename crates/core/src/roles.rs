//! Well-known role name constants.
//!
//! Roles are not stored as rows; they are derived from `users.is_admin`
//! when a token is issued.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Map the `is_admin` flag to the role name embedded in JWT claims.
pub fn role_for(is_admin: bool) -> &'static str {
    if is_admin {
        ROLE_ADMIN
    } else {
        ROLE_USER
    }
}
