//! Permission string matching
//!
//! Permissions are `resource:action` strings, optionally with a trailing
//! scope segment (`users:read:self`).

/// Whether a granted permission covers a required one.
///
/// Rules, in precedence order:
///
/// ## 1. Global wildcard
/// ```text
/// User has: "*"
/// Checking: anything
/// Result:   GRANTED
/// ```
///
/// ## 2. Exact match
///
/// ## 3. Action wildcard
/// ```text
/// User has: "users:*"
/// Checking: "users:read", "users:delete:any"
/// Result:   GRANTED
/// ```
///
/// ## 4. Scoped permission
/// ```text
/// User has: "users:read"
/// Checking: "users:read:self"
/// Result:   GRANTED
/// ```
///
/// There is no cross-resource wildcard: `*:read` does not grant `users:read`.
#[must_use]
pub fn matches_permission(user_permission: &str, required: &str) -> bool {
    if user_permission == "*" || user_permission == required {
        return true;
    }

    if let Some(resource) = user_permission.strip_suffix(":*") {
        return required
            .strip_prefix(resource)
            .is_some_and(|rest| rest.starts_with(':'));
    }

    user_permission.contains(':')
        && required
            .strip_prefix(user_permission)
            .is_some_and(|rest| rest.starts_with(':'))
}

/// Whether any of `granted` covers `required`.
pub fn check_permission<S: AsRef<str>>(granted: &[S], required: &str) -> bool {
    granted.iter().any(|permission| matches_permission(permission.as_ref(), required))
}
