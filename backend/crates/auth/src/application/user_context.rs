//! Per-request caller identity.

use crate::domain::entity::user::User;
use crate::domain::value_object::scope::Scope;
use crate::error::{AuthError, AuthResult};

/// Who is calling and what their token allows.
///
/// Anonymous callers have no user and no scopes.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    user: Option<User>,
    scopes: Vec<Scope>,
}

impl UserContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user: User, scopes: Vec<Scope>) -> Self {
        Self {
            user: Some(user),
            scopes,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    /// Whether the caller is the given user
    pub fn user_is_self(&self, user: &User) -> bool {
        self.is_self_id(user.id.as_str())
    }

    pub fn is_self_id(&self, user_id: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.id.as_str() == user_id)
    }

    /// True when any of `scopes` is granted
    pub fn has_scope(&self, scopes: &[Scope]) -> bool {
        scopes.iter().any(|s| self.scopes.contains(s))
    }

    /// The logged-in user, or 401 with `message`
    pub fn require_user(&self, message: &str) -> AuthResult<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| AuthError::unauthorized(message))
    }

    /// 403 naming the first scope when none of `scopes` is granted
    pub fn require_scope(&self, scopes: &[Scope]) -> AuthResult<()> {
        if self.has_scope(scopes) {
            return Ok(());
        }
        Err(AuthError::MissingScope(
            scopes.first().copied().unwrap_or(Scope::User),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_name::UserName;
    use kernel::id::UserId;

    fn user(id: &str) -> User {
        User::new(
            UserId::from_string(id),
            UserName::new(id).unwrap(),
            None,
            "GitHub",
            id,
        )
    }

    #[test]
    fn test_anonymous() {
        let ctx = UserContext::anonymous();
        assert!(!ctx.is_logged_in());
        assert!(!ctx.user_is_self(&user("a")));
        assert!(!ctx.has_scope(&[Scope::Paste]));
        assert!(matches!(
            ctx.require_user("login first"),
            Err(AuthError::Unauthorized(m)) if m == "login first"
        ));
    }

    #[test]
    fn test_scopes_any_of() {
        let ctx = UserContext::logged_in(user("a"), vec![Scope::PasteRead]);
        assert!(ctx.has_scope(&[Scope::Paste, Scope::PasteRead]));
        assert!(!ctx.has_scope(&[Scope::User]));
        assert!(ctx.require_scope(&[Scope::Paste, Scope::PasteRead]).is_ok());
        assert!(matches!(
            ctx.require_scope(&[Scope::User, Scope::UserRead]),
            Err(AuthError::MissingScope(Scope::User))
        ));
    }

    #[test]
    fn test_self_checks() {
        let ctx = UserContext::logged_in(user("a"), Scope::LOGIN.to_vec());
        assert!(ctx.user_is_self(&user("a")));
        assert!(!ctx.user_is_self(&user("b")));
        assert!(!ctx.is_admin());
    }
}
