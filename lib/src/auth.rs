use std::sync::RwLock;

use secrecy::{ExposeSecret, Secret};

/// Role allowed to assemble and delete tests.
pub const CREATOR_ROLE: &str = "Creator";

#[derive(Debug, Default)]
struct Identity {
    token: Option<Secret<String>>,
    role: Option<String>,
}

/// Process-wide admin identity. Set at login, cleared at logout or on any 401,
/// and shared with whoever needs it instead of being read from ambient storage.
#[derive(Debug, Default)]
pub struct AuthSession {
    identity: RwLock<Identity>,
}

impl AuthSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: Secret<String>) -> Self {
        let session = Self::new();
        session.sign_in(token, None);
        session
    }

    pub fn sign_in(&self, token: Secret<String>, role: Option<String>) {
        let mut identity = self.write();
        identity.token = Some(token);
        identity.role = role;
    }

    pub fn sign_out(&self) {
        *self.write() = Identity::default();
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<String> {
        self.read().role.clone()
    }

    #[must_use]
    pub fn is_creator(&self) -> bool {
        self.read().role.as_deref() == Some(CREATOR_ROLE)
    }

    /// Value for the `Authorization` header, if signed in.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.read()
            .token
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }

    /// Plain token, for handing to the user after an interactive login.
    #[must_use]
    pub fn export_token(&self) -> Option<String> {
        self.read()
            .token
            .as_ref()
            .map(|token| token.expose_secret().clone())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Identity> {
        self.identity
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Identity> {
        self.identity
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out() {
        let auth = AuthSession::new();
        assert!(!auth.is_authenticated());
        assert_eq!(auth.bearer(), None);

        auth.sign_in(Secret::new("t0k3n".to_owned()), Some(CREATOR_ROLE.to_owned()));
        assert!(auth.is_authenticated());
        assert!(auth.is_creator());
        assert_eq!(auth.bearer().as_deref(), Some("Bearer t0k3n"));

        auth.sign_out();
        assert!(!auth.is_authenticated());
        assert_eq!(auth.role(), None);
    }

    #[test]
    fn token_without_role_is_not_creator() {
        let auth = AuthSession::with_token(Secret::new("abc".to_owned()));
        assert!(auth.is_authenticated());
        assert!(!auth.is_creator());
    }
}
