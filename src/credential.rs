use std::env;
use std::fmt;

/// Environment variables consulted for a key, in order
pub const ENV_KEYS: [&str; 2] = ["ESSAY_COACH_API_KEY", "API_KEY"];

/// Credentials that outlive any single essay session.
///
/// Held in memory only. A user-supplied key takes precedence over one found
/// in the environment.
#[derive(Clone, Default)]
pub struct CredentialScope {
    user_key: Option<String>,
    env_key: Option<String>,
}

impl CredentialScope {
    pub fn new(env_key: Option<String>) -> Self {
        Self {
            user_key: None,
            env_key: env_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        let env_key = ENV_KEYS.iter().find_map(|name| env::var(name).ok());
        Self::new(env_key)
    }

    /// Store a user-supplied key. Blank input is ignored and returns false.
    pub fn set_user_key(&mut self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        self.user_key = Some(key.to_string());
        true
    }

    pub fn effective_key(&self) -> Option<&str> {
        self.user_key.as_deref().or(self.env_key.as_deref())
    }

    pub fn has_key(&self) -> bool {
        self.effective_key().is_some()
    }

    pub fn has_user_key(&self) -> bool {
        self.user_key.is_some()
    }
}

// keys never end up in logs or panic messages
impl fmt::Debug for CredentialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialScope")
            .field("user_key", &self.user_key.as_ref().map(|_| "***"))
            .field("env_key", &self.env_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Masks all but the last four characters of a key for display
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let visible = chars.len().saturating_sub(4);
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < visible { '•' } else { *c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_has_no_key() {
        let scope = CredentialScope::new(None);
        assert!(!scope.has_key());
        assert_eq!(scope.effective_key(), None);
    }

    #[test]
    fn blank_env_key_is_ignored() {
        let scope = CredentialScope::new(Some("  ".into()));
        assert!(!scope.has_key());
    }

    #[test]
    fn user_key_wins_over_env_key() {
        let mut scope = CredentialScope::new(Some("env-key".into()));
        assert_eq!(scope.effective_key(), Some("env-key"));
        assert!(scope.set_user_key("  user-key "));
        assert_eq!(scope.effective_key(), Some("user-key"));
        assert!(scope.has_user_key());
    }

    #[test]
    fn blank_user_key_is_rejected() {
        let mut scope = CredentialScope::new(None);
        assert!(!scope.set_user_key("   "));
        assert!(!scope.has_key());
    }

    #[test]
    fn debug_output_hides_keys() {
        let mut scope = CredentialScope::new(Some("secret-env".into()));
        scope.set_user_key("secret-user");
        let shown = format!("{scope:?}");
        assert!(!shown.contains("secret"));
    }

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask_key("AIzaSy1234"), "••••••1234");
        assert_eq!(mask_key("abc"), "abc");
    }
}
