/// Default shared passcode for the access gate
pub const DEFAULT_ACCESS_CODE: &str = "EMMA2025";

/// Client-side passcode gate. Not a security boundary.
#[derive(Debug, Clone)]
pub struct AccessGate {
    code: String,
}

impl AccessGate {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// Trimmed, case-insensitive comparison against the configured code
    pub fn check(&self, attempt: &str) -> bool {
        attempt.trim().to_uppercase() == self.code.trim().to_uppercase()
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(DEFAULT_ACCESS_CODE)
    }
}
