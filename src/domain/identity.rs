/// Browser-held hint of "who predicted from here".
///
/// The stored email is advisory. Callers confirm it against the prediction
/// store and clear it when the lookup comes back empty.
pub trait IdentityStore {
    // ---
    fn load(&self) -> Option<String>;

    fn save(&mut self, email: &str);

    fn clear(&mut self);
}

/// Process-local identity, for tests and non-HTTP callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentity {
    email: Option<String>,
}

impl MemoryIdentity {
    // ---
    pub fn with_email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
        }
    }
}

impl IdentityStore for MemoryIdentity {
    // ---
    fn load(&self) -> Option<String> {
        self.email.clone()
    }

    fn save(&mut self, email: &str) {
        self.email = Some(email.to_string());
    }

    fn clear(&mut self) {
        self.email = None;
    }
}
