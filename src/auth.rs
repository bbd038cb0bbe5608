//! Single-account allow-list.
//!
//! An upstream identity provider asserts a login handle; access is granted
//! only when it matches the one configured handle, ignoring case. No
//! configured handle means nobody gets in.

use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct AuthGate {
    allowed: Option<String>,
}

impl AuthGate {
    pub fn new(allowed: Option<&str>) -> Self {
        let allowed = allowed
            .map(str::trim)
            .filter(|login| !login.is_empty())
            .map(str::to_lowercase);
        if allowed.is_none() {
            warn!("no allowed login configured, every request will be denied");
        }
        Self { allowed }
    }

    pub fn is_configured(&self) -> bool {
        self.allowed.is_some()
    }

    pub fn authorize(&self, login: Option<&str>) -> bool {
        match (&self.allowed, login) {
            (Some(allowed), Some(login)) => login.trim().to_lowercase() == *allowed,
            _ => false,
        }
    }
}
