//! Cookie handling for the admin session and the guest identity.
//!
//! Neither cookie is a server-side session. `admin_auth=true` is a marker
//! scoped to `/admin`, issued only after the password procedure says yes.
//! The guest cookie holds the normalized email of the browser's prediction,
//! percent-encoded so that `;`, `,` and `"` in the local part survive the
//! cookie jar. It is only a hint and is always re-checked against the store.

use crate::domain::IdentityStore;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};

// ---

/// Admin marker cookie name.
pub const ADMIN_COOKIE: &str = "admin_auth";

/// Path the admin cookie is scoped to.
pub const ADMIN_COOKIE_PATH: &str = "/admin";

/// Guest identity cookie name.
pub const GUEST_COOKIE: &str = "gender_reveal_user_email";

/// Guest identity lifetime in seconds (one year).
const GUEST_COOKIE_MAX_AGE: i64 = 31_536_000;

// ---

/// Attributes shared by every cookie this service sets.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    /// Adds `Secure` in production deployments.
    pub secure: bool,
}

impl CookiePolicy {
    // ---
    fn attributes(&self, path: &str) -> String {
        // ---
        let mut attrs = format!("Path={path}; HttpOnly; SameSite=Lax");
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs
    }

    /// `Set-Cookie` value for a successful admin login. No expiry: browser-session lifetime.
    pub fn admin_login(&self) -> String {
        format!("{ADMIN_COOKIE}=true; {}", self.attributes(ADMIN_COOKIE_PATH))
    }

    /// `Set-Cookie` value that clears the admin marker.
    pub fn admin_logout(&self) -> String {
        format!(
            "{ADMIN_COOKIE}=; Max-Age=0; {}",
            self.attributes(ADMIN_COOKIE_PATH)
        )
    }

    fn guest_save(&self, email: &str) -> String {
        // ---
        let encoded = urlencoding::encode(email);
        format!(
            "{GUEST_COOKIE}={encoded}; Max-Age={GUEST_COOKIE_MAX_AGE}; {}",
            self.attributes("/")
        )
    }

    fn guest_clear(&self) -> String {
        format!("{GUEST_COOKIE}=; Max-Age=0; {}", self.attributes("/"))
    }
}

/// Returns the value of cookie `name` from the request headers, if present.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    // ---
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `true` when the request carries `admin_auth=true`.
pub fn is_admin(headers: &HeaderMap) -> bool {
    read_cookie(headers, ADMIN_COOKIE).as_deref() == Some("true")
}

/// Guest identity backed by the browser's cookie jar.
///
/// Reads come from the request; writes queue `Set-Cookie` headers that the
/// handler attaches to its response via [`CookieIdentity::apply`].
#[derive(Debug)]
pub struct CookieIdentity {
    current: Option<String>,
    policy: CookiePolicy,
    pending: Option<String>,
}

impl CookieIdentity {
    // ---
    pub fn from_headers(headers: &HeaderMap, policy: CookiePolicy) -> Self {
        // ---
        let current = read_cookie(headers, GUEST_COOKIE)
            .filter(|value| !value.is_empty())
            .and_then(|value| match urlencoding::decode(&value) {
                Ok(email) => Some(email.into_owned()),
                Err(err) => {
                    tracing::warn!("Ignoring undecodable guest cookie: {err}");
                    None
                }
            });
        Self {
            current,
            policy,
            pending: None,
        }
    }

    /// Appends any queued cookie change to `headers`.
    pub fn apply(self, headers: &mut HeaderMap) {
        // ---
        let Some(cookie) = self.pending else {
            return;
        };

        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(err) => tracing::warn!("Dropping unencodable guest cookie: {err}"),
        }
    }
}

impl IdentityStore for CookieIdentity {
    // ---
    fn load(&self) -> Option<String> {
        self.current.clone()
    }

    fn save(&mut self, email: &str) {
        // ---
        // Re-issued even when unchanged so the expiry keeps sliding forward.
        self.pending = Some(self.policy.guest_save(email));
        self.current = Some(email.to_string());
    }

    fn clear(&mut self) {
        // ---
        self.pending = Some(self.policy.guest_clear());
        self.current = None;
    }
}
