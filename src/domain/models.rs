use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static URL_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("scheme pattern is valid"));

/// Minimum number of characters in a trimmed display name.
pub const MIN_NAME_LEN: usize = 2;

/// A guest's guess, and also the gender the admin eventually reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Guess {
    Boy,
    Girl,
}

impl Guess {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            Guess::Boy => "boy",
            Guess::Girl => "girl",
        }
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Guess {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // ---
        match value {
            "boy" => Ok(Guess::Boy),
            "girl" => Ok(Guess::Girl),
            other => Err(anyhow::anyhow!("unknown guess: {other}")),
        }
    }
}

/// A guest prediction. Created once, never mutated, hard-deleted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    // ---
    pub id: Uuid,
    pub name: String,
    /// Always stored trimmed and lower-cased.
    pub email: String,
    pub prediction: Guess,
    pub created_at: DateTime<Utc>,
}

/// The global reveal configuration. Exactly one row exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealState {
    // ---
    pub id: Uuid,
    pub countdown_date: DateTime<Utc>,
    /// `None` until the admin picks one.
    pub gender: Option<Guess>,
    pub is_revealed: bool,
    pub updated_at: DateTime<Utc>,
}

/// Fields an admin may change on the reveal singleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealUpdate {
    // ---
    pub countdown_date: DateTime<Utc>,
    pub gender: Option<Guess>,
    pub is_revealed: bool,
}

/// A named link to an external gift registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    // ---
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// A guest submission that has passed validation and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrediction {
    name: String,
    email: String,
    guess: Guess,
}

impl NewPrediction {
    // ---

    /// Validates raw form input, collecting every failing field.
    pub fn parse(name: &str, email: &str, guess: Option<&str>) -> Result<Self, FieldErrors> {
        // ---
        let mut errors = FieldErrors::new();

        let name = name.trim();
        if name.is_empty() {
            errors.insert("name", "Name is required".to_string());
        } else if name.chars().count() < MIN_NAME_LEN {
            errors.insert("name", "Name must be at least 2 characters".to_string());
        }

        let email = normalize_email(email);
        if email.is_empty() {
            errors.insert("email", "Email is required".to_string());
        } else if !is_valid_email(&email) {
            errors.insert("email", "Please enter a valid email address".to_string());
        }

        let guess = guess.and_then(|g| g.parse::<Guess>().ok());
        if guess.is_none() {
            errors.insert("prediction", "Please select a prediction".to_string());
        }

        match guess {
            Some(guess) if errors.is_empty() => Ok(Self {
                name: name.to_string(),
                email,
                guess,
            }),
            _ => Err(errors),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn guess(&self) -> Guess {
        self.guess
    }
}

/// A registry link ready to insert, with its URL scheme guaranteed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistry {
    name: String,
    url: String,
}

impl NewRegistry {
    // ---
    pub fn parse(name: &str, url: &str) -> Result<Self, FieldErrors> {
        // ---
        let mut errors = FieldErrors::new();
        let name = name.trim();
        let url = url.trim();

        if name.is_empty() {
            errors.insert("name", "Store name is required".to_string());
        }
        if url.is_empty() {
            errors.insert("url", "Registry URL is required".to_string());
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            name: name.to_string(),
            url: normalize_registry_url(url),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Trims and lower-cases an email so lookups and the unique constraint agree.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Prepends `https://` unless the URL already carries an http(s) scheme.
pub fn normalize_registry_url(url: &str) -> String {
    // ---
    if URL_SCHEME.is_match(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Accepts either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_countdown_date(value: &str) -> anyhow::Result<DateTime<Utc>> {
    // ---
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("invalid countdown date: {value}"))?;

    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn submission_is_trimmed_and_lowercased() {
        // ---
        let parsed = NewPrediction::parse("  Ada ", "  ADA@X.com ", Some("girl")).unwrap();

        assert_eq!(parsed.name(), "Ada");
        assert_eq!(parsed.email(), "ada@x.com");
        assert_eq!(parsed.guess(), Guess::Girl);
    }

    #[test]
    fn submission_collects_every_field_error() {
        // ---
        let errors = NewPrediction::parse(" ", "not-an-email", None).unwrap_err();

        assert_eq!(errors.get("name").unwrap(), "Name is required");
        assert_eq!(errors.get("email").unwrap(), "Please enter a valid email address");
        assert_eq!(errors.get("prediction").unwrap(), "Please select a prediction");
    }

    #[test]
    fn short_name_and_missing_email_are_rejected() {
        // ---
        let errors = NewPrediction::parse("A", "   ", Some("boy")).unwrap_err();

        assert_eq!(errors.get("name").unwrap(), "Name must be at least 2 characters");
        assert_eq!(errors.get("email").unwrap(), "Email is required");
        assert!(!errors.contains_key("prediction"));
    }

    #[test]
    fn unknown_guess_is_rejected() {
        // ---
        let errors = NewPrediction::parse("Ada", "ada@x.com", Some("twins")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("prediction"));
    }

    #[test]
    fn registry_url_gets_https_scheme() {
        // ---
        assert_eq!(
            normalize_registry_url("example.com/registry"),
            "https://example.com/registry"
        );
        assert_eq!(normalize_registry_url("http://a.com"), "http://a.com");
        assert_eq!(normalize_registry_url("HTTPS://A.com"), "HTTPS://A.com");
    }

    #[test]
    fn registry_requires_name_and_url() {
        // ---
        let errors = NewRegistry::parse("  ", "").unwrap_err();
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("url"));

        let registry = NewRegistry::parse(" Target ", " target.com/baby ").unwrap();
        assert_eq!(registry.name(), "Target");
        assert_eq!(registry.url(), "https://target.com/baby");
    }

    #[test]
    fn countdown_date_accepts_date_or_timestamp() {
        // ---
        let bare = parse_countdown_date("2026-03-24").unwrap();
        assert_eq!(bare.to_rfc3339(), "2026-03-24T00:00:00+00:00");

        let full = parse_countdown_date("2026-03-24T18:30:00+02:00").unwrap();
        assert_eq!(full.to_rfc3339(), "2026-03-24T16:30:00+00:00");

        assert!(parse_countdown_date("next tuesday").is_err());
    }

    #[test]
    fn guess_serializes_lowercase() {
        // ---
        assert_eq!(serde_json::to_string(&Guess::Boy).unwrap(), "\"boy\"");
        let parsed: Guess = serde_json::from_str("\"girl\"").unwrap();
        assert_eq!(parsed, Guess::Girl);
    }
}
