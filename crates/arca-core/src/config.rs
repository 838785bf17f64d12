//! Process configuration.
//!
//! All configuration is read once at startup into an explicit [`Config`]
//! struct and threaded through constructors. Business logic never reads
//! ambient environment state.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default recipient used when `NOTIFY_RECIPIENTS` is unset.
pub const DEFAULT_NOTIFY_RECIPIENT: &str = "docs-admin@localhost";

/// Default sender address for notification mail.
pub const DEFAULT_NOTIFY_SENDER: &str = "arca@localhost";

/// Top-level process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Shared-secret bearer token for the auth gate. `None` disables the
    /// gate (development mode).
    pub api_token: Option<String>,
    pub storage: StorageConfig,
    pub notify: NotifyConfig,
}

/// Attachment store backend selection.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Local disk storage serving objects from a configured public base URL.
    Filesystem {
        root: PathBuf,
        public_base_url: String,
    },
    /// Remote bucket API (Supabase-storage style).
    Http {
        base_url: String,
        bucket: String,
        api_key: String,
    },
}

/// Mail relay configuration.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// HTTP mail-relay endpoint. `None` disables outbound notifications.
    pub relay_url: Option<String>,
    pub api_key: Option<String>,
    pub sender: String,
    pub recipients: Vec<String>,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Call `dotenvy::dotenv()` beforehand if `.env` support is wanted.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| Error::Config("DATABASE_URL is required".to_string()))?;
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| Error::Config("PORT must be a number".to_string()))?;
        let api_token = std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty());

        let storage = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "filesystem".to_string())
            .as_str()
        {
            "filesystem" => StorageConfig::Filesystem {
                root: std::env::var("STORAGE_ROOT")
                    .unwrap_or_else(|_| "/var/lib/arca/files".to_string())
                    .into(),
                public_base_url: std::env::var("STORAGE_PUBLIC_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/files".to_string()),
            },
            "http" => StorageConfig::Http {
                base_url: std::env::var("STORAGE_URL")
                    .map_err(|_| Error::Config("STORAGE_URL is required for http storage".to_string()))?,
                bucket: std::env::var("STORAGE_BUCKET")
                    .unwrap_or_else(|_| "documents".to_string()),
                api_key: std::env::var("STORAGE_API_KEY")
                    .map_err(|_| Error::Config("STORAGE_API_KEY is required for http storage".to_string()))?,
            },
            other => {
                return Err(Error::Config(format!(
                    "unknown STORAGE_BACKEND '{}' (expected 'filesystem' or 'http')",
                    other
                )))
            }
        };

        let notify = NotifyConfig {
            relay_url: std::env::var("MAIL_RELAY_URL").ok().filter(|u| !u.is_empty()),
            api_key: std::env::var("MAIL_RELAY_KEY").ok().filter(|k| !k.is_empty()),
            sender: std::env::var("NOTIFY_SENDER")
                .unwrap_or_else(|_| DEFAULT_NOTIFY_SENDER.to_string()),
            recipients: parse_recipients(
                std::env::var("NOTIFY_RECIPIENTS").ok().as_deref(),
            ),
        };

        Ok(Self {
            database_url,
            host,
            port,
            api_token,
            storage,
            notify,
        })
    }
}

/// Parse a comma-delimited recipient list.
///
/// Entries are trimmed and empty entries dropped. An unset or all-blank
/// value falls back to [`DEFAULT_NOTIFY_RECIPIENT`].
pub fn parse_recipients(raw: Option<&str>) -> Vec<String> {
    let parsed: Vec<String> = raw
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if parsed.is_empty() {
        vec![DEFAULT_NOTIFY_RECIPIENT.to_string()]
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipients_single() {
        assert_eq!(parse_recipients(Some("ops@example.com")), vec!["ops@example.com"]);
    }

    #[test]
    fn test_parse_recipients_multiple_trimmed() {
        let parsed = parse_recipients(Some(" a@example.com , b@example.com,c@example.com "));
        assert_eq!(parsed, vec!["a@example.com", "b@example.com", "c@example.com"]);
    }

    #[test]
    fn test_parse_recipients_drops_empty_entries() {
        let parsed = parse_recipients(Some("a@example.com,, ,b@example.com,"));
        assert_eq!(parsed, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn test_parse_recipients_unset_uses_default() {
        assert_eq!(parse_recipients(None), vec![DEFAULT_NOTIFY_RECIPIENT]);
    }

    #[test]
    fn test_parse_recipients_blank_uses_default() {
        assert_eq!(parse_recipients(Some("  ,  ")), vec![DEFAULT_NOTIFY_RECIPIENT]);
    }
}
