//! # arca-notify
//!
//! Mail-relay notification adapter for arca.
//!
//! [`MailRelayNotifier`] translates a created-document event into a mail
//! payload and posts it to an HTTP mail relay. Whatever the relay's native
//! error shape, the caller always receives a uniform
//! [`NotificationOutcome`]: this adapter never raises, because
//! notification is explicitly non-critical.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use arca_core::{DocumentCreatedNotice, NotificationOutcome, Notifier, NotifyConfig};

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifier posting mail through an HTTP relay endpoint.
pub struct MailRelayNotifier {
    client: reqwest::Client,
    relay_url: String,
    api_key: Option<String>,
    sender: String,
    recipients: Vec<String>,
}

/// Wire payload accepted by the mail relay.
#[derive(Debug, Serialize)]
struct MailPayload {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

impl MailRelayNotifier {
    /// Build a notifier from configuration.
    ///
    /// Returns `None` when no relay URL is configured; callers fall back to
    /// [`arca_core::NoOpNotifier`].
    pub fn from_config(config: &NotifyConfig) -> Option<Self> {
        let relay_url = config.relay_url.clone()?;
        let client = reqwest::Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .unwrap_or_default();
        Some(Self {
            client,
            relay_url,
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
            recipients: config.recipients.clone(),
        })
    }

    fn payload(&self, notice: &DocumentCreatedNotice) -> MailPayload {
        MailPayload {
            from: self.sender.clone(),
            to: self.recipients.clone(),
            subject: build_subject(&notice.title),
            html: build_html_body(notice),
        }
    }
}

#[async_trait]
impl Notifier for MailRelayNotifier {
    async fn notify(&self, notice: DocumentCreatedNotice) -> NotificationOutcome {
        debug!(
            subsystem = "notify",
            component = "mail_relay",
            op = "notify",
            recipients = self.recipients.len(),
            "sending notification"
        );

        let mut request = self.client.post(&self.relay_url).json(&self.payload(&notice));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => NotificationOutcome::delivered(),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                NotificationOutcome::failed(format!("relay rejected: {} {}", status, body))
            }
            Err(e) => NotificationOutcome::failed(format!("relay unreachable: {}", e)),
        }
    }
}

/// Subject line for a created-document notification.
pub fn build_subject(title: &str) -> String {
    format!("New document uploaded: {}", title)
}

/// HTML body for a created-document notification.
///
/// Carries the title, a content excerpt, and, when an attachment exists,
/// the file name and a download link.
pub fn build_html_body(notice: &DocumentCreatedNotice) -> String {
    let mut body = String::from("<h2>New document uploaded</h2>\n");
    body.push_str(&format!(
        "<p><strong>Title:</strong> {}</p>\n",
        escape_html(&notice.title)
    ));

    if !notice.content_excerpt.is_empty() {
        body.push_str(&format!(
            "<p><strong>Content:</strong> {}</p>\n",
            escape_html(&notice.content_excerpt)
        ));
    }

    if let Some(file_name) = &notice.file_name {
        body.push_str(&format!(
            "<p><strong>File:</strong> {}</p>\n",
            escape_html(file_name)
        ));
        if let Some(file_url) = &notice.file_url {
            body.push_str(&format!(
                "<p><a href=\"{}\">Download file</a></p>\n",
                escape_html(file_url)
            ));
        }
    }

    body
}

/// Minimal HTML escaping for text interpolated into the mail body.
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arca_core::parse_recipients;

    fn notice(file: bool) -> DocumentCreatedNotice {
        DocumentCreatedNotice {
            title: "Spec v1".to_string(),
            content_excerpt: "body text".to_string(),
            file_name: file.then(|| "a.pdf".to_string()),
            file_url: file.then(|| "https://files.test/docs/1_ab.pdf".to_string()),
        }
    }

    fn config(relay_url: Option<&str>) -> NotifyConfig {
        NotifyConfig {
            relay_url: relay_url.map(str::to_string),
            api_key: None,
            sender: "arca@localhost".to_string(),
            recipients: parse_recipients(Some("a@example.com, b@example.com")),
        }
    }

    #[test]
    fn test_from_config_requires_relay_url() {
        assert!(MailRelayNotifier::from_config(&config(None)).is_none());
        assert!(MailRelayNotifier::from_config(&config(Some("http://relay"))).is_some());
    }

    #[test]
    fn test_subject_carries_title() {
        assert_eq!(
            build_subject("Spec v1"),
            "New document uploaded: Spec v1"
        );
    }

    #[test]
    fn test_body_with_file_has_download_link() {
        let body = build_html_body(&notice(true));
        assert!(body.contains("Spec v1"));
        assert!(body.contains("body text"));
        assert!(body.contains("a.pdf"));
        assert!(body.contains("https://files.test/docs/1_ab.pdf"));
    }

    #[test]
    fn test_body_without_file_has_no_link() {
        let body = build_html_body(&notice(false));
        assert!(body.contains("Spec v1"));
        assert!(!body.contains("Download"));
    }

    #[test]
    fn test_body_escapes_markup_in_title() {
        let mut n = notice(false);
        n.title = "<script>alert(1)</script>".to_string();
        let body = build_html_body(&n);
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_payload_addresses_all_recipients() {
        let notifier = MailRelayNotifier::from_config(&config(Some("http://relay"))).unwrap();
        let payload = notifier.payload(&notice(false));
        assert_eq!(payload.to, vec!["a@example.com", "b@example.com"]);
        assert_eq!(payload.from, "arca@localhost");
        assert_eq!(payload.subject, "New document uploaded: Spec v1");
    }
}
