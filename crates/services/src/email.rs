use tracing::info;
use wrenchly_config::EmailSettings;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Email delivery is disabled")]
    Disabled,
    #[error("Email API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Transactional email client (Resend-style JSON API).
///
/// Delivery is best effort throughout: callers report whether a send
/// succeeded, they never fail the surrounding request because of it.
pub struct EmailService {
    settings: EmailSettings,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(settings: &EmailSettings) -> Self {
        Self {
            settings: settings.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        if !self.settings.enabled {
            return Err(EmailError::Disabled);
        }

        let body = serde_json::json!({
            "from": self.settings.from,
            "to": [to],
            "subject": subject,
            "html": html,
        });

        let resp = self
            .client
            .post(format!("{}/emails", self.settings.api_base))
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EmailError::Api {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        info!(to, subject, "Sent email");
        Ok(())
    }

    /// Confirmation to someone who just joined the waitlist.
    pub async fn waitlist_confirmation(
        &self,
        to: &str,
        name: Option<&str>,
    ) -> Result<(), EmailError> {
        let greeting = name.map_or_else(|| "Hi".to_string(), |n| format!("Hi {n}"));
        let html = format!(
            "<p>{greeting},</p>\
             <p>You're on the Wrenchly waitlist. We'll reach out as soon as \
             your spot opens up.</p>\
             <p>— The Wrenchly team</p>"
        );
        self.send(to, "You're on the Wrenchly waitlist", &html).await
    }

    /// Internal heads-up about a new waitlist signup.
    pub async fn waitlist_notification(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<(), EmailError> {
        let html = format!(
            "<p>New waitlist signup:</p>\
             <p><strong>{}</strong> &lt;{email}&gt;</p>",
            name.unwrap_or("(no name)")
        );
        let to = self.settings.notify_to.clone();
        self.send(&to, "New waitlist signup", &html).await
    }
}
