use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::info;
use wrenchly_config::ClerkSettings;

// ---- Error type ----------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ClerkError {
    /// The email already belongs to a provider account. Not a failure for
    /// invitation issuance; the caller patches that account instead.
    #[error("Email address is taken")]
    EmailTaken,
    /// The provider already holds an invitation for this email.
    #[error("An invitation for this email already exists")]
    DuplicateInvitation,
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("Clerk API error: {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

// ---- Wire types ----------------------------------------------------------

/// Metadata attached to a provider invitation (and, for pre-existing
/// accounts, patched onto the user). The `invitation_token` is the
/// durable correlation key back to the local `shop_invitations` record.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationMetadata {
    pub role: String,
    pub shop_id: String,
    pub invitation_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanic_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClerkUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<ClerkEmailAddress>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub public_metadata: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClerkEmailAddress {
    pub id: String,
    pub email_address: String,
}

impl ClerkUser {
    /// The account's primary email, falling back to the first address.
    pub fn primary_email(&self) -> Option<&str> {
        let by_id = self.primary_email_address_id.as_ref().and_then(|pid| {
            self.email_addresses
                .iter()
                .find(|e| &e.id == pid)
                .map(|e| e.email_address.as_str())
        });
        by_id.or_else(|| {
            self.email_addresses
                .first()
                .map(|e| e.email_address.as_str())
        })
    }
}

/// Webhook envelope (minimal deserialization, same as any provider event
/// stream: type tag plus an opaque object).
#[derive(Debug, Deserialize)]
pub struct ClerkEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ClerkErrorBody {
    #[serde(default)]
    errors: Vec<ClerkApiError>,
}

#[derive(Debug, Deserialize)]
struct ClerkApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    long_message: Option<String>,
}

// ---- Service -------------------------------------------------------------

pub struct ClerkService {
    settings: ClerkSettings,
    client: reqwest::Client,
}

impl ClerkService {
    pub fn new(settings: &ClerkSettings) -> Self {
        Self {
            settings: settings.clone(),
            client: reqwest::Client::new(),
        }
    }

    // ---- Invitations -----------------------------------------------------

    /// Create a provider invitation carrying our correlation metadata.
    /// Returns the provider invitation id.
    pub async fn create_invitation(
        &self,
        email: &str,
        metadata: &InvitationMetadata,
        redirect_url: &str,
    ) -> Result<String, ClerkError> {
        let body = serde_json::json!({
            "email_address": email,
            "public_metadata": metadata,
            "redirect_url": redirect_url,
            "notify": true,
        });

        let resp = self
            .client
            .post(format!("{}/invitations", self.settings.api_base))
            .bearer_auth(&self.settings.secret_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(map_api_error(status.as_u16(), resp.text().await?));
        }

        let json: serde_json::Value = resp.json().await?;
        let id = json["id"]
            .as_str()
            .ok_or_else(|| ClerkError::Parse("No invitation id in response".to_string()))?
            .to_string();

        info!(invitation_id = %id, "Created provider invitation");
        Ok(id)
    }

    // ---- Users -----------------------------------------------------------

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<ClerkUser>, ClerkError> {
        let url = format!(
            "{}/users?email_address={}",
            self.settings.api_base,
            urlencoding::encode(email)
        );

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.settings.secret_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(map_api_error(status.as_u16(), resp.text().await?));
        }

        let users: Vec<ClerkUser> = resp
            .json()
            .await
            .map_err(|e| ClerkError::Parse(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Merge public metadata onto an existing provider account. Used when
    /// invitation creation reports the email as taken: no invitation flow
    /// will fire for that account, so the metadata must ride on the user.
    pub async fn update_user_metadata(
        &self,
        clerk_user_id: &str,
        metadata: &InvitationMetadata,
    ) -> Result<(), ClerkError> {
        let body = serde_json::json!({ "public_metadata": metadata });

        let resp = self
            .client
            .patch(format!(
                "{}/users/{clerk_user_id}/metadata",
                self.settings.api_base
            ))
            .bearer_auth(&self.settings.secret_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(map_api_error(status.as_u16(), resp.text().await?));
        }

        info!(clerk_user_id, "Patched provider user metadata");
        Ok(())
    }

    // ---- Webhook verification --------------------------------------------

    /// Verify a webhook signature (Svix scheme: HMAC-SHA256 over
    /// `"{id}.{timestamp}.{body}"`, keyed with the base64 secret after the
    /// `whsec_` prefix, signature base64 in a space-delimited `v1,<sig>`
    /// header list).
    pub fn verify_webhook(
        webhook_secret: &str,
        msg_id: &str,
        timestamp: &str,
        signature_header: &str,
        payload: &[u8],
    ) -> Result<(), ClerkError> {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        let secret = webhook_secret
            .strip_prefix("whsec_")
            .unwrap_or(webhook_secret);
        let key = BASE64
            .decode(secret)
            .map_err(|_| ClerkError::InvalidSignature)?;

        let signed_content = format!(
            "{msg_id}.{timestamp}.{}",
            String::from_utf8_lossy(payload)
        );

        let mut mac = Hmac::<Sha256>::new_from_slice(&key)
            .map_err(|_| ClerkError::InvalidSignature)?;
        mac.update(signed_content.as_bytes());
        let expected = BASE64.encode(mac.finalize().into_bytes());

        let matched = signature_header.split_whitespace().any(|part| {
            part.strip_prefix("v1,")
                .is_some_and(|sig| sig == expected)
        });

        if matched {
            Ok(())
        } else {
            Err(ClerkError::InvalidSignature)
        }
    }
}

/// Map a provider error payload onto the outcomes issuance branches on.
fn map_api_error(status: u16, body: String) -> ClerkError {
    if let Ok(parsed) = serde_json::from_str::<ClerkErrorBody>(&body) {
        if let Some(err) = parsed.errors.first() {
            let message = err
                .long_message
                .clone()
                .unwrap_or_else(|| err.message.clone());
            let lower = message.to_lowercase();

            if err.code == "form_identifier_exists"
                || lower.contains("email address is taken")
                || lower.contains("already exists")
            {
                return ClerkError::EmailTaken;
            }
            if err.code == "duplicate_record" || lower.contains("invitation already exists") {
                return ClerkError::DuplicateInvitation;
            }
            return ClerkError::Api { status, message };
        }
    }
    ClerkError::Api {
        status,
        message: body,
    }
}
