use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MailError;

const DEFAULT_BASE_URL: &str = "https://api.postmarkapp.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    message_stream: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    #[serde(rename = "MessageID", default)]
    message_id: Option<String>,
    #[serde(rename = "ErrorCode", default)]
    error_code: i64,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

/// Client for the transactional email API.
///
/// Manages the HTTP client, server token, sender address, and base URL.
/// Use [`EmailClient::new`] for production or [`EmailClient::with_base_url`]
/// to point at a mock server in tests.
pub struct EmailClient {
    client: reqwest::Client,
    server_token: String,
    from: String,
    base_url: String,
}

impl EmailClient {
    /// Creates a new client pointed at the production email API.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(server_token: &str, from: &str, timeout_secs: u64) -> Result<Self, MailError> {
        Self::with_base_url(server_token, from, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        server_token: &str,
        from: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pickle/0.1 (daily-digest)")
            .build()?;

        Ok(Self {
            client,
            server_token: server_token.to_owned(),
            from: from.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Sends one HTML email, returning the provider's message id.
    ///
    /// # Errors
    ///
    /// - [`MailError::Http`] on network failure or a non-2xx status.
    /// - [`MailError::Api`] if the provider reports a non-zero error code.
    /// - [`MailError::Deserialize`] if the response is not the expected
    ///   shape.
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<String, MailError> {
        let url = format!("{}/email", self.base_url);
        let request = SendEmailRequest {
            from: &self.from,
            to,
            subject,
            html_body,
            message_stream: "outbound",
        };

        let response = self
            .client
            .post(&url)
            .header("X-Postmark-Server-Token", &self.server_token)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: SendEmailResponse =
            serde_json::from_str(&body).map_err(|e| MailError::Deserialize {
                context: format!("send response for {to}"),
                source: e,
            })?;

        if parsed.error_code != 0 {
            return Err(MailError::Api(
                parsed
                    .message
                    .unwrap_or_else(|| format!("error code {}", parsed.error_code)),
            ));
        }

        Ok(parsed.message_id.unwrap_or_default())
    }
}
