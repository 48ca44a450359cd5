//! Bot-challenge token verification
//!
//! Verifies a challenge token against the provider's siteverify
//! endpoint. Implemented and exported, but not called from any of the
//! submission handlers; the forms currently rely on the honeypot and
//! rate limiting alone.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::config::BotConfig;
use crate::delivery::InflightGate;

const TIMEOUT: Duration = Duration::from_millis(4000);
const RETRY_DELAY: Duration = Duration::from_millis(250);
const MAX_RETRIES: u32 = 1;
const MAX_INFLIGHT: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    MissingToken,
    MissingSecret,
    Busy,
    VerifyFailed,
    Invalid,
    Unreachable,
}

impl Verdict {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verdict::Verified)
    }
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Clone)]
pub struct BotVerifier {
    client: reqwest::Client,
    verify_url: String,
    secret_key: String,
    gate: InflightGate,
}

impl BotVerifier {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            verify_url: config.verify_url.clone(),
            secret_key: config.secret_key.clone(),
            gate: InflightGate::new(MAX_INFLIGHT),
        }
    }

    pub async fn verify_token(&self, token: &str, remote_ip: Option<&str>) -> Verdict {
        if token.is_empty() {
            return Verdict::MissingToken;
        }

        if self.secret_key.is_empty() {
            return Verdict::MissingSecret;
        }

        let _permit = match self.gate.try_acquire() {
            Some(permit) => permit,
            None => return Verdict::Busy,
        };

        let mut params = vec![
            ("secret", self.secret_key.as_str()),
            ("response", token),
        ];
        if let Some(ip) = remote_ip {
            params.push(("remoteip", ip));
        }

        let response = match self.post_with_retry(&params).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "bot verification request failed");
                return Verdict::Unreachable;
            }
        };

        if !response.status().is_success() {
            warn!(
                status = response.status().as_u16(),
                "bot verification endpoint returned an error"
            );
            return Verdict::VerifyFailed;
        }

        match response.json::<VerifyResponse>().await {
            Ok(body) if body.success => Verdict::Verified,
            Ok(_) => Verdict::Invalid,
            Err(err) => {
                warn!(error = %err, "bot verification response was unreadable");
                return Verdict::Unreachable;
            }
        }
    }

    async fn post_with_retry(
        &self,
        params: &[(&str, &str)],
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut attempt: u32 = 0;

        loop {
            let result = self
                .client
                .post(&self.verify_url)
                .form(params)
                .timeout(TIMEOUT)
                .send()
                .await;

            match result {
                Ok(response) => return Ok(response),
                Err(err) if attempt < MAX_RETRIES => {
                    warn!(attempt = attempt + 1, error = %err, "bot verification retry");
                    tokio::time::sleep(RETRY_DELAY * (attempt + 1)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier(secret: &str) -> BotVerifier {
        BotVerifier::new(&BotConfig {
            verify_url: "http://127.0.0.1:9/siteverify".to_string(),
            secret_key: secret.to_string(),
        })
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits() {
        let verdict = verifier("secret").verify_token("", None).await;
        assert_eq!(verdict, Verdict::MissingToken);
    }

    #[tokio::test]
    async fn test_missing_secret_short_circuits() {
        let verdict = verifier("").verify_token("token", None).await;
        assert_eq!(verdict, Verdict::MissingSecret);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        // Port 9 (discard) has no listener; both attempts fail.
        let verdict = verifier("secret").verify_token("token", Some("203.0.113.9")).await;
        assert_eq!(verdict, Verdict::Unreachable);
        assert!(!verdict.is_verified());
    }
}
