//! Retrying HTTP client for the notification provider

use std::time::Duration;

use reqwest::{Client, Response};

use crate::config::DeliveryConfig;
use crate::delivery::payload::EmailPayload;

/// Sends provider requests with a per-attempt deadline and a bounded
/// linear-backoff retry. Transport and timeout failures are retried;
/// a response with any HTTP status is returned as-is and callers must
/// inspect `Response::status()` themselves.
#[derive(Clone)]
pub struct Mailer {
    client: Client,
    timeout: Duration,
    retry_delay: Duration,
    max_retries: u32,
}

impl Mailer {
    pub fn new(config: &DeliveryConfig) -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_millis(config.timeout_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            max_retries: config.max_retries,
        }
    }

    pub async fn send_with_retry(
        &self,
        endpoint: &str,
        api_key: &str,
        payload: &EmailPayload,
    ) -> Result<Response, reqwest::Error> {
        let mut attempt: u32 = 0;

        loop {
            let result = self
                .client
                .post(endpoint)
                .bearer_auth(api_key)
                .json(payload)
                .timeout(self.timeout)
                .send()
                .await;

            match result {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.max_retries => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %err,
                        "delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay * (attempt + 1)).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(
                        attempts = attempt + 1,
                        error = %err,
                        "delivery failed after all attempts"
                    );
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn mailer(timeout_ms: u64, retry_delay_ms: u64, max_retries: u32) -> Mailer {
        Mailer::new(&DeliveryConfig {
            timeout_ms,
            retry_delay_ms,
            max_retries,
            max_inflight: 10,
        })
    }

    fn payload() -> EmailPayload {
        EmailPayload::new(
            "Ops <ops@example.com>".to_string(),
            "ops@example.com".to_string(),
            "Test".to_string(),
            "<p>test</p>".to_string(),
            "test".to_string(),
        )
    }

    /// Accepts one connection, reads the request, answers with the given
    /// status line and a small JSON body.
    async fn stub_provider(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64 * 1024];
            let mut read = 0;

            // Read until the headers and the announced body are in.
            loop {
                let n = stream.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
                let head = String::from_utf8_lossy(&buf[..read]);
                if let Some(header_end) = head.find("\r\n\r\n") {
                    let content_length = head
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if read >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let body = r#"{"id":"stub"}"#;
            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });

        format!("http://{addr}/emails")
    }

    #[tokio::test]
    async fn test_successful_send() {
        let endpoint = stub_provider("HTTP/1.1 200 OK").await;
        let mailer = mailer(2000, 10, 1);

        let response = mailer
            .send_with_retry(&endpoint, "test-key", &payload())
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn test_non_2xx_is_returned_not_retried() {
        // The stub serves exactly one connection; a retry would hang on
        // the second connect and fail this test's timeout budget.
        let endpoint = stub_provider("HTTP/1.1 422 Unprocessable Entity").await;
        let mailer = mailer(2000, 10, 1);

        let response = mailer
            .send_with_retry(&endpoint, "test-key", &payload())
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 422);
    }

    #[tokio::test]
    async fn test_connect_failure_exhausts_retries() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mailer = mailer(500, 50, 1);
        let started = Instant::now();
        let result = mailer
            .send_with_retry(&format!("http://{addr}/emails"), "test-key", &payload())
            .await;

        assert!(result.is_err());
        // One backoff sleep between the two physical attempts.
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
