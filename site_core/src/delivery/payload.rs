//! JSON body accepted by the transactional email provider

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EmailPayload {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub filename: String,
    /// Base64-encoded file content.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl Attachment {
    pub fn from_bytes(filename: &str, data: &[u8], content_type: Option<String>) -> Self {
        Self {
            filename: if filename.is_empty() {
                "attachment".to_string()
            } else {
                filename.to_string()
            },
            content: BASE64.encode(data),
            content_type,
        }
    }
}

impl EmailPayload {
    pub fn new(from: String, to: String, subject: String, html: String, text: String) -> Self {
        Self {
            from,
            to: vec![to],
            cc: None,
            reply_to: None,
            subject,
            html,
            text,
            attachments: None,
        }
    }

    pub fn with_cc(mut self, cc: Vec<String>) -> Self {
        if !cc.is_empty() {
            self.cc = Some(cc);
        }
        self
    }

    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        if !attachments.is_empty() {
            self.attachments = Some(attachments);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optionals_are_omitted_from_wire_shape() {
        let payload = EmailPayload::new(
            "Dry Force <ops@example.com>".to_string(),
            "ops@example.com".to_string(),
            "Subject".to_string(),
            "<p>hi</p>".to_string(),
            "hi".to_string(),
        );

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["to"], serde_json::json!(["ops@example.com"]));
        assert!(json.get("cc").is_none());
        assert!(json.get("reply_to").is_none());
        assert!(json.get("attachments").is_none());
    }

    #[test]
    fn test_populated_optionals_serialize() {
        let payload = EmailPayload::new(
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
            "e".to_string(),
        )
        .with_cc(vec!["cc@example.com".to_string()])
        .with_reply_to("customer@example.com".to_string())
        .with_attachments(vec![Attachment::from_bytes(
            "photo.png",
            b"\x89PNG",
            Some("image/png".to_string()),
        )]);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["cc"], serde_json::json!(["cc@example.com"]));
        assert_eq!(json["reply_to"], "customer@example.com");
        assert_eq!(json["attachments"][0]["filename"], "photo.png");
        assert_eq!(json["attachments"][0]["content_type"], "image/png");
    }

    #[test]
    fn test_attachment_content_is_base64() {
        let attachment = Attachment::from_bytes("a.txt", b"hello", None);
        assert_eq!(attachment.content, "aGVsbG8=");

        let json = serde_json::to_value(&attachment).unwrap();
        assert!(json.get("content_type").is_none());
    }

    #[test]
    fn test_empty_filename_falls_back() {
        let attachment = Attachment::from_bytes("", b"x", None);
        assert_eq!(attachment.filename, "attachment");
    }

    #[test]
    fn test_empty_cc_and_attachments_stay_absent() {
        let payload = EmailPayload::new(
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
            "e".to_string(),
        )
        .with_cc(Vec::new())
        .with_attachments(Vec::new());

        assert!(payload.cc.is_none());
        assert!(payload.attachments.is_none());
    }
}
