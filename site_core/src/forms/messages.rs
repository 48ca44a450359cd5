//! Notification body builders
//!
//! HTML and plain-text renderings of the operator notifications and the
//! customer confirmation. All user-originated strings are escaped before
//! they reach HTML.

use crate::forms::fields::UploadedFile;
use crate::forms::validate::{AssessmentData, CallbackData, QuoteData};

pub const QUOTE_INTERNAL_SUBJECT: &str = "New Quote Request - Dry Force";
pub const QUOTE_CONFIRMATION_SUBJECT: &str = "We received your request - Dry Force";
pub const ASSESSMENT_SUBJECT: &str = "New Assessment Booking - Dry Force";
pub const CALLBACK_SUBJECT: &str = "New Callback Request - Dry Force";

const HOTLINE: &str = "0860 800 800";

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn or_not_provided(value: &str) -> &str {
    if value.is_empty() {
        "Not provided"
    } else {
        value
    }
}

fn detail_rows(details: &[(&str, &str)]) -> String {
    details
        .iter()
        .map(|(label, value)| {
            format!(
                "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
                escape_html(label),
                escape_html(value)
            )
        })
        .collect()
}

fn detail_lines(details: &[(&str, &str)]) -> String {
    details
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn attachment_summary(files: &[UploadedFile]) -> String {
    files
        .iter()
        .map(|file| {
            format!(
                "{} ({} KB)",
                if file.filename.is_empty() {
                    "Attachment"
                } else {
                    file.filename.as_str()
                },
                file.size() / 1024
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote_details(data: &QuoteData) -> Vec<(&'static str, &str)> {
    vec![
        ("Name", or_not_provided(&data.full_name)),
        ("Email", &data.email),
        ("Phone", or_not_provided(&data.phone)),
        ("Service Type", or_not_provided(&data.service_type)),
        ("Property Address", or_not_provided(&data.address)),
    ]
}

/// Operator notification for a quote request.
pub fn quote_internal(data: &QuoteData, files: &[UploadedFile]) -> (String, String) {
    let details = quote_details(data);

    let description_html = if data.description.is_empty() {
        "Not provided".to_string()
    } else {
        escape_html(&data.description).replace('\n', "<br />")
    };

    let attachments_html = if files.is_empty() {
        "<p>None</p>".to_string()
    } else {
        let items: String = files
            .iter()
            .map(|file| {
                format!(
                    "<li>{} ({} KB)</li>",
                    escape_html(or_not_provided(&file.filename)),
                    file.size() / 1024
                )
            })
            .collect();
        format!("<ul>{items}</ul>")
    };

    let html = format!(
        "<h2>New Quote Request</h2>\
         <p>A new request was submitted from the website.</p>\
         <table cellspacing=\"0\" cellpadding=\"6\" style=\"border-collapse:collapse;\">\
         {}<tr><td><strong>Damage Description</strong></td><td>{}</td></tr></table>\
         <p><strong>Attachments:</strong></p>{}",
        detail_rows(&details),
        description_html,
        attachments_html,
    );

    let text = format!(
        "New Quote Request\n\n{}\nDamage Description: {}\nAttachments: {}",
        detail_lines(&details),
        or_not_provided(&data.description),
        if files.is_empty() {
            "None".to_string()
        } else {
            attachment_summary(files)
        },
    );

    (html, text)
}

/// Confirmation sent back to the customer who requested a quote.
pub fn quote_confirmation(data: &QuoteData, files: &[UploadedFile]) -> (String, String) {
    let details = quote_details(data);
    let name = if data.full_name.is_empty() {
        "there"
    } else {
        data.full_name.as_str()
    };

    let detail_items: String = details
        .iter()
        .map(|(label, value)| {
            format!(
                "<li><strong>{}:</strong> {}</li>",
                escape_html(label),
                escape_html(value)
            )
        })
        .collect();

    let received_html = if files.is_empty() {
        String::new()
    } else {
        let names = files
            .iter()
            .map(|file| escape_html(or_not_provided(&file.filename)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("<p><strong>Attachments received:</strong> {names}</p>")
    };

    let html = format!(
        "<p>Hi {},</p>\
         <p>Thank you for contacting Dry Force. We have received your request and our team will be in touch soon.</p>\
         <p><strong>Request summary:</strong></p><ul>{detail_items}</ul>{received_html}\
         <p>If this is urgent, please call us on {HOTLINE}.</p>",
        escape_html(name),
    );

    let mut text_lines = vec![
        format!("Hi {name},"),
        String::new(),
        "Thank you for contacting Dry Force. We have received your request and our team will be in touch soon.".to_string(),
        String::new(),
        "Request summary:".to_string(),
        detail_lines(&details),
    ];
    if !files.is_empty() {
        text_lines.push(format!(
            "Attachments received: {}",
            files
                .iter()
                .map(|file| or_not_provided(&file.filename).to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    text_lines.push(String::new());
    text_lines.push(format!("If this is urgent, please call us on {HOTLINE}."));

    (html, text_lines.join("\n"))
}

/// Operator notification for an emergency assessment booking.
pub fn assessment_notification(data: &AssessmentData) -> (String, String) {
    let date = data.preferred_date.format("%Y-%m-%d").to_string();
    let details = vec![
        ("Incident", data.service.label()),
        ("Name", data.full_name.as_str()),
        ("Phone", data.phone.as_str()),
        ("Preferred Date", date.as_str()),
        ("Preferred Time", data.preferred_time.as_str()),
        ("Metro Area", data.location.as_str()),
        ("Severity", data.severity.label()),
    ];

    let html = format!(
        "<h2>New Assessment Booking</h2>\
         <p>A damage assessment was booked from the website.</p>\
         <table cellspacing=\"0\" cellpadding=\"6\" style=\"border-collapse:collapse;\">{}</table>",
        detail_rows(&details),
    );

    let text = format!("New Assessment Booking\n\n{}", detail_lines(&details));

    (html, text)
}

/// Operator notification for a callback request.
pub fn callback_notification(data: &CallbackData) -> (String, String) {
    let html = format!(
        "<h2>New Callback Request</h2>\
         <p>A visitor asked to be contacted by email.</p>\
         <p><strong>Email:</strong> {}</p>",
        escape_html(&data.email),
    );

    let text = format!("New Callback Request\n\nEmail: {}", data.email);

    (html, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_data() -> QuoteData {
        QuoteData {
            full_name: "John <Doe>".to_string(),
            email: "john@example.co.za".to_string(),
            phone: String::new(),
            service_type: "Water Damage / Flood".to_string(),
            address: String::new(),
            description: "Burst geyser\nCeiling damage".to_string(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"a" & 'b'</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_internal_body_escapes_and_breaks_lines() {
        let (html, text) = quote_internal(&quote_data(), &[]);

        assert!(html.contains("John &lt;Doe&gt;"));
        assert!(html.contains("Burst geyser<br />Ceiling damage"));
        assert!(html.contains("<p>None</p>"));
        assert!(!html.contains("<Doe>"));

        assert!(text.contains("Email: john@example.co.za"));
        assert!(text.contains("Phone: Not provided"));
        assert!(text.contains("Attachments: None"));
    }

    #[test]
    fn test_internal_body_lists_attachments() {
        let files = vec![UploadedFile {
            filename: "damage.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0u8; 2048],
        }];

        let (html, text) = quote_internal(&quote_data(), &files);
        assert!(html.contains("<li>damage.png (2 KB)</li>"));
        assert!(text.contains("damage.png (2 KB)"));
    }

    #[test]
    fn test_confirmation_greets_by_name_with_fallback() {
        let (html, _) = quote_confirmation(&quote_data(), &[]);
        assert!(html.starts_with("<p>Hi John &lt;Doe&gt;,</p>"));
        assert!(html.contains("0860 800 800"));

        let mut anonymous = quote_data();
        anonymous.full_name = String::new();
        let (html, text) = quote_confirmation(&anonymous, &[]);
        assert!(html.starts_with("<p>Hi there,</p>"));
        assert!(text.starts_with("Hi there,"));
    }

    #[test]
    fn test_assessment_notification_includes_all_details() {
        use crate::forms::validate::{AssessmentData, ServiceType, Severity};
        use chrono::NaiveDate;

        let data = AssessmentData {
            service: ServiceType::Fire,
            full_name: "Jane Doe".to_string(),
            phone: "082 123 4567".to_string(),
            preferred_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            preferred_time: "09:00".to_string(),
            location: "Cape Town".to_string(),
            severity: Severity::Critical,
        };

        let (html, text) = assessment_notification(&data);
        assert!(html.contains("Fire Recovery"));
        assert!(html.contains("2025-07-01"));
        assert!(text.contains("Metro Area: Cape Town"));
        assert!(text.contains("Severity: Critical"));
    }

    #[test]
    fn test_callback_notification() {
        let data = CallbackData {
            email: "caller@example.co.za".to_string(),
        };
        let (html, text) = callback_notification(&data);
        assert!(html.contains("caller@example.co.za"));
        assert!(text.ends_with("Email: caller@example.co.za"));
    }
}
