//! Human-readable banner copy for redirect-encoded terminal states
//!
//! The redirect query string carries `status` and, on error, `reason`.
//! Each reason code maps to one fixed sentence; anything unrecognized
//! falls back to a generic failure message so internal codes never leak.

pub fn banner_message(status: &str, reason: &str) -> Option<&'static str> {
    match status {
        "success" => Some("Thank you - your request has been received. Our team will be in touch shortly."),
        "error" => Some(reason_message(reason)),
        _ => None,
    }
}

fn reason_message(reason: &str) -> &'static str {
    match reason {
        "validation" => "Please check the highlighted fields and try again.",
        "phone" => "Please enter a valid phone number.",
        "date" => "Please pick a valid date that is not in the past.",
        "time" => "Please choose one of the available time slots.",
        "location" => "Please select one of the metro areas we serve.",
        "severity" => "Please select how severe the damage is.",
        "service" => "Please select the type of incident.",
        "files" => "You can attach at most 5 photos.",
        "total" => "Your attachments are too large altogether - please keep them under 15MB combined.",
        "size" => "One of your attachments is over the 5MB limit.",
        "type" => "Attachments must be PNG, JPG or SVG images.",
        "spam" => "Your submission could not be processed.",
        "rate" => "You have submitted this form too many times - please wait a minute and try again.",
        "busy" => "We are experiencing high demand right now - please try again in a moment.",
        "config" => "This service is temporarily unavailable. Please call us instead.",
        "send" => "We could not send your request right now. Please try again or call us.",
        _ => "Something went wrong. Please try again or call us.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::Reason;

    #[test]
    fn test_every_reason_code_has_specific_copy() {
        let reasons = [
            Reason::Validation,
            Reason::Phone,
            Reason::Date,
            Reason::Time,
            Reason::Location,
            Reason::Severity,
            Reason::Service,
            Reason::Files,
            Reason::Total,
            Reason::Size,
            Reason::Type,
            Reason::Spam,
            Reason::Rate,
            Reason::Busy,
            Reason::Config,
            Reason::Send,
        ];

        let fallback = reason_message("not-a-code");
        for reason in reasons {
            let message = banner_message("error", reason.code()).unwrap();
            assert_ne!(message, fallback, "reason {:?}", reason);
        }
    }

    #[test]
    fn test_unrecognized_reason_falls_back() {
        let message = banner_message("error", "mystery").unwrap();
        assert_eq!(message, "Something went wrong. Please try again or call us.");
    }

    #[test]
    fn test_success_and_absent_status() {
        assert!(banner_message("success", "").unwrap().contains("Thank you"));
        assert!(banner_message("", "").is_none());
        assert!(banner_message("weird", "").is_none());
    }
}
