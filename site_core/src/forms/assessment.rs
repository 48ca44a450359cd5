//! Emergency assessment booking handler

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::Redirect;
use serde::Deserialize;
use tracing::{info, warn};

use crate::delivery::EmailPayload;
use crate::forms::fields::SubmittedForm;
use crate::forms::messages::{assessment_notification, ASSESSMENT_SUBJECT};
use crate::forms::validate::{honeypot_tripped, validate_assessment};
use crate::forms::{rate_limit_key, Reason, Terminal};
use crate::AppState;

const PAGE: &str = "/emergency";
const FRAGMENT: &str = "booking";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssessmentForm {
    pub service_type: String,
    pub full_name: String,
    pub phone: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub location: String,
    pub severity: String,
    pub website: String,
}

impl From<AssessmentForm> for SubmittedForm {
    fn from(payload: AssessmentForm) -> Self {
        let mut form = SubmittedForm::default();
        form.set("serviceType", &payload.service_type);
        form.set("fullName", &payload.full_name);
        form.set("phone", &payload.phone);
        form.set("preferredDate", &payload.preferred_date);
        form.set("preferredTime", &payload.preferred_time);
        form.set("location", &payload.location);
        form.set("severity", &payload.severity);
        form.set("website", &payload.website);
        form
    }
}

pub async fn handle_assessment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(payload): Form<AssessmentForm>,
) -> Redirect {
    let terminal = submit_assessment(&state, &headers, payload.into()).await;
    terminal.redirect(PAGE, Some(FRAGMENT))
}

async fn submit_assessment(state: &AppState, headers: &HeaderMap, form: SubmittedForm) -> Terminal {
    if state.config.mail.api_key.is_empty() {
        warn!("assessment booking rejected: mail API key is not configured");
        return Terminal::Rejected(Reason::Config);
    }

    if honeypot_tripped(&form) {
        info!("assessment booking rejected: honeypot tripped");
        return Terminal::Rejected(Reason::Spam);
    }

    let data = match validate_assessment(&form) {
        Ok(data) => data,
        Err(reason) => return Terminal::Rejected(reason),
    };

    // The assessment form has no email field; the phone number is the
    // submitter identity for rate limiting.
    let decision = state.limiter.check(&rate_limit_key(headers, &data.phone));
    if !decision.admitted {
        info!(phone = %data.phone, "assessment booking rejected: rate limit exceeded");
        return Terminal::Rejected(Reason::Rate);
    }

    let _permit = match state.gates.assessment.try_acquire() {
        Some(permit) => permit,
        None => {
            warn!("assessment booking rejected: inflight ceiling reached");
            return Terminal::Rejected(Reason::Busy);
        }
    };

    let (html, text) = assessment_notification(&data);
    let payload = EmailPayload::new(
        state.config.mail_from(),
        state.config.mail.operations_address.clone(),
        ASSESSMENT_SUBJECT.to_string(),
        html,
        text,
    )
    .with_cc(state.config.mail.cc.clone());

    let result = state
        .mailer
        .send_with_retry(&state.config.mail.endpoint, &state.config.mail.api_key, &payload)
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            info!(location = %data.location, "assessment booking delivered");
            Terminal::Success
        }
        Ok(response) => {
            warn!(
                status = response.status().as_u16(),
                "provider rejected assessment notification"
            );
            Terminal::Rejected(Reason::Send)
        }
        Err(err) => {
            warn!(error = %err, "assessment notification failed");
            Terminal::Rejected(Reason::Send)
        }
    }
}
