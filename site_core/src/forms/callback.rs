//! Callback-request submission handler

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::Redirect;
use serde::Deserialize;
use tracing::{info, warn};

use crate::delivery::EmailPayload;
use crate::forms::fields::SubmittedForm;
use crate::forms::messages::{callback_notification, CALLBACK_SUBJECT};
use crate::forms::validate::{honeypot_tripped, validate_callback};
use crate::forms::{rate_limit_key, Reason, Terminal};
use crate::AppState;

const PAGE: &str = "/";
const FRAGMENT: &str = "callback";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CallbackForm {
    pub callback_email: String,
    pub website: String,
}

impl From<CallbackForm> for SubmittedForm {
    fn from(payload: CallbackForm) -> Self {
        let mut form = SubmittedForm::default();
        form.set("callbackEmail", &payload.callback_email);
        form.set("website", &payload.website);
        form
    }
}

pub async fn handle_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(payload): Form<CallbackForm>,
) -> Redirect {
    let terminal = submit_callback(&state, &headers, payload.into()).await;
    terminal.redirect(PAGE, Some(FRAGMENT))
}

async fn submit_callback(state: &AppState, headers: &HeaderMap, form: SubmittedForm) -> Terminal {
    if state.config.mail.api_key.is_empty() {
        warn!("callback request rejected: mail API key is not configured");
        return Terminal::Rejected(Reason::Config);
    }

    if honeypot_tripped(&form) {
        info!("callback request rejected: honeypot tripped");
        return Terminal::Rejected(Reason::Spam);
    }

    let data = match validate_callback(&form) {
        Ok(data) => data,
        Err(reason) => return Terminal::Rejected(reason),
    };

    let decision = state.limiter.check(&rate_limit_key(headers, &data.email));
    if !decision.admitted {
        info!(email = %data.email, "callback request rejected: rate limit exceeded");
        return Terminal::Rejected(Reason::Rate);
    }

    let _permit = match state.gates.callback.try_acquire() {
        Some(permit) => permit,
        None => {
            warn!("callback request rejected: inflight ceiling reached");
            return Terminal::Rejected(Reason::Busy);
        }
    };

    let (html, text) = callback_notification(&data);
    let payload = EmailPayload::new(
        state.config.mail_from(),
        state.config.mail.operations_address.clone(),
        CALLBACK_SUBJECT.to_string(),
        html,
        text,
    )
    .with_reply_to(data.email.clone());

    let result = state
        .mailer
        .send_with_retry(&state.config.mail.endpoint, &state.config.mail.api_key, &payload)
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            info!(email = %data.email, "callback request delivered");
            Terminal::Success
        }
        Ok(response) => {
            warn!(
                status = response.status().as_u16(),
                "provider rejected callback notification"
            );
            Terminal::Rejected(Reason::Send)
        }
        Err(err) => {
            warn!(error = %err, "callback notification failed");
            Terminal::Rejected(Reason::Send)
        }
    }
}
