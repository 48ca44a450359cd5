//! Quote-request submission handler
//!
//! Pipeline: config check -> honeypot -> field validation -> attachment
//! checks -> rate limit -> inflight gate -> concurrent delivery of the
//! operator notification and the customer confirmation. Both sends must
//! be accepted by the provider for the submission to succeed.

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::Redirect;
use tracing::{info, warn};

use crate::delivery::{Attachment, EmailPayload};
use crate::error::Result;
use crate::forms::fields::{collect_multipart, SubmittedForm};
use crate::forms::messages::{
    quote_confirmation, quote_internal, QUOTE_CONFIRMATION_SUBJECT, QUOTE_INTERNAL_SUBJECT,
};
use crate::forms::validate::{check_files, honeypot_tripped, validate_quote};
use crate::forms::{rate_limit_key, Reason, Terminal};
use crate::AppState;

const PAGE: &str = "/contact";

pub async fn handle_quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Redirect> {
    let form = collect_multipart(multipart).await?;
    let terminal = submit_quote(&state, &headers, form).await;
    Ok(terminal.redirect(PAGE, None))
}

async fn submit_quote(state: &AppState, headers: &HeaderMap, form: SubmittedForm) -> Terminal {
    if state.config.mail.api_key.is_empty() {
        warn!("quote submission rejected: mail API key is not configured");
        return Terminal::Rejected(Reason::Config);
    }

    if honeypot_tripped(&form) {
        info!("quote submission rejected: honeypot tripped");
        return Terminal::Rejected(Reason::Spam);
    }

    let data = match validate_quote(&form) {
        Ok(data) => data,
        Err(reason) => return Terminal::Rejected(reason),
    };

    let accepted = match check_files(&form.files, &state.config.uploads) {
        Ok(accepted) => accepted,
        Err(reason) => return Terminal::Rejected(reason),
    };

    let decision = state.limiter.check(&rate_limit_key(headers, &data.email));
    if !decision.admitted {
        info!(email = %data.email, "quote submission rejected: rate limit exceeded");
        return Terminal::Rejected(Reason::Rate);
    }

    let _permit = match state.gates.quote.try_acquire() {
        Some(permit) => permit,
        None => {
            warn!("quote submission rejected: inflight ceiling reached");
            return Terminal::Rejected(Reason::Busy);
        }
    };

    let attachments: Vec<Attachment> = accepted
        .iter()
        .map(|file| {
            let content_type = (!file.content_type.is_empty()).then(|| file.content_type.clone());
            Attachment::from_bytes(&file.filename, &file.data, content_type)
        })
        .collect();

    let (internal_html, internal_text) = quote_internal(&data, &accepted);
    let internal = EmailPayload::new(
        state.config.mail_from(),
        state.config.mail.operations_address.clone(),
        QUOTE_INTERNAL_SUBJECT.to_string(),
        internal_html,
        internal_text,
    )
    .with_cc(state.config.mail.cc.clone())
    .with_reply_to(data.email.clone())
    .with_attachments(attachments);

    let (confirmation_html, confirmation_text) = quote_confirmation(&data, &accepted);
    let confirmation = EmailPayload::new(
        state.config.mail_from(),
        data.email.clone(),
        QUOTE_CONFIRMATION_SUBJECT.to_string(),
        confirmation_html,
        confirmation_text,
    )
    .with_reply_to(state.config.mail.operations_address.clone());

    let endpoint = &state.config.mail.endpoint;
    let api_key = &state.config.mail.api_key;
    let (internal_result, confirmation_result) = tokio::join!(
        state.mailer.send_with_retry(endpoint, api_key, &internal),
        state.mailer.send_with_retry(endpoint, api_key, &confirmation),
    );

    let mut delivered = true;
    for (label, result) in [
        ("internal", internal_result),
        ("confirmation", confirmation_result),
    ] {
        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                warn!(
                    notification = label,
                    status = response.status().as_u16(),
                    "provider rejected quote notification"
                );
                delivered = false;
            }
            Err(err) => {
                warn!(notification = label, error = %err, "quote notification failed");
                delivered = false;
            }
        }
    }

    if !delivered {
        return Terminal::Rejected(Reason::Send);
    }

    info!(email = %data.email, attachments = accepted.len(), "quote request delivered");
    Terminal::Success
}
