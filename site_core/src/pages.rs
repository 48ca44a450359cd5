//! Page shells
//!
//! The site's pages are presentational; the only behavior they carry is
//! rendering the status banner from the redirect query parameters after
//! a form submission.

use axum::extract::Query;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::Deserialize;

use crate::forms::status::banner_message;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusParams {
    pub status: String,
    pub reason: String,
}

fn render_page(title: &str, params: &StatusParams) -> Html<String> {
    let banner = match banner_message(&params.status, &params.reason) {
        Some(message) => {
            let class = if params.status == "success" {
                "banner banner-success"
            } else {
                "banner banner-error"
            };
            format!("<div class=\"{class}\" role=\"status\">{message}</div>")
        }
        None => String::new(),
    };

    Html(format!(
        "<!DOCTYPE html>\
         <html lang=\"en\"><head><meta charset=\"utf-8\"><title>{title} - Dry Force</title></head>\
         <body>{banner}<main id=\"content\"></main></body></html>"
    ))
}

pub async fn home(Query(params): Query<StatusParams>) -> Html<String> {
    render_page("Home", &params)
}

pub async fn contact(Query(params): Query<StatusParams>) -> Html<String> {
    render_page("Contact Us", &params)
}

pub async fn emergency(Query(params): Query<StatusParams>) -> Html<String> {
    render_page("Emergency & Booking", &params)
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}
