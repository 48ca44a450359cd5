//! Outbound notification delivery: wire payloads, the retrying HTTP
//! client, and the per-form inflight admission gates.

pub mod client;
pub mod gate;
pub mod payload;

pub use client::Mailer;
pub use gate::{InflightGate, InflightPermit};
pub use payload::{Attachment, EmailPayload};
