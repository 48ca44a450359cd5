//! Per-field validation rules and custom validators
//!
//! Checks are pure and fail fast: each returns the first violated rule
//! as a `Reason`, and handlers sequence them in a fixed order so exactly
//! one reason code surfaces per rejected submission.

use chrono::{Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::UploadConfig;
use crate::forms::fields::{SubmittedForm, UploadedFile};
use crate::forms::Reason;

lazy_static! {
    static ref PHONE_REGEX: Regex = Regex::new(r"^[+()\d\s-]{7,20}$").unwrap();
}

pub const TIME_SLOTS: [&str; 3] = ["09:00", "11:30", "14:00"];

pub const METRO_AREAS: [&str; 5] = [
    "Johannesburg",
    "Cape Town",
    "Durban",
    "Pretoria",
    "Port Elizabeth",
];

const ALLOWED_UPLOAD_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/svg+xml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Flood,
    Fire,
}

impl ServiceType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "flood" => Some(ServiceType::Flood),
            "fire" => Some(ServiceType::Fire),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::Flood => "Flood Damage",
            ServiceType::Fire => "Fire Recovery",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Minor,
    Moderate,
    Critical,
}

impl Severity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "minor" => Some(Severity::Minor),
            "moderate" => Some(Severity::Moderate),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Minor => "Minor",
            Severity::Moderate => "Moderate",
            Severity::Critical => "Critical",
        }
    }
}

/// Simple `local@domain.tld` shape: an `@` with something before it, a
/// `.` somewhere after it, and no whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    match email.find('@') {
        Some(at) if at > 0 => email[at + 1..].contains('.'),
        _ => false,
    }
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

/// The honeypot field is invisible to humans; any value means an
/// automated submission.
pub fn honeypot_tripped(form: &SubmittedForm) -> bool {
    !form.value("website").is_empty()
}

/// Parses a `YYYY-MM-DD` value as a real calendar date (Feb-30 style
/// inputs fail) that is not strictly before `today`.
fn parse_preferred_date(value: &str, today: NaiveDate) -> Result<NaiveDate, Reason> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| Reason::Date)?;
    if date < today {
        return Err(Reason::Date);
    }
    Ok(date)
}

/// Normalized quote-request fields.
#[derive(Debug)]
pub struct QuoteData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub service_type: String,
    pub address: String,
    pub description: String,
}

pub fn validate_quote(form: &SubmittedForm) -> Result<QuoteData, Reason> {
    let email = form.value("email");
    if !is_valid_email(email) {
        return Err(Reason::Validation);
    }

    let phone = form.value("phone");
    if !phone.is_empty() && !is_valid_phone(phone) {
        return Err(Reason::Phone);
    }

    Ok(QuoteData {
        full_name: form.value("fullName").to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        service_type: form.value("serviceType").to_string(),
        address: form.value("address").to_string(),
        description: form.value("description").to_string(),
    })
}

/// Normalized assessment-booking fields.
#[derive(Debug)]
pub struct AssessmentData {
    pub service: ServiceType,
    pub full_name: String,
    pub phone: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub location: String,
    pub severity: Severity,
}

pub fn validate_assessment(form: &SubmittedForm) -> Result<AssessmentData, Reason> {
    validate_assessment_at(form, Local::now().date_naive())
}

fn validate_assessment_at(form: &SubmittedForm, today: NaiveDate) -> Result<AssessmentData, Reason> {
    let service = ServiceType::parse(form.value("serviceType")).ok_or(Reason::Service)?;

    let full_name = form.value("fullName");
    if full_name.is_empty() {
        return Err(Reason::Validation);
    }

    let phone = form.value("phone");
    if !is_valid_phone(phone) {
        return Err(Reason::Phone);
    }

    let preferred_date = parse_preferred_date(form.value("preferredDate"), today)?;

    let preferred_time = form.value("preferredTime");
    if !TIME_SLOTS.contains(&preferred_time) {
        return Err(Reason::Time);
    }

    let location = form.value("location");
    if !METRO_AREAS.contains(&location) {
        return Err(Reason::Location);
    }

    let severity = Severity::parse(form.value("severity")).ok_or(Reason::Severity)?;

    Ok(AssessmentData {
        service,
        full_name: full_name.to_string(),
        phone: phone.to_string(),
        preferred_date,
        preferred_time: preferred_time.to_string(),
        location: location.to_string(),
        severity,
    })
}

/// Normalized callback-request fields.
#[derive(Debug)]
pub struct CallbackData {
    pub email: String,
}

pub fn validate_callback(form: &SubmittedForm) -> Result<CallbackData, Reason> {
    let email = form.value("callbackEmail");
    if !is_valid_email(email) {
        return Err(Reason::Validation);
    }

    Ok(CallbackData {
        email: email.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRejection {
    Oversize,
    WrongType,
}

impl FileRejection {
    /// Human-readable reason, logged per rejected file for diagnosis.
    pub fn message(&self) -> &'static str {
        match self {
            FileRejection::Oversize => "File exceeds 5MB limit.",
            FileRejection::WrongType => "Unsupported file type.",
        }
    }
}

#[derive(Debug)]
pub struct RejectedFile {
    pub filename: String,
    pub rejection: FileRejection,
}

/// Every non-empty input file lands in exactly one side of the split.
#[derive(Debug, Default)]
pub struct FilePartition {
    pub accepted: Vec<UploadedFile>,
    pub rejected: Vec<RejectedFile>,
}

fn is_allowed_type(file: &UploadedFile) -> bool {
    if ALLOWED_UPLOAD_TYPES.contains(&file.content_type.as_str()) {
        return true;
    }

    // Fall back to the filename extension when the declared type is
    // absent or unrecognized.
    mime_guess::from_path(&file.filename)
        .first_raw()
        .map(|guessed| ALLOWED_UPLOAD_TYPES.contains(&guessed))
        .unwrap_or(false)
}

/// Scans every file and splits the set into accepted and rejected. A
/// file over the per-file cap is categorized oversize; its type is not
/// re-checked.
pub fn partition_files(files: &[UploadedFile], limits: &UploadConfig) -> FilePartition {
    let mut partition = FilePartition::default();

    for file in files {
        if file.size() > limits.max_file_bytes {
            partition.rejected.push(RejectedFile {
                filename: file.filename.clone(),
                rejection: FileRejection::Oversize,
            });
        } else if !is_allowed_type(file) {
            partition.rejected.push(RejectedFile {
                filename: file.filename.clone(),
                rejection: FileRejection::WrongType,
            });
        } else {
            partition.accepted.push(file.clone());
        }
    }

    partition
}

/// Full attachment check: count, then combined size, then the per-file
/// scan. The whole set is always scanned before the aggregate reason is
/// chosen; a wrong-type rejection anywhere wins over oversize.
pub fn check_files(files: &[UploadedFile], limits: &UploadConfig) -> Result<Vec<UploadedFile>, Reason> {
    if files.len() > limits.max_files {
        return Err(Reason::Files);
    }

    let total: u64 = files.iter().map(UploadedFile::size).sum();
    if total > limits.max_total_bytes {
        return Err(Reason::Total);
    }

    let partition = partition_files(files, limits);

    for rejected in &partition.rejected {
        tracing::info!(
            file = %rejected.filename,
            reason = rejected.rejection.message(),
            "attachment rejected"
        );
    }

    if partition
        .rejected
        .iter()
        .any(|f| f.rejection == FileRejection::WrongType)
    {
        return Err(Reason::Type);
    }
    if !partition.rejected.is_empty() {
        return Err(Reason::Size);
    }

    Ok(partition.accepted)
}
