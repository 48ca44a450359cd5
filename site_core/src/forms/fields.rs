//! Collecting posted form fields and uploads into a normalized shape

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::AppError;

/// One uploaded file as posted. Empty parts (no bytes) are discarded at
/// collection time; everything else is kept for validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A submitted form: trimmed `name -> value` strings plus any uploads.
/// Absent fields read as empty strings.
#[derive(Debug, Default)]
pub struct SubmittedForm {
    values: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl SubmittedForm {
    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.trim().to_string());
    }
}

/// Drains a multipart request into a `SubmittedForm`. Text parts are
/// trimmed; file parts under the `attachments` field are collected,
/// skipping empty ones. Transport-level multipart faults map to a plain
/// bad-request error, not a form rejection.
pub async fn collect_multipart(mut multipart: Multipart) -> Result<SubmittedForm, AppError> {
    let mut form = SubmittedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "attachments" && field.file_name().is_some() {
            let filename = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;

            if data.is_empty() {
                continue;
            }

            form.files.push(UploadedFile {
                filename,
                content_type,
                data: data.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read form field: {}", e)))?;
            form.set(&name, &value);
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_read_empty() {
        let form = SubmittedForm::default();
        assert_eq!(form.value("email"), "");
    }

    #[test]
    fn test_values_are_trimmed() {
        let mut form = SubmittedForm::default();
        form.set("email", "  john@example.co.za \n");
        assert_eq!(form.value("email"), "john@example.co.za");
    }

    #[test]
    fn test_uploaded_file_size() {
        let file = UploadedFile {
            filename: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0u8; 128],
        };
        assert_eq!(file.size(), 128);
    }
}
