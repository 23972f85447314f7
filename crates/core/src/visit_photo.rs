//! Visit photo upload rules and storage layout.
//!
//! Photos live under `{storage_root}/visit-photos/{salon_id}/{appointment_id}/`.
//! The relative path stored in the database never contains user input; the
//! file name is a generated id plus a whitelisted extension.

use crate::types::DbId;

/// Storage bucket directory name.
pub const BUCKET: &str = "visit-photos";

/// Accepted image extensions (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "heic"];

/// Maximum caption length.
pub const MAX_CAPTION_LENGTH: usize = 500;

/// Extract and validate the extension of an uploaded file name.
pub fn validate_extension(filename: &str) -> Result<String, String> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(format!(
            "Unsupported photo format '.{ext}'. Supported: {}",
            SUPPORTED_EXTENSIONS
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }
}

/// MIME type for a validated extension.
pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Relative storage path for a photo.
pub fn storage_path(salon_id: DbId, appointment_id: DbId, file_id: &str, ext: &str) -> String {
    format!("{BUCKET}/{salon_id}/{appointment_id}/{file_id}.{ext}")
}

/// Relative directory holding every photo of a salon.
pub fn salon_prefix(salon_id: DbId) -> String {
    format!("{BUCKET}/{salon_id}")
}

/// Relative directory holding the photos of one appointment.
pub fn appointment_prefix(salon_id: DbId, appointment_id: DbId) -> String {
    format!("{BUCKET}/{salon_id}/{appointment_id}")
}

/// Validate the upload size against the configured limit.
pub fn validate_size(size: usize, max_bytes: usize) -> Result<(), String> {
    if size == 0 {
        return Err("Uploaded file is empty".to_string());
    }
    if size > max_bytes {
        return Err(format!(
            "Uploaded file is {size} bytes; the limit is {max_bytes} bytes"
        ));
    }
    Ok(())
}
