//! Content validation
//!
//! The validation predicate applied to every submission before any
//! persistent side effect: size cap, extension allowlist, MIME type
//! sniffed from the leading bytes, and an extension/MIME cross-check.
//! The ruleset itself is configuration; the lifecycle only cares
//! whether the predicate passes.

use crate::config::ValidationConfig;

/// Validates uploaded files against the configured allowlists.
pub struct FileValidator {
    allowed_extensions: Vec<String>,
    allowed_mime_types: Vec<String>,
    max_size: i64,
}

/// Result of validating a single file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub file_type: String,
    pub detected_mime: String,
}

impl ValidationResult {
    /// Joined error message for notifications and API responses.
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

impl FileValidator {
    pub fn new(max_size: i64, config: &ValidationConfig) -> Self {
        FileValidator {
            allowed_extensions: config.allowed_extensions.clone(),
            allowed_mime_types: config.allowed_mime_types.clone(),
            max_size,
        }
    }

    /// Validate a file name plus its full byte content.
    pub fn validate(&self, file_name: &str, data: &[u8]) -> ValidationResult {
        let mut errors = Vec::new();

        if data.len() as i64 > self.max_size {
            errors.push(format!(
                "file size {} exceeds maximum {} bytes",
                data.len(),
                self.max_size
            ));
        }

        let ext = extension_of(file_name);
        if !self.is_allowed_extension(&ext) {
            errors.push(format!("file extension '{}' not allowed", ext));
        }

        let detected_mime = detect_content_type(data);
        if !self.is_allowed_mime_type(detected_mime) {
            errors.push(format!("detected MIME type '{}' not allowed", detected_mime));
        }

        if !mime_matches_extension(&ext, detected_mime) {
            errors.push(format!(
                "file extension '{}' does not match detected content type '{}'",
                ext, detected_mime
            ));
        }

        ValidationResult {
            valid: errors.is_empty(),
            errors,
            file_type: ext,
            detected_mime: detected_mime.to_string(),
        }
    }

    fn is_allowed_extension(&self, ext: &str) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }

    fn is_allowed_mime_type(&self, mime: &str) -> bool {
        if self.allowed_mime_types.is_empty() {
            return true;
        }
        let base = base_mime(mime);
        self.allowed_mime_types.iter().any(|allowed| {
            let allowed_base = base_mime(allowed);
            if allowed_base.eq_ignore_ascii_case(base) {
                return true;
            }
            // Wildcards like "application/*"
            if let Some(prefix) = allowed_base.strip_suffix("/*") {
                return base
                    .to_ascii_lowercase()
                    .starts_with(&format!("{}/", prefix.to_ascii_lowercase()));
            }
            false
        })
    }
}

/// Lowercased extension including the leading dot, or "" when absent.
fn extension_of(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => file_name[idx..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Strip parameters from a MIME type ("text/csv; charset=utf-8" -> "text/csv").
fn base_mime(mime: &str) -> &str {
    mime.split(';').next().unwrap_or(mime).trim()
}

/// Sniff the content type from the leading bytes.
///
/// Covers the formats this service accepts; everything unrecognized
/// falls back to application/octet-stream, which the default allowlist
/// admits for the office formats that are zip or OLE containers.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    if data.starts_with(b"%PDF-") {
        return "application/pdf";
    }
    if data.starts_with(b"PK\x03\x04") {
        // xlsx/docx are zip containers; indistinguishable without
        // unpacking, so report the generic zip type.
        return "application/zip";
    }
    if data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
        // Legacy OLE container (.xls/.doc)
        return "application/x-ole-storage";
    }
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        return "image/png";
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if looks_like_text(data) {
        return "text/plain; charset=utf-8";
    }
    "application/octet-stream"
}

fn looks_like_text(data: &[u8]) -> bool {
    let sample = &data[..data.len().min(512)];
    !sample.is_empty()
        && std::str::from_utf8(sample).is_ok()
        && !sample.iter().any(|&b| b == 0)
}

/// Expected base MIME type for a known extension.
fn mime_by_extension(ext: &str) -> Option<&'static str> {
    match ext {
        ".pdf" => Some("application/pdf"),
        ".csv" => Some("text/csv"),
        ".txt" => Some("text/plain"),
        ".xlsx" => {
            Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        }
        ".xls" => Some("application/vnd.ms-excel"),
        ".docx" => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        ".doc" => Some("application/msword"),
        ".png" => Some("image/png"),
        ".jpg" | ".jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// Cross-check the sniffed MIME type against the extension, with the
/// documented allowances for container formats the sniffer cannot
/// tell apart.
fn mime_matches_extension(ext: &str, mime: &str) -> bool {
    let Some(expected) = mime_by_extension(ext) else {
        // Unknown extension: nothing to verify against.
        return true;
    };

    let base = base_mime(mime);

    if base == "application/octet-stream" {
        return true;
    }

    // Office formats arrive as zip or OLE containers.
    if matches!(ext, ".xlsx" | ".docx") && base == "application/zip" {
        return true;
    }
    if matches!(ext, ".xls" | ".doc") && base == "application/x-ole-storage" {
        return true;
    }
    // CSV sniffs as plain text.
    if ext == ".csv" && base == "text/plain" {
        return true;
    }

    base.eq_ignore_ascii_case(base_mime(expected))
}
