//! Upload naming and validation for project and warehouse photos.
//!
//! Files are stored on local disk below the configured upload root:
//!
//! ```text
//! {upload_root}/project/mj/{project_id}/images/{stored_name}
//! {upload_root}/project/mj/{project_id}/warehouse/{stored_name}
//! ```

use std::path::PathBuf;

use crate::types::{DbId, Timestamp};

/// Default per-file size limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Most files accepted in one upload request.
pub const MAX_FILES_PER_UPLOAD: usize = 10;

/// Slack on top of the file payloads for multipart framing and text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Image extensions accepted for upload (lowercase, without the dot).
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Where an uploaded file belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    ProjectImage,
    WarehouseImage,
}

impl UploadKind {
    fn dir_name(self) -> &'static str {
        match self {
            UploadKind::ProjectImage => "images",
            UploadKind::WarehouseImage => "warehouse",
        }
    }
}

/// Directory (relative to the upload root) for a project's files of `kind`.
pub fn relative_dir(project_id: DbId, kind: UploadKind) -> PathBuf {
    PathBuf::from("project")
        .join("mj")
        .join(project_id.to_string())
        .join(kind.dir_name())
}

/// Lowercased extension of `file_name` if it is an allowed image type.
pub fn image_extension(file_name: &str) -> Result<String, String> {
    let ext = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => return Err(format!("File '{file_name}' has no extension")),
    };
    if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(format!(
            "Unsupported image format '.{ext}'. Supported: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        ))
    }
}

pub fn validate_size(len: usize, max: usize) -> Result<(), String> {
    if len == 0 {
        return Err("Uploaded file is empty".to_string());
    }
    if len > max {
        return Err(format!("Uploaded file exceeds the {max} byte limit"));
    }
    Ok(())
}

/// Largest request body an upload endpoint must accept.
pub fn request_body_limit(max_file_bytes: usize) -> usize {
    max_file_bytes
        .saturating_mul(MAX_FILES_PER_UPLOAD)
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
}

pub fn validate_file_count(count: usize) -> Result<(), String> {
    if count == 0 {
        return Err("No image files were uploaded".to_string());
    }
    if count > MAX_FILES_PER_UPLOAD {
        return Err(format!(
            "At most {MAX_FILES_PER_UPLOAD} files can be uploaded at once"
        ));
    }
    Ok(())
}

/// Collision-free stored name: `{YYYYmmddHHMMSS}_{uuid}.{ext}`.
pub fn stored_file_name(ext: &str, now: Timestamp, id: uuid::Uuid) -> String {
    format!("{}_{}.{ext}", now.format("%Y%m%d%H%M%S"), id.simple())
}

/// Keep only the final path component of a client-supplied file name.
pub fn sanitize_original_name(file_name: &str) -> String {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim()
        .to_string()
}
