//! Shared multipart parsing for the photo upload endpoints.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use mj_core::error::CoreError;
use mj_core::types::DbId;
use mj_core::upload::{validate_file_count, UploadKind};

use crate::error::AppResult;
use crate::state::AppState;
use crate::storage::StoredFile;

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

/// A parsed multipart form: every part with a file name is a file, the rest
/// are text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(multipart: &mut Multipart) -> AppResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await?;
                    form.files.push(UploadedFile { file_name, data });
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        validate_file_count(form.files.len()).map_err(CoreError::Validation)?;
        Ok(form)
    }

    /// Write every file to storage. On the first rejection the files already
    /// written are removed again.
    pub async fn store_all(
        &self,
        state: &AppState,
        project_id: DbId,
        kind: UploadKind,
    ) -> AppResult<Vec<StoredFile>> {
        let mut stored = Vec::with_capacity(self.files.len());
        for file in &self.files {
            match state
                .storage
                .store_image(
                    project_id,
                    kind,
                    &file.file_name,
                    &file.data,
                    state.config.max_upload_bytes,
                )
                .await
            {
                Ok(s) => stored.push(s),
                Err(e) => {
                    state.storage.remove_all(&relative_paths(&stored)).await;
                    return Err(e.into());
                }
            }
        }
        Ok(stored)
    }

    /// Parse an optional text field, rejecting values that do not parse.
    pub fn parse_field<T: std::str::FromStr>(&self, name: &str) -> AppResult<Option<T>> {
        match self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                CoreError::Validation(format!("Field '{name}' has an invalid value '{raw}'"))
                    .into()
            }),
        }
    }
}

pub fn relative_paths(stored: &[StoredFile]) -> Vec<String> {
    stored.iter().map(|s| s.relative_path.clone()).collect()
}
