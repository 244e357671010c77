//! 上传表单解析与文件下载响应。

use std::collections::HashMap;
use std::path::Path;

use axum::extract::Multipart;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use thesis_storage::{StorageError, UploadStore};
use tracing::warn;

use super::response::{AppError, AppResult};
use crate::service::UploadedFile;

/// 上传表单：`file` 字段之外的字段按文本收集。
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub async fn read(mut multipart: Multipart, form_path: &str) -> AppResult<Self> {
        let mut form = UploadForm::default();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(err) => return Err(rejected(err, form_path)),
            };

            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|err| rejected(err, form_path))?;
                form.file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field.text().await.map_err(|err| rejected(err, form_path))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }
}

fn rejected(err: axum::extract::multipart::MultipartError, form_path: &str) -> AppError {
    warn!(error = %err, "multipart upload rejected");
    AppError::rejected("文件上传失败，请确认文件不超过 16 MB", form_path)
}

/// 以附件形式返回上传目录中的文件。
pub async fn attachment(storage: &UploadStore, stored_path: &str) -> AppResult<Response> {
    let path = Path::new(stored_path);
    let bytes = match storage.read(path).await {
        Ok(bytes) => bytes,
        Err(StorageError::NotFound(_) | StorageError::OutsideRoot(_)) => {
            warn!(path = %stored_path, "stored file is not available");
            return Err(AppError::NotFound);
        }
        Err(err) => return Err(AppError::Internal(err.into())),
    };

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("download");

    Ok((
        [
            (CONTENT_TYPE, "application/octet-stream".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        bytes,
    )
        .into_response())
}
