use std::fmt;

use chrono::NaiveDateTime;

use super::DomainError;

pub const ALLOWED_EXTENSIONS: [&str; 8] = ["txt", "pdf", "png", "jpg", "jpeg", "gif", "doc", "docx"];

/// Kind of uploaded artifact; selects the top-level directory under the upload root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Paper,
    Guide,
}

impl ArtifactKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            ArtifactKind::Paper => "papers",
            ArtifactKind::Guide => "guides",
        }
    }
}

/// Returns the lower-cased extension of `file_name` if it is on the allow-list.
pub fn allowed_extension(file_name: &str) -> Result<String, DomainError> {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(DomainError::EmptyFileName);
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| DomainError::DisallowedFileType(file_name.to_string()))?;

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(DomainError::DisallowedFileType(file_name.to_string()))
    }
}

/// Reduces a client-supplied file name to ASCII letters, digits, `_`, `.` and `-`.
///
/// Path separators and whitespace become `_`, everything else outside the
/// safe set is dropped, and leading/trailing `.` and `_` are stripped, so the
/// result can never climb out of its directory.
pub fn secure_filename(file_name: &str) -> String {
    let spaced: String = file_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    filtered.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// On-disk name of an upload: `<YYYYmmdd_HHMMSS>_<sanitized name>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredFileName(String);

impl StoredFileName {
    pub fn new(original: &str, uploaded_at: NaiveDateTime) -> Result<Self, DomainError> {
        let extension = allowed_extension(original)?;
        let stem = original
            .trim()
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or_default();

        let mut safe_stem = secure_filename(stem);
        if safe_stem.is_empty() {
            safe_stem = "upload".to_string();
        }

        Ok(Self(format!(
            "{}_{}.{}",
            uploaded_at.format("%Y%m%d_%H%M%S"),
            safe_stem,
            extension
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoredFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 20)
            .and_then(|d| d.and_hms_opt(9, 30, 5))
            .expect("valid timestamp")
    }

    #[test]
    fn allowed_extensions_are_case_insensitive() {
        assert_eq!(allowed_extension("thesis.PDF"), Ok("pdf".to_string()));
        assert_eq!(allowed_extension("scan.jpeg"), Ok("jpeg".to_string()));
        assert_eq!(allowed_extension("draft.docx"), Ok("docx".to_string()));
    }

    #[test]
    fn disallowed_or_missing_extension_is_rejected() {
        assert_eq!(
            allowed_extension("run.exe"),
            Err(DomainError::DisallowedFileType("run.exe".to_string()))
        );
        assert_eq!(
            allowed_extension("README"),
            Err(DomainError::DisallowedFileType("README".to_string()))
        );
        assert_eq!(allowed_extension("  "), Err(DomainError::EmptyFileName));
    }

    #[test]
    fn secure_filename_strips_traversal() {
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("My Thesis v2.pdf"), "My_Thesis_v2.pdf");
        assert_eq!(secure_filename("..\\windows\\boot.ini"), "windows_boot.ini");
        assert_eq!(secure_filename("论文"), "");
    }

    #[test]
    fn stored_file_name_has_timestamp_prefix() {
        let name = StoredFileName::new("My Thesis.PDF", at()).expect("pdf should be allowed");
        assert_eq!(name.as_str(), "20240520_093005_My_Thesis.pdf");
    }

    #[test]
    fn stored_file_name_falls_back_when_stem_is_unsafe() {
        let name = StoredFileName::new("毕业论文.docx", at()).expect("docx should be allowed");
        assert_eq!(name.as_str(), "20240520_093005_upload.docx");
    }

    #[test]
    fn stored_file_name_rejects_disallowed_type() {
        assert_eq!(
            StoredFileName::new("payload.sh", at()),
            Err(DomainError::DisallowedFileType("payload.sh".to_string()))
        );
    }

    #[test]
    fn artifact_kinds_map_to_directories() {
        assert_eq!(ArtifactKind::Paper.dir_name(), "papers");
        assert_eq!(ArtifactKind::Guide.dir_name(), "guides");
    }
}
