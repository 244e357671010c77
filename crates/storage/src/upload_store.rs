//! 上传目录的读写能力。

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thesis_core::domain::{ArtifactKind, LoginNo, StoredFileName};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// 存储错误类型。
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("文件不存在: {0}")]
    NotFound(String),

    #[error("路径不在上传目录内: {0}")]
    OutsideRoot(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// 上传文件存储，所有路径都位于 `root` 之下。
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// 创建以 `root` 为根目录的存储。
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 确保根目录存在。
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// 某个用户某类文件的专用目录。
    pub fn owner_dir(&self, kind: ArtifactKind, owner: &LoginNo) -> PathBuf {
        self.root.join(kind.dir_name()).join(owner.as_str())
    }

    /// 文件最终保存路径。
    pub fn destination(&self, kind: ArtifactKind, owner: &LoginNo, name: &StoredFileName) -> PathBuf {
        self.owner_dir(kind, owner).join(name.as_str())
    }

    /// 保存文件：先写入同目录下的临时文件，再改名到最终路径。
    ///
    /// 改名在同一目录内完成，读者要么看到旧内容，要么看到完整的新文件。
    pub async fn store(
        &self,
        kind: ArtifactKind,
        owner: &LoginNo,
        name: &StoredFileName,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        let dir = self.owner_dir(kind, owner);
        tokio::fs::create_dir_all(&dir).await?;

        let destination = dir.join(name.as_str());
        let staging = dir.join(format!(".{}.{}.part", name.as_str(), Uuid::new_v4()));

        if let Err(err) = tokio::fs::write(&staging, bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }

        if let Err(err) = tokio::fs::rename(&staging, &destination).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }

        info!(
            path = %destination.display(),
            size = bytes.len(),
            "stored uploaded file"
        );
        Ok(destination)
    }

    /// 删除文件，失败只记录日志不向上传播。返回文件是否被删除。
    pub async fn remove_best_effort(&self, path: &Path) -> bool {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!(path = %path.display(), "removed stored file");
                true
            }
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to remove stored file, leaving it orphaned");
                false
            }
        }
    }

    /// 读取上传目录内的文件。
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.check_inside_root(path)?;

        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.display().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn check_inside_root(&self, path: &Path) -> Result<()> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir));

        if escapes || !path.starts_with(&self.root) {
            return Err(StorageError::OutsideRoot(path.display().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_root(prefix: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()))
    }

    fn stored_name(original: &str) -> StoredFileName {
        let at = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid timestamp");
        StoredFileName::new(original, at).expect("name should be allowed")
    }

    #[tokio::test]
    async fn store_writes_into_owner_directory() {
        let root = temp_root("thesis-storage-store");
        let store = UploadStore::new(&root);
        let owner = LoginNo::new("2020001001").expect("valid login number");

        let path = store
            .store(ArtifactKind::Paper, &owner, &stored_name("thesis.pdf"), b"%PDF-1.7")
            .await
            .expect("store should succeed");

        assert_eq!(
            path,
            root.join("papers").join("2020001001").join("20240601_080000_thesis.pdf")
        );
        assert_eq!(tokio::fs::read(&path).await.expect("file exists"), b"%PDF-1.7");

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().expect("has parent"))
            .expect("dir readable")
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn store_overwrites_same_destination() {
        let root = temp_root("thesis-storage-overwrite");
        let store = UploadStore::new(&root);
        let owner = LoginNo::new("T001").expect("valid login number");
        let name = stored_name("guide.txt");

        store
            .store(ArtifactKind::Guide, &owner, &name, b"v1")
            .await
            .expect("first store");
        let path = store
            .store(ArtifactKind::Guide, &owner, &name, b"v2")
            .await
            .expect("second store");

        assert_eq!(store.read(&path).await.expect("readable"), b"v2");
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn remove_best_effort_tolerates_missing_file() {
        let root = temp_root("thesis-storage-remove");
        let store = UploadStore::new(&root);

        assert!(!store.remove_best_effort(&root.join("missing.pdf")).await);
    }

    #[tokio::test]
    async fn read_rejects_paths_outside_root() {
        let root = temp_root("thesis-storage-read");
        let store = UploadStore::new(&root);

        let err = store
            .read(&root.join("..").join("etc").join("passwd"))
            .await
            .expect_err("traversal should be rejected");
        assert!(matches!(err, StorageError::OutsideRoot(_)));

        let err = store
            .read(Path::new("/etc/passwd"))
            .await
            .expect_err("foreign path should be rejected");
        assert!(matches!(err, StorageError::OutsideRoot(_)));

        let err = store
            .read(&root.join("papers").join("nope.pdf"))
            .await
            .expect_err("missing file");
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
