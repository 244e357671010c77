//! 上传文件存储模块。
//!
//! 按 `<root>/<kind>/<owner>/<file>` 布局保存论文与指导资料，
//! 写入先落到临时文件再原子改名，删除旧文件采用尽力而为策略。

pub mod upload_store;

pub use upload_store::{StorageError, UploadStore};
