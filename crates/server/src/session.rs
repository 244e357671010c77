//! 服务端会话存储。
//!
//! 浏览器只持有签名后的会话 ID，角色等授权信息全部保存在服务端。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thesis_core::domain::{LoginNo, PrincipalId, Role};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "thesis_session";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 登录用户的会话数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub principal_id: PrincipalId,
    pub role: Role,
    pub username: String,
    pub login_no: LoginNo,
}

#[derive(Debug, Clone)]
struct Entry {
    data: SessionData,
    expires_at: Instant,
}

/// 固定有效期的内存会话表。
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Entry>>>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            lifetime,
        }
    }

    /// 创建会话，有效期从此刻起算，不随访问延长。
    pub async fn create(&self, data: SessionData) -> SessionId {
        let id = SessionId::generate();
        info!(role = %data.role, login_no = %data.login_no, "creating session");

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.expires_at > Instant::now());
        sessions.insert(
            id.clone(),
            Entry {
                data,
                expires_at: Instant::now() + self.lifetime,
            },
        );
        id
    }

    /// 查询会话，过期的会话视为不存在并被移除。
    pub async fn get(&self, id: &SessionId) -> Option<SessionData> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                Some(entry) if entry.expires_at > Instant::now() => return Some(entry.data.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.sessions.write().await.remove(id);
        None
    }

    /// 更新会话中缓存的显示名称。
    pub async fn rename(&self, id: &SessionId, username: String) {
        if let Some(entry) = self.sessions.write().await.get_mut(id) {
            entry.data.username = username;
        }
    }

    pub async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> SessionData {
        SessionData {
            principal_id: PrincipalId::new(1),
            role: Role::Student,
            username: "李同学".to_string(),
            login_no: LoginNo::new("2020001001").expect("valid login number"),
        }
    }

    #[tokio::test]
    async fn created_session_can_be_read_back() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(student()).await;

        assert_eq!(store.get(&id).await, Some(student()));
        assert!(store.remove(&id).await);
        assert_eq!(store.get(&id).await, None);
    }

    #[tokio::test]
    async fn expired_session_is_gone() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.create(student()).await;

        assert_eq!(store.get(&id).await, None);
        assert!(!store.remove(&id).await);
    }

    #[tokio::test]
    async fn rename_updates_display_name() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(student()).await;

        store.rename(&id, "李明".to_string()).await;
        let data = store.get(&id).await.expect("session should exist");
        assert_eq!(data.username, "李明");
    }
}
