use crate::entity::notice;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryOrder, QuerySelect, Select,
};
use std::str::FromStr;
use thesis_core::domain::{LoginNo, NoticeContent, NoticeId, NoticeTitle, Page, PageRequest, Role};

#[derive(Debug, Clone)]
pub struct NoticeRecord {
    pub id: NoticeId,
    pub title: String,
    pub content: String,
    pub lead_foot: Option<String>,
    pub publisher_role: Role,
    pub publisher_no: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewNotice {
    pub title: NoticeTitle,
    pub content: NoticeContent,
    pub lead_foot: Option<String>,
    pub publisher_role: Role,
    pub publisher_no: LoginNo,
}

#[derive(Debug, Clone)]
pub struct NoticeEdit {
    pub title: NoticeTitle,
    pub content: NoticeContent,
    pub lead_foot: Option<String>,
}

#[async_trait]
pub trait NoticeRepository: Send + Sync {
    async fn create(&self, new_notice: NewNotice) -> Result<NoticeRecord>;
    async fn find_by_id(&self, notice_id: NoticeId) -> Result<Option<NoticeRecord>>;
    /// Newest first.
    async fn list(&self, page: PageRequest) -> Result<Page<NoticeRecord>>;
    async fn recent(&self, limit: u64) -> Result<Vec<NoticeRecord>>;
    async fn count(&self) -> Result<u64>;
    async fn update(&self, notice_id: NoticeId, edit: NoticeEdit) -> Result<Option<NoticeRecord>>;
    async fn delete(&self, notice_id: NoticeId) -> Result<bool>;
}

#[derive(Clone)]
pub struct SeaOrmNoticeRepository {
    db: DatabaseConnection,
}

impl SeaOrmNoticeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn newest_first() -> Select<notice::Entity> {
        notice::Entity::find()
            .order_by_desc(notice::Column::CreatedAt)
            .order_by_desc(notice::Column::Id)
    }

    fn map_model(model: notice::Model) -> Result<NoticeRecord> {
        let publisher_role = Role::from_str(&model.publisher_role).map_err(|e| {
            anyhow!(
                "invalid notice.publisher_role '{}' from database: {e}",
                model.publisher_role
            )
        })?;

        Ok(NoticeRecord {
            id: NoticeId::new(model.id),
            title: model.title,
            content: model.content,
            lead_foot: model.lead_foot,
            publisher_role,
            publisher_no: model.publisher_no,
            created_at: model.created_at,
        })
    }
}

#[async_trait]
impl NoticeRepository for SeaOrmNoticeRepository {
    async fn create(&self, new_notice: NewNotice) -> Result<NoticeRecord> {
        let model = notice::ActiveModel {
            title: Set(new_notice.title.into_inner()),
            content: Set(new_notice.content.into_inner()),
            lead_foot: Set(new_notice.lead_foot),
            publisher_role: Set(new_notice.publisher_role.as_str().to_string()),
            publisher_no: Set(new_notice.publisher_no.to_string()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Self::map_model(model)
    }

    async fn find_by_id(&self, notice_id: NoticeId) -> Result<Option<NoticeRecord>> {
        notice::Entity::find_by_id(notice_id.into_inner())
            .one(&self.db)
            .await?
            .map(Self::map_model)
            .transpose()
    }

    async fn list(&self, page: PageRequest) -> Result<Page<NoticeRecord>> {
        let paginator = Self::newest_first().paginate(&self.db, page.per_page());
        let total = paginator.num_items().await?;
        if page.offset() >= total {
            return Ok(Page::new(Vec::new(), page, total));
        }
        let items = paginator
            .fetch_page(page.index())
            .await?
            .into_iter()
            .map(Self::map_model)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(items, page, total))
    }

    async fn recent(&self, limit: u64) -> Result<Vec<NoticeRecord>> {
        Self::newest_first()
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Self::map_model)
            .collect()
    }

    async fn count(&self) -> Result<u64> {
        Ok(notice::Entity::find().count(&self.db).await?)
    }

    async fn update(&self, notice_id: NoticeId, edit: NoticeEdit) -> Result<Option<NoticeRecord>> {
        let Some(model) = notice::Entity::find_by_id(notice_id.into_inner())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: notice::ActiveModel = model.into();
        active_model.title = Set(edit.title.into_inner());
        active_model.content = Set(edit.content.into_inner());
        active_model.lead_foot = Set(edit.lead_foot);

        let updated = active_model.update(&self.db).await?;
        Self::map_model(updated).map(Some)
    }

    async fn delete(&self, notice_id: NoticeId) -> Result<bool> {
        let result = notice::Entity::delete_by_id(notice_id.into_inner())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
