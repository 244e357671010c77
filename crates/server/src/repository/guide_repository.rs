use crate::entity::guide;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select,
};
use thesis_core::domain::{DocumentName, GuideId, LoginNo, Page, PageRequest};

#[derive(Debug, Clone)]
pub struct GuideRecord {
    pub id: GuideId,
    pub file_path: String,
    pub file_name: String,
    pub teacher_no: String,
    pub download_time: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewGuide {
    pub file_path: String,
    pub file_name: DocumentName,
    pub teacher_no: LoginNo,
}

#[async_trait]
pub trait GuideRepository: Send + Sync {
    async fn create(&self, new_guide: NewGuide) -> Result<GuideRecord>;
    async fn find_by_id(&self, guide_id: GuideId) -> Result<Option<GuideRecord>>;
    async fn list(&self, page: PageRequest) -> Result<Page<GuideRecord>>;
    async fn list_by_teacher(&self, teacher_no: &LoginNo, page: PageRequest) -> Result<Page<GuideRecord>>;
    async fn count_by_teacher(&self, teacher_no: &LoginNo) -> Result<u64>;
    /// Increments the counter in the database; concurrent downloads are not lost.
    async fn increment_downloads(&self, guide_id: GuideId) -> Result<bool>;
}

#[derive(Clone)]
pub struct SeaOrmGuideRepository {
    db: DatabaseConnection,
}

impl SeaOrmGuideRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: guide::Model) -> GuideRecord {
        GuideRecord {
            id: GuideId::new(model.id),
            file_path: model.file_path,
            file_name: model.file_name,
            teacher_no: model.teacher_no,
            download_time: model.download_time,
            created_at: model.created_at,
        }
    }

    async fn paginate(&self, query: Select<guide::Entity>, page: PageRequest) -> Result<Page<GuideRecord>> {
        let paginator = query
            .order_by_desc(guide::Column::CreatedAt)
            .order_by_desc(guide::Column::Id)
            .paginate(&self.db, page.per_page());
        let total = paginator.num_items().await?;
        if page.offset() >= total {
            return Ok(Page::new(Vec::new(), page, total));
        }
        let items = paginator
            .fetch_page(page.index())
            .await?
            .into_iter()
            .map(Self::map_model)
            .collect();

        Ok(Page::new(items, page, total))
    }
}

#[async_trait]
impl GuideRepository for SeaOrmGuideRepository {
    async fn create(&self, new_guide: NewGuide) -> Result<GuideRecord> {
        let model = guide::ActiveModel {
            file_path: Set(new_guide.file_path),
            file_name: Set(new_guide.file_name.into_inner()),
            teacher_no: Set(new_guide.teacher_no.to_string()),
            download_time: Set(0),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(Self::map_model(model))
    }

    async fn find_by_id(&self, guide_id: GuideId) -> Result<Option<GuideRecord>> {
        let model = guide::Entity::find_by_id(guide_id.into_inner())
            .one(&self.db)
            .await?;
        Ok(model.map(Self::map_model))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<GuideRecord>> {
        self.paginate(guide::Entity::find(), page).await
    }

    async fn list_by_teacher(&self, teacher_no: &LoginNo, page: PageRequest) -> Result<Page<GuideRecord>> {
        let query = guide::Entity::find().filter(guide::Column::TeacherNo.eq(teacher_no.as_str()));
        self.paginate(query, page).await
    }

    async fn count_by_teacher(&self, teacher_no: &LoginNo) -> Result<u64> {
        Ok(guide::Entity::find()
            .filter(guide::Column::TeacherNo.eq(teacher_no.as_str()))
            .count(&self.db)
            .await?)
    }

    async fn increment_downloads(&self, guide_id: GuideId) -> Result<bool> {
        let result = guide::Entity::update_many()
            .col_expr(
                guide::Column::DownloadTime,
                Expr::col(guide::Column::DownloadTime).add(1),
            )
            .filter(guide::Column::Id.eq(guide_id.into_inner()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
