use crate::entity::comment;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use thesis_core::domain::{CommentContent, CommentId, LoginNo, Page, PageRequest, PaperId};

#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub id: CommentId,
    pub paper_id: PaperId,
    pub teacher_no: String,
    pub student_no: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub paper_id: PaperId,
    pub teacher_no: LoginNo,
    pub student_no: String,
    pub content: CommentContent,
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, new_comment: NewComment) -> Result<CommentRecord>;
    /// Newest first.
    async fn list_for_paper(&self, paper_id: PaperId) -> Result<Vec<CommentRecord>>;
    async fn list_by_student(&self, student_no: &LoginNo, page: PageRequest) -> Result<Page<CommentRecord>>;
    async fn recent_by_student(&self, student_no: &LoginNo, limit: u64) -> Result<Vec<CommentRecord>>;
    async fn list(&self, page: PageRequest) -> Result<Page<CommentRecord>>;
    async fn count_by_student(&self, student_no: &LoginNo) -> Result<u64>;
    async fn count_by_teacher(&self, teacher_no: &LoginNo) -> Result<u64>;
}

#[derive(Clone)]
pub struct SeaOrmCommentRepository {
    db: DatabaseConnection,
}

impl SeaOrmCommentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: comment::Model) -> CommentRecord {
        CommentRecord {
            id: CommentId::new(model.id),
            paper_id: PaperId::new(model.paper_id),
            teacher_no: model.teacher_no,
            student_no: model.student_no,
            content: model.content,
            created_at: model.created_at,
        }
    }

    fn newest_first(query: Select<comment::Entity>) -> Select<comment::Entity> {
        query
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
    }

    fn of_student(student_no: &LoginNo) -> Select<comment::Entity> {
        comment::Entity::find().filter(comment::Column::StudentNo.eq(student_no.as_str()))
    }

    async fn paginate(&self, query: Select<comment::Entity>, page: PageRequest) -> Result<Page<CommentRecord>> {
        let paginator = Self::newest_first(query).paginate(&self.db, page.per_page());
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
impl CommentRepository for SeaOrmCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<CommentRecord> {
        let model = comment::ActiveModel {
            paper_id: Set(new_comment.paper_id.into_inner()),
            teacher_no: Set(new_comment.teacher_no.to_string()),
            student_no: Set(new_comment.student_no),
            content: Set(new_comment.content.into_inner()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(Self::map_model(model))
    }

    async fn list_for_paper(&self, paper_id: PaperId) -> Result<Vec<CommentRecord>> {
        let models = Self::newest_first(
            comment::Entity::find().filter(comment::Column::PaperId.eq(paper_id.into_inner())),
        )
        .all(&self.db)
        .await?;
        Ok(models.into_iter().map(Self::map_model).collect())
    }

    async fn list_by_student(&self, student_no: &LoginNo, page: PageRequest) -> Result<Page<CommentRecord>> {
        self.paginate(Self::of_student(student_no), page).await
    }

    async fn recent_by_student(&self, student_no: &LoginNo, limit: u64) -> Result<Vec<CommentRecord>> {
        let models = Self::newest_first(Self::of_student(student_no))
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Self::map_model).collect())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<CommentRecord>> {
        self.paginate(comment::Entity::find(), page).await
    }

    async fn count_by_student(&self, student_no: &LoginNo) -> Result<u64> {
        Ok(Self::of_student(student_no).count(&self.db).await?)
    }

    async fn count_by_teacher(&self, teacher_no: &LoginNo) -> Result<u64> {
        Ok(comment::Entity::find()
            .filter(comment::Column::TeacherNo.eq(teacher_no.as_str()))
            .count(&self.db)
            .await?)
    }
}
