use crate::entity::paper;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use thesis_core::domain::{DocumentName, LoginNo, Page, PageRequest, PaperId};

#[derive(Debug, Clone)]
pub struct PaperRecord {
    pub id: PaperId,
    pub paper_name: String,
    pub student_no: String,
    pub teacher_no: Option<String>,
    pub save_path: String,
    pub upload_time: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPaper {
    pub paper_name: DocumentName,
    pub student_no: LoginNo,
    pub teacher_no: Option<LoginNo>,
    pub save_path: String,
}

/// Outcome of swapping a student's paper: the row now on record and the rows it displaced.
#[derive(Debug, Clone)]
pub struct PaperReplacement {
    pub paper: PaperRecord,
    pub replaced: Vec<PaperRecord>,
}

#[async_trait]
pub trait PaperRepository: Send + Sync {
    /// Deletes every paper of the student and inserts `new_paper` in one transaction.
    async fn replace_for_student(&self, new_paper: NewPaper) -> Result<PaperReplacement>;
    async fn find_by_id(&self, paper_id: PaperId) -> Result<Option<PaperRecord>>;
    async fn find_for_student(&self, paper_id: PaperId, student_no: &LoginNo) -> Result<Option<PaperRecord>>;
    async fn latest_for_student(&self, student_no: &LoginNo) -> Result<Option<PaperRecord>>;
    async fn list_by_student(&self, student_no: &LoginNo, page: PageRequest) -> Result<Page<PaperRecord>>;
    async fn recent_by_student(&self, student_no: &LoginNo, limit: u64) -> Result<Vec<PaperRecord>>;
    async fn list_by_teacher(&self, teacher_no: &LoginNo, page: PageRequest) -> Result<Page<PaperRecord>>;
    async fn list(&self, page: PageRequest) -> Result<Page<PaperRecord>>;
    async fn count(&self) -> Result<u64>;
    async fn count_by_student(&self, student_no: &LoginNo) -> Result<u64>;
    async fn count_by_teacher(&self, teacher_no: &LoginNo) -> Result<u64>;
}

#[derive(Clone)]
pub struct SeaOrmPaperRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaperRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: paper::Model) -> PaperRecord {
        PaperRecord {
            id: PaperId::new(model.id),
            paper_name: model.paper_name,
            student_no: model.student_no,
            teacher_no: model.teacher_no,
            save_path: model.save_path,
            upload_time: model.upload_time,
        }
    }

    fn newest_first(query: Select<paper::Entity>) -> Select<paper::Entity> {
        query
            .order_by_desc(paper::Column::UploadTime)
            .order_by_desc(paper::Column::Id)
    }

    fn of_student(student_no: &LoginNo) -> Select<paper::Entity> {
        paper::Entity::find().filter(paper::Column::StudentNo.eq(student_no.as_str()))
    }

    fn of_teacher(teacher_no: &LoginNo) -> Select<paper::Entity> {
        paper::Entity::find().filter(paper::Column::TeacherNo.eq(teacher_no.as_str()))
    }

    async fn paginate(&self, query: Select<paper::Entity>, page: PageRequest) -> Result<Page<PaperRecord>> {
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
impl PaperRepository for SeaOrmPaperRepository {
    async fn replace_for_student(&self, new_paper: NewPaper) -> Result<PaperReplacement> {
        let student_no = new_paper.student_no.to_string();
        let txn = self.db.begin().await?;

        let replaced = paper::Entity::find()
            .filter(paper::Column::StudentNo.eq(student_no.as_str()))
            .all(&txn)
            .await?;

        if !replaced.is_empty() {
            paper::Entity::delete_many()
                .filter(paper::Column::StudentNo.eq(student_no.as_str()))
                .exec(&txn)
                .await?;
        }

        let inserted = paper::ActiveModel {
            paper_name: Set(new_paper.paper_name.into_inner()),
            student_no: Set(student_no),
            teacher_no: Set(new_paper.teacher_no.map(|no| no.to_string())),
            save_path: Set(new_paper.save_path),
            upload_time: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(PaperReplacement {
            paper: Self::map_model(inserted),
            replaced: replaced.into_iter().map(Self::map_model).collect(),
        })
    }

    async fn find_by_id(&self, paper_id: PaperId) -> Result<Option<PaperRecord>> {
        let model = paper::Entity::find_by_id(paper_id.into_inner())
            .one(&self.db)
            .await?;
        Ok(model.map(Self::map_model))
    }

    async fn find_for_student(&self, paper_id: PaperId, student_no: &LoginNo) -> Result<Option<PaperRecord>> {
        let model = Self::of_student(student_no)
            .filter(paper::Column::Id.eq(paper_id.into_inner()))
            .one(&self.db)
            .await?;
        Ok(model.map(Self::map_model))
    }

    async fn latest_for_student(&self, student_no: &LoginNo) -> Result<Option<PaperRecord>> {
        let model = Self::newest_first(Self::of_student(student_no))
            .one(&self.db)
            .await?;
        Ok(model.map(Self::map_model))
    }

    async fn list_by_student(&self, student_no: &LoginNo, page: PageRequest) -> Result<Page<PaperRecord>> {
        self.paginate(Self::of_student(student_no), page).await
    }

    async fn recent_by_student(&self, student_no: &LoginNo, limit: u64) -> Result<Vec<PaperRecord>> {
        let models = Self::newest_first(Self::of_student(student_no))
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Self::map_model).collect())
    }

    async fn list_by_teacher(&self, teacher_no: &LoginNo, page: PageRequest) -> Result<Page<PaperRecord>> {
        self.paginate(Self::of_teacher(teacher_no), page).await
    }

    async fn list(&self, page: PageRequest) -> Result<Page<PaperRecord>> {
        self.paginate(paper::Entity::find(), page).await
    }

    async fn count(&self) -> Result<u64> {
        Ok(paper::Entity::find().count(&self.db).await?)
    }

    async fn count_by_student(&self, student_no: &LoginNo) -> Result<u64> {
        Ok(Self::of_student(student_no).count(&self.db).await?)
    }

    async fn count_by_teacher(&self, teacher_no: &LoginNo) -> Result<u64> {
        Ok(Self::of_teacher(teacher_no).count(&self.db).await?)
    }
}
