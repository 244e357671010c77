use crate::entity::process_status::{self, SINGLETON_ID};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait};
use thesis_core::domain::{ProcessStatus, StageFlag};

#[async_trait]
pub trait ProcessStatusRepository: Send + Sync {
    /// Reads the workflow row, creating an all-closed one first if none exists.
    async fn get_or_init(&self) -> Result<ProcessStatus>;
    /// Inserts `status` unless a row already exists. Returns whether it was inserted.
    async fn init_if_absent(&self, status: ProcessStatus) -> Result<bool>;
    /// Overwrites all four flags.
    async fn save(&self, status: ProcessStatus) -> Result<ProcessStatus>;
}

#[derive(Clone)]
pub struct SeaOrmProcessStatusRepository {
    db: DatabaseConnection,
}

impl SeaOrmProcessStatusRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_flag(column: &str, code: &str) -> Result<StageFlag> {
        StageFlag::from_code(code)
            .map_err(|e| anyhow!("invalid process_status.{column} from database: {e}"))
    }

    fn map_model(model: process_status::Model) -> Result<ProcessStatus> {
        Ok(ProcessStatus {
            releasing_notices: Self::map_flag("releasing_notices", &model.releasing_notices)?,
            complete_personal_data: Self::map_flag(
                "complete_personal_data",
                &model.complete_personal_data,
            )?,
            upload_paper_guide: Self::map_flag("upload_paper_guide", &model.upload_paper_guide)?,
            upload_end_evaluate: Self::map_flag("upload_end_evaluate", &model.upload_end_evaluate)?,
        })
    }

    fn active_model(status: ProcessStatus) -> process_status::ActiveModel {
        process_status::ActiveModel {
            id: Set(SINGLETON_ID),
            releasing_notices: Set(status.releasing_notices.code().to_string()),
            complete_personal_data: Set(status.complete_personal_data.code().to_string()),
            upload_paper_guide: Set(status.upload_paper_guide.code().to_string()),
            upload_end_evaluate: Set(status.upload_end_evaluate.code().to_string()),
        }
    }
}

#[async_trait]
impl ProcessStatusRepository for SeaOrmProcessStatusRepository {
    async fn get_or_init(&self) -> Result<ProcessStatus> {
        self.init_if_absent(ProcessStatus::all_closed()).await?;

        let model = process_status::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow!("process_status row missing after initialization"))?;

        Self::map_model(model)
    }

    async fn init_if_absent(&self, status: ProcessStatus) -> Result<bool> {
        let inserted = process_status::Entity::insert(Self::active_model(status))
            .on_conflict(
                OnConflict::column(process_status::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;

        match inserted {
            Ok(rows) => Ok(rows > 0),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, status: ProcessStatus) -> Result<ProcessStatus> {
        process_status::Entity::insert(Self::active_model(status))
            .on_conflict(
                OnConflict::column(process_status::Column::Id)
                    .update_columns([
                        process_status::Column::ReleasingNotices,
                        process_status::Column::CompletePersonalData,
                        process_status::Column::UploadPaperGuide,
                        process_status::Column::UploadEndEvaluate,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(status)
    }
}
