use sea_orm::entity::prelude::*;

/// Single-row table; the only valid id is [`SINGLETON_ID`].
pub const SINGLETON_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "process_status")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub releasing_notices: String,
    pub complete_personal_data: String,
    pub upload_paper_guide: String,
    pub upload_end_evaluate: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
