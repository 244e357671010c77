use crate::entity::{grade, native_place, school_class};
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder,
};
use thesis_core::domain::LookupId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    NativePlace,
    Class,
    Grade,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRecord {
    pub id: LookupId,
    pub name: String,
}

/// Read access to the class, grade and native-place tables.
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    async fn list(&self, kind: LookupKind) -> Result<Vec<LookupRecord>>;
    /// Inserts `names` only when the table has no rows. Returns the number inserted.
    async fn insert_if_empty(&self, kind: LookupKind, names: &[&str]) -> Result<u64>;
}

#[derive(Clone)]
pub struct SeaOrmReferenceRepository {
    db: DatabaseConnection,
}

impl SeaOrmReferenceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn record(id: i32, name: String) -> LookupRecord {
        LookupRecord {
            id: LookupId::new(id),
            name,
        }
    }
}

#[async_trait]
impl ReferenceRepository for SeaOrmReferenceRepository {
    async fn list(&self, kind: LookupKind) -> Result<Vec<LookupRecord>> {
        let records = match kind {
            LookupKind::NativePlace => native_place::Entity::find()
                .order_by_asc(native_place::Column::Id)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|m| Self::record(m.id, m.name))
                .collect(),
            LookupKind::Class => school_class::Entity::find()
                .order_by_asc(school_class::Column::Id)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|m| Self::record(m.id, m.name))
                .collect(),
            LookupKind::Grade => grade::Entity::find()
                .order_by_asc(grade::Column::Id)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|m| Self::record(m.id, m.name))
                .collect(),
        };
        Ok(records)
    }

    async fn insert_if_empty(&self, kind: LookupKind, names: &[&str]) -> Result<u64> {
        if names.is_empty() {
            return Ok(0);
        }

        let existing = match kind {
            LookupKind::NativePlace => native_place::Entity::find().count(&self.db).await?,
            LookupKind::Class => school_class::Entity::find().count(&self.db).await?,
            LookupKind::Grade => grade::Entity::find().count(&self.db).await?,
        };
        if existing > 0 {
            return Ok(0);
        }

        match kind {
            LookupKind::NativePlace => {
                native_place::Entity::insert_many(names.iter().map(|name| native_place::ActiveModel {
                    name: Set((*name).to_string()),
                    ..Default::default()
                }))
                .exec(&self.db)
                .await?;
            }
            LookupKind::Class => {
                school_class::Entity::insert_many(names.iter().map(|name| school_class::ActiveModel {
                    name: Set((*name).to_string()),
                    ..Default::default()
                }))
                .exec(&self.db)
                .await?;
            }
            LookupKind::Grade => {
                grade::Entity::insert_many(names.iter().map(|name| grade::ActiveModel {
                    name: Set((*name).to_string()),
                    ..Default::default()
                }))
                .exec(&self.db)
                .await?;
            }
        }

        Ok(names.len() as u64)
    }
}
