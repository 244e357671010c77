use crate::entity::{admin, student, teacher};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use thesis_core::domain::{LoginNo, Page, PageRequest, PrincipalId, Role};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub sex: Option<String>,
    pub birth: Option<String>,
    pub native_place_id: Option<i32>,
}

/// Student-only assignment to a class, grade and supervising teacher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub class_id: Option<i32>,
    pub grade_id: Option<i32>,
    pub teacher_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct PrincipalRecord {
    pub id: PrincipalId,
    pub role: Role,
    pub login_no: LoginNo,
    pub password_hash: String,
    pub profile: Profile,
    pub descs: Option<String>,
    pub placement: Placement,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub role: Role,
    pub login_no: LoginNo,
    pub password_hash: String,
    pub profile: Profile,
    pub descs: Option<String>,
    pub placement: Placement,
}

/// Admin-side edit. `password_hash: None` keeps the current credential.
#[derive(Debug, Clone)]
pub struct PrincipalUpdate {
    pub profile: Profile,
    pub password_hash: Option<String>,
    pub descs: Option<String>,
    pub placement: Placement,
}

#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    async fn create(&self, new_principal: NewPrincipal) -> Result<PrincipalRecord>;
    async fn find_by_id(&self, role: Role, id: PrincipalId) -> Result<Option<PrincipalRecord>>;
    async fn find_by_login_no(&self, role: Role, login_no: &LoginNo) -> Result<Option<PrincipalRecord>>;
    async fn list(&self, role: Role, page: PageRequest) -> Result<Page<PrincipalRecord>>;
    async fn list_all(&self, role: Role) -> Result<Vec<PrincipalRecord>>;
    async fn list_students_of(&self, teacher_id: PrincipalId) -> Result<Vec<PrincipalRecord>>;
    async fn count(&self, role: Role) -> Result<u64>;
    async fn update(
        &self,
        role: Role,
        id: PrincipalId,
        update: PrincipalUpdate,
    ) -> Result<Option<PrincipalRecord>>;
    async fn update_profile(
        &self,
        role: Role,
        id: PrincipalId,
        profile: Profile,
    ) -> Result<Option<PrincipalRecord>>;
    async fn update_password(&self, role: Role, id: PrincipalId, password_hash: String) -> Result<bool>;
    async fn delete(&self, role: Role, id: PrincipalId) -> Result<bool>;
}

#[derive(Clone)]
pub struct SeaOrmPrincipalRepository {
    db: DatabaseConnection,
}

impl SeaOrmPrincipalRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_login_no(table: &str, value: &str) -> Result<LoginNo> {
        LoginNo::new(value).map_err(|e| anyhow!("invalid {table} login number '{value}' from database: {e}"))
    }

    fn map_admin(model: admin::Model) -> Result<PrincipalRecord> {
        Ok(PrincipalRecord {
            id: PrincipalId::new(model.id),
            role: Role::Admin,
            login_no: Self::map_login_no("admin", &model.admin_no)?,
            password_hash: model.password,
            profile: Profile {
                username: model.username,
                sex: model.sex,
                birth: model.birth,
                native_place_id: model.native_place_id,
            },
            descs: None,
            placement: Placement::default(),
            created_at: model.created_at,
        })
    }

    fn map_teacher(model: teacher::Model) -> Result<PrincipalRecord> {
        Ok(PrincipalRecord {
            id: PrincipalId::new(model.id),
            role: Role::Teacher,
            login_no: Self::map_login_no("teacher", &model.teacher_no)?,
            password_hash: model.password,
            profile: Profile {
                username: model.username,
                sex: model.sex,
                birth: model.birth,
                native_place_id: model.native_place_id,
            },
            descs: model.descs,
            placement: Placement::default(),
            created_at: model.created_at,
        })
    }

    fn map_student(model: student::Model) -> Result<PrincipalRecord> {
        Ok(PrincipalRecord {
            id: PrincipalId::new(model.id),
            role: Role::Student,
            login_no: Self::map_login_no("student", &model.student_no)?,
            password_hash: model.password,
            profile: Profile {
                username: model.username,
                sex: model.sex,
                birth: model.birth,
                native_place_id: model.native_place_id,
            },
            descs: None,
            placement: Placement {
                class_id: model.class_id,
                grade_id: model.grade_id,
                teacher_id: model.teacher_id,
            },
            created_at: model.created_at,
        })
    }

    fn collect<M>(models: Vec<M>, map: fn(M) -> Result<PrincipalRecord>) -> Result<Vec<PrincipalRecord>> {
        models.into_iter().map(map).collect()
    }
}

#[async_trait]
impl PrincipalRepository for SeaOrmPrincipalRepository {
    async fn create(&self, new_principal: NewPrincipal) -> Result<PrincipalRecord> {
        let NewPrincipal {
            role,
            login_no,
            password_hash,
            profile,
            descs,
            placement,
        } = new_principal;
        let now = Utc::now().naive_utc();

        match role {
            Role::Admin => {
                let model = admin::ActiveModel {
                    admin_no: Set(login_no.to_string()),
                    username: Set(profile.username),
                    password: Set(password_hash),
                    sex: Set(profile.sex),
                    birth: Set(profile.birth),
                    native_place_id: Set(profile.native_place_id),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?;
                Self::map_admin(model)
            }
            Role::Teacher => {
                let model = teacher::ActiveModel {
                    teacher_no: Set(login_no.to_string()),
                    username: Set(profile.username),
                    password: Set(password_hash),
                    sex: Set(profile.sex),
                    birth: Set(profile.birth),
                    native_place_id: Set(profile.native_place_id),
                    descs: Set(descs),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?;
                Self::map_teacher(model)
            }
            Role::Student => {
                let model = student::ActiveModel {
                    student_no: Set(login_no.to_string()),
                    username: Set(profile.username),
                    password: Set(password_hash),
                    sex: Set(profile.sex),
                    birth: Set(profile.birth),
                    native_place_id: Set(profile.native_place_id),
                    class_id: Set(placement.class_id),
                    grade_id: Set(placement.grade_id),
                    teacher_id: Set(placement.teacher_id),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?;
                Self::map_student(model)
            }
        }
    }

    async fn find_by_id(&self, role: Role, id: PrincipalId) -> Result<Option<PrincipalRecord>> {
        let id = id.into_inner();
        match role {
            Role::Admin => admin::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(Self::map_admin)
                .transpose(),
            Role::Teacher => teacher::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(Self::map_teacher)
                .transpose(),
            Role::Student => student::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(Self::map_student)
                .transpose(),
        }
    }

    async fn find_by_login_no(&self, role: Role, login_no: &LoginNo) -> Result<Option<PrincipalRecord>> {
        match role {
            Role::Admin => admin::Entity::find()
                .filter(admin::Column::AdminNo.eq(login_no.as_str()))
                .one(&self.db)
                .await?
                .map(Self::map_admin)
                .transpose(),
            Role::Teacher => teacher::Entity::find()
                .filter(teacher::Column::TeacherNo.eq(login_no.as_str()))
                .one(&self.db)
                .await?
                .map(Self::map_teacher)
                .transpose(),
            Role::Student => student::Entity::find()
                .filter(student::Column::StudentNo.eq(login_no.as_str()))
                .one(&self.db)
                .await?
                .map(Self::map_student)
                .transpose(),
        }
    }

    async fn list(&self, role: Role, page: PageRequest) -> Result<Page<PrincipalRecord>> {
        let (items, total) = match role {
            Role::Admin => {
                let paginator = admin::Entity::find()
                    .order_by_asc(admin::Column::Id)
                    .paginate(&self.db, page.per_page());
                let total = paginator.num_items().await?;
                if page.offset() >= total {
                    return Ok(Page::new(Vec::new(), page, total));
                }
                let models = paginator.fetch_page(page.index()).await?;
                (Self::collect(models, Self::map_admin)?, total)
            }
            Role::Teacher => {
                let paginator = teacher::Entity::find()
                    .order_by_asc(teacher::Column::Id)
                    .paginate(&self.db, page.per_page());
                let total = paginator.num_items().await?;
                if page.offset() >= total {
                    return Ok(Page::new(Vec::new(), page, total));
                }
                let models = paginator.fetch_page(page.index()).await?;
                (Self::collect(models, Self::map_teacher)?, total)
            }
            Role::Student => {
                let paginator = student::Entity::find()
                    .order_by_asc(student::Column::Id)
                    .paginate(&self.db, page.per_page());
                let total = paginator.num_items().await?;
                if page.offset() >= total {
                    return Ok(Page::new(Vec::new(), page, total));
                }
                let models = paginator.fetch_page(page.index()).await?;
                (Self::collect(models, Self::map_student)?, total)
            }
        };

        Ok(Page::new(items, page, total))
    }

    async fn list_all(&self, role: Role) -> Result<Vec<PrincipalRecord>> {
        match role {
            Role::Admin => Self::collect(
                admin::Entity::find()
                    .order_by_asc(admin::Column::Id)
                    .all(&self.db)
                    .await?,
                Self::map_admin,
            ),
            Role::Teacher => Self::collect(
                teacher::Entity::find()
                    .order_by_asc(teacher::Column::Id)
                    .all(&self.db)
                    .await?,
                Self::map_teacher,
            ),
            Role::Student => Self::collect(
                student::Entity::find()
                    .order_by_asc(student::Column::Id)
                    .all(&self.db)
                    .await?,
                Self::map_student,
            ),
        }
    }

    async fn list_students_of(&self, teacher_id: PrincipalId) -> Result<Vec<PrincipalRecord>> {
        let Some(teacher) = teacher::Entity::find_by_id(teacher_id.into_inner())
            .one(&self.db)
            .await?
        else {
            return Ok(Vec::new());
        };

        let students = teacher
            .find_related(student::Entity)
            .order_by_asc(student::Column::StudentNo)
            .all(&self.db)
            .await?;

        Self::collect(students, Self::map_student)
    }

    async fn count(&self, role: Role) -> Result<u64> {
        let count = match role {
            Role::Admin => admin::Entity::find().count(&self.db).await?,
            Role::Teacher => teacher::Entity::find().count(&self.db).await?,
            Role::Student => student::Entity::find().count(&self.db).await?,
        };
        Ok(count)
    }

    async fn update(
        &self,
        role: Role,
        id: PrincipalId,
        update: PrincipalUpdate,
    ) -> Result<Option<PrincipalRecord>> {
        let PrincipalUpdate {
            profile,
            password_hash,
            descs,
            placement,
        } = update;
        let id = id.into_inner();

        match role {
            Role::Admin => {
                let Some(model) = admin::Entity::find_by_id(id).one(&self.db).await? else {
                    return Ok(None);
                };
                let mut active_model: admin::ActiveModel = model.into();
                active_model.username = Set(profile.username);
                active_model.sex = Set(profile.sex);
                active_model.birth = Set(profile.birth);
                active_model.native_place_id = Set(profile.native_place_id);
                if let Some(hash) = password_hash {
                    active_model.password = Set(hash);
                }
                Self::map_admin(active_model.update(&self.db).await?).map(Some)
            }
            Role::Teacher => {
                let Some(model) = teacher::Entity::find_by_id(id).one(&self.db).await? else {
                    return Ok(None);
                };
                let mut active_model: teacher::ActiveModel = model.into();
                active_model.username = Set(profile.username);
                active_model.sex = Set(profile.sex);
                active_model.birth = Set(profile.birth);
                active_model.native_place_id = Set(profile.native_place_id);
                active_model.descs = Set(descs);
                if let Some(hash) = password_hash {
                    active_model.password = Set(hash);
                }
                Self::map_teacher(active_model.update(&self.db).await?).map(Some)
            }
            Role::Student => {
                let Some(model) = student::Entity::find_by_id(id).one(&self.db).await? else {
                    return Ok(None);
                };
                let mut active_model: student::ActiveModel = model.into();
                active_model.username = Set(profile.username);
                active_model.sex = Set(profile.sex);
                active_model.birth = Set(profile.birth);
                active_model.native_place_id = Set(profile.native_place_id);
                active_model.class_id = Set(placement.class_id);
                active_model.grade_id = Set(placement.grade_id);
                active_model.teacher_id = Set(placement.teacher_id);
                if let Some(hash) = password_hash {
                    active_model.password = Set(hash);
                }
                Self::map_student(active_model.update(&self.db).await?).map(Some)
            }
        }
    }

    async fn update_profile(
        &self,
        role: Role,
        id: PrincipalId,
        profile: Profile,
    ) -> Result<Option<PrincipalRecord>> {
        let Some(current) = self.find_by_id(role, id).await? else {
            return Ok(None);
        };

        self.update(
            role,
            id,
            PrincipalUpdate {
                profile,
                password_hash: None,
                descs: current.descs,
                placement: current.placement,
            },
        )
        .await
    }

    async fn update_password(&self, role: Role, id: PrincipalId, password_hash: String) -> Result<bool> {
        let id = id.into_inner();
        let updated = match role {
            Role::Admin => {
                admin::Entity::update_many()
                    .col_expr(admin::Column::Password, Expr::value(password_hash))
                    .filter(admin::Column::Id.eq(id))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
            Role::Teacher => {
                teacher::Entity::update_many()
                    .col_expr(teacher::Column::Password, Expr::value(password_hash))
                    .filter(teacher::Column::Id.eq(id))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
            Role::Student => {
                student::Entity::update_many()
                    .col_expr(student::Column::Password, Expr::value(password_hash))
                    .filter(student::Column::Id.eq(id))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
        };
        Ok(updated > 0)
    }

    async fn delete(&self, role: Role, id: PrincipalId) -> Result<bool> {
        let id = id.into_inner();
        let deleted = match role {
            Role::Admin => admin::Entity::delete_by_id(id).exec(&self.db).await?,
            Role::Teacher => {
                // Students keep their rows; only the assignment is dropped.
                let txn = self.db.begin().await?;
                student::Entity::update_many()
                    .col_expr(student::Column::TeacherId, Expr::value(Option::<i32>::None))
                    .filter(student::Column::TeacherId.eq(id))
                    .exec(&txn)
                    .await?;
                let deleted = teacher::Entity::delete_by_id(id).exec(&txn).await?;
                txn.commit().await?;
                deleted
            }
            Role::Student => student::Entity::delete_by_id(id).exec(&self.db).await?,
        };
        Ok(deleted.rows_affected > 0)
    }
}
