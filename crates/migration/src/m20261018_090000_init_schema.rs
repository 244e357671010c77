use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NativePlace::Table)
                    .if_not_exists()
                    .col(pk_auto(NativePlace::Id))
                    .col(string_len(NativePlace::Name, 20))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SchoolClass::Table)
                    .if_not_exists()
                    .col(pk_auto(SchoolClass::Id))
                    .col(string_len(SchoolClass::Name, 20))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Grade::Table)
                    .if_not_exists()
                    .col(pk_auto(Grade::Id))
                    .col(string_len(Grade::Name, 20))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Admin::Table)
                    .if_not_exists()
                    .col(pk_auto(Admin::Id))
                    .col(string_len(Admin::AdminNo, 20).unique_key())
                    .col(string_len(Admin::Username, 20))
                    // Argon2 PHC string, never the plaintext password.
                    .col(string_len(Admin::Password, 255))
                    .col(string_len_null(Admin::Sex, 2))
                    .col(string_len_null(Admin::Birth, 20))
                    .col(integer_null(Admin::NativePlaceId))
                    .col(timestamp(Admin::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-admin-native_place_id")
                            .from(Admin::Table, Admin::NativePlaceId)
                            .to(NativePlace::Table, NativePlace::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teacher::Table)
                    .if_not_exists()
                    .col(pk_auto(Teacher::Id))
                    .col(string_len(Teacher::TeacherNo, 20).unique_key())
                    .col(string_len(Teacher::Username, 20))
                    .col(string_len(Teacher::Password, 255))
                    .col(string_len_null(Teacher::Sex, 2))
                    .col(string_len_null(Teacher::Birth, 20))
                    .col(integer_null(Teacher::NativePlaceId))
                    .col(string_len_null(Teacher::Descs, 2000))
                    .col(timestamp(Teacher::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-teacher-native_place_id")
                            .from(Teacher::Table, Teacher::NativePlaceId)
                            .to(NativePlace::Table, NativePlace::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(pk_auto(Student::Id))
                    .col(string_len(Student::StudentNo, 20).unique_key())
                    .col(string_len(Student::Username, 20))
                    .col(string_len(Student::Password, 255))
                    .col(string_len_null(Student::Sex, 2))
                    .col(string_len_null(Student::Birth, 20))
                    .col(integer_null(Student::NativePlaceId))
                    .col(integer_null(Student::ClassId))
                    .col(integer_null(Student::GradeId))
                    .col(integer_null(Student::TeacherId))
                    .col(timestamp(Student::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student-native_place_id")
                            .from(Student::Table, Student::NativePlaceId)
                            .to(NativePlace::Table, NativePlace::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student-class_id")
                            .from(Student::Table, Student::ClassId)
                            .to(SchoolClass::Table, SchoolClass::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student-grade_id")
                            .from(Student::Table, Student::GradeId)
                            .to(Grade::Table, Grade::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    // Deleting a teacher leaves their students unassigned.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student-teacher_id")
                            .from(Student::Table, Student::TeacherId)
                            .to(Teacher::Table, Teacher::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notice::Table)
                    .if_not_exists()
                    .col(pk_auto(Notice::Id))
                    .col(string_len(Notice::Title, 200))
                    .col(text(Notice::Content))
                    .col(string_len_null(Notice::LeadFoot, 100))
                    // 'admin' or 'teacher'
                    .col(string_len(Notice::PublisherRole, 10))
                    .col(string_len(Notice::PublisherNo, 20))
                    .col(timestamp(Notice::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Login-number references below carry no foreign keys: papers, guides and
        // comments outlive the principals that created them.
        manager
            .create_table(
                Table::create()
                    .table(Guide::Table)
                    .if_not_exists()
                    .col(pk_auto(Guide::Id))
                    .col(string_len(Guide::FilePath, 500))
                    .col(string_len(Guide::FileName, 200))
                    .col(string_len(Guide::TeacherNo, 20))
                    .col(integer(Guide::DownloadTime).default(0))
                    .col(timestamp(Guide::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Paper::Table)
                    .if_not_exists()
                    .col(pk_auto(Paper::Id))
                    .col(string_len(Paper::PaperName, 200))
                    // One active paper per student.
                    .col(string_len(Paper::StudentNo, 20).unique_key())
                    .col(string_len_null(Paper::TeacherNo, 20))
                    .col(string_len(Paper::SavePath, 500))
                    .col(timestamp(Paper::UploadTime).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(pk_auto(Comment::Id))
                    .col(integer(Comment::PaperId))
                    .col(string_len(Comment::TeacherNo, 20))
                    .col(string_len(Comment::StudentNo, 20))
                    .col(string_len(Comment::Content, 1000))
                    .col(timestamp(Comment::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProcessStatus::Table)
                    .if_not_exists()
                    // Single row, id is always 1.
                    .col(
                        integer(ProcessStatus::Id)
                            .primary_key()
                            .check(Expr::col(ProcessStatus::Id).eq(1)),
                    )
                    // Flags are '0' (closed) or '1' (open).
                    .col(
                        string_len(ProcessStatus::ReleasingNotices, 1)
                            .default("0")
                            .check(Expr::col(ProcessStatus::ReleasingNotices).is_in(["0", "1"])),
                    )
                    .col(
                        string_len(ProcessStatus::CompletePersonalData, 1)
                            .default("0")
                            .check(Expr::col(ProcessStatus::CompletePersonalData).is_in(["0", "1"])),
                    )
                    .col(
                        string_len(ProcessStatus::UploadPaperGuide, 1)
                            .default("0")
                            .check(Expr::col(ProcessStatus::UploadPaperGuide).is_in(["0", "1"])),
                    )
                    .col(
                        string_len(ProcessStatus::UploadEndEvaluate, 1)
                            .default("0")
                            .check(Expr::col(ProcessStatus::UploadEndEvaluate).is_in(["0", "1"])),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notice_created_at")
                    .table(Notice::Table)
                    .col(Notice::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_guide_teacher_no")
                    .table(Guide::Table)
                    .col(Guide::TeacherNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_paper_teacher_no")
                    .table(Paper::Table)
                    .col(Paper::TeacherNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_paper_id")
                    .table(Comment::Table)
                    .col(Comment::PaperId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_student_no")
                    .table(Comment::Table)
                    .col(Comment::StudentNo)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProcessStatus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Paper::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Guide::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notice::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Student::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teacher::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Admin::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Grade::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SchoolClass::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NativePlace::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum NativePlace {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum SchoolClass {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Grade {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Admin {
    Table,
    Id,
    AdminNo,
    Username,
    Password,
    Sex,
    Birth,
    NativePlaceId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Teacher {
    Table,
    Id,
    TeacherNo,
    Username,
    Password,
    Sex,
    Birth,
    NativePlaceId,
    Descs,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Student {
    Table,
    Id,
    StudentNo,
    Username,
    Password,
    Sex,
    Birth,
    NativePlaceId,
    ClassId,
    GradeId,
    TeacherId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notice {
    Table,
    Id,
    Title,
    Content,
    LeadFoot,
    PublisherRole,
    PublisherNo,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Guide {
    Table,
    Id,
    FilePath,
    FileName,
    TeacherNo,
    DownloadTime,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Paper {
    Table,
    Id,
    PaperName,
    StudentNo,
    TeacherNo,
    SavePath,
    UploadTime,
}

#[derive(DeriveIden)]
enum Comment {
    Table,
    Id,
    PaperId,
    TeacherNo,
    StudentNo,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProcessStatus {
    Table,
    Id,
    ReleasingNotices,
    CompletePersonalData,
    UploadPaperGuide,
    UploadEndEvaluate,
}
