use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Users::Table)
                    .col(pk_id_col(manager, Users::Id))
                    .col(ColumnDef::new(Users::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_name")
                    .table(Users::Table)
                    .col(Users::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Roles::Table)
                    .col(pk_id_col(manager, Roles::Id))
                    .col(ColumnDef::new(Roles::Name).string_len(50).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_roles_name")
                    .table(Roles::Table)
                    .col(Roles::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Releases::Table)
                    .col(pk_id_col(manager, Releases::Id))
                    .col(ColumnDef::new(Releases::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Releases::Description).text().not_null())
                    .col(ColumnDef::new(Releases::ReleaseDate).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_releases_name")
                    .table(Releases::Table)
                    .col(Releases::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Requirements::Table)
                    .col(pk_id_col(manager, Requirements::Id))
                    .col(ColumnDef::new(Requirements::Link).string_len(500).not_null())
                    .to_owned(),
            )
            .await?;

        // Dedup on link happens at the get-or-create seam, not via a
        // unique constraint; a plain index keeps the lookup cheap.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_requirements_link")
                    .table(Requirements::Table)
                    .col(Requirements::Link)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Projects::Table)
                    .col(pk_id_col(manager, Projects::Id))
                    .col(ColumnDef::new(Projects::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Projects::Description).text().not_null())
                    .col(fk_id_col(manager, Projects::CreatorId))
                    .col(fk_id_col(manager, Projects::ReleaseId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_name")
                    .table(Projects::Table)
                    .col(Projects::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(TeamMembers::Table)
                    .col(pk_id_col(manager, TeamMembers::Id))
                    .col(fk_id_col(manager, TeamMembers::UserId))
                    .col(fk_id_col(manager, TeamMembers::ProjectId))
                    .col(fk_id_col(manager, TeamMembers::RoleId))
                    .col(ColumnDef::new(TeamMembers::IsManager).boolean().not_null())
                    .col(ColumnDef::new(TeamMembers::IsActive).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        // Deliberately NOT unique: a user may hold duplicate memberships
        // in the same project.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_user_project")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::UserId)
                    .col(TeamMembers::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Tasks::Table)
                    .col(pk_id_col(manager, Tasks::Id))
                    .col(ColumnDef::new(Tasks::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Tasks::Description).text())
                    .col(ColumnDef::new(Tasks::State).string_len(32).not_null())
                    .col(fk_id_col(manager, Tasks::ManagerId))
                    .col(fk_id_nullable_col(manager, Tasks::AssigneeId))
                    .col(fk_id_col(manager, Tasks::ProjectId))
                    .col(fk_id_nullable_col(manager, Tasks::RequirementId))
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(timestamp_col(Tasks::UpdatedAt))
                    .col(ColumnDef::new(Tasks::FinishedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_name")
                    .table(Tasks::Table)
                    .col(Tasks::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_project_id")
                    .table(Tasks::Table)
                    .col(Tasks::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Comments::Table)
                    .col(pk_id_col(manager, Comments::Id))
                    .col(ColumnDef::new(Comments::Message).text().not_null())
                    .col(fk_id_col(manager, Comments::TaskId))
                    .col(fk_id_col(manager, Comments::CreatorId))
                    .col(ColumnDef::new(Comments::PrevState).string_len(32).not_null())
                    .col(timestamp_col(Comments::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_comments_task_id")
                    .table(Comments::Table)
                    .col(Comments::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Attachments::Table)
                    .col(pk_id_col(manager, Attachments::Id))
                    .col(ColumnDef::new(Attachments::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Attachments::Path).string_len(500).not_null())
                    .col(ColumnDef::new(Attachments::MediaType).string_len(64).not_null())
                    .col(fk_id_col(manager, Attachments::TaskId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attachments_name")
                    .table(Attachments::Table)
                    .col(Attachments::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attachments_task_id")
                    .table(Attachments::Table)
                    .col(Attachments::TaskId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            TableDropStatement::new().table(Attachments::Table).to_owned(),
            TableDropStatement::new().table(Comments::Table).to_owned(),
            TableDropStatement::new().table(Tasks::Table).to_owned(),
            TableDropStatement::new().table(TeamMembers::Table).to_owned(),
            TableDropStatement::new().table(Projects::Table).to_owned(),
            TableDropStatement::new().table(Requirements::Table).to_owned(),
            TableDropStatement::new().table(Releases::Table).to_owned(),
            TableDropStatement::new().table(Roles::Table).to_owned(),
            TableDropStatement::new().table(Users::Table).to_owned(),
        ] {
            manager.drop_table(table).await?;
        }
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn fk_id_nullable_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    IsActive,
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Releases {
    Table,
    Id,
    Name,
    Description,
    ReleaseDate,
}

#[derive(Iden)]
enum Requirements {
    Table,
    Id,
    Link,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Name,
    Description,
    CreatorId,
    ReleaseId,
}

#[derive(Iden)]
enum TeamMembers {
    Table,
    Id,
    UserId,
    ProjectId,
    RoleId,
    IsManager,
    IsActive,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Name,
    Description,
    State,
    ManagerId,
    AssigneeId,
    ProjectId,
    RequirementId,
    CreatedAt,
    UpdatedAt,
    FinishedAt,
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    Message,
    TaskId,
    CreatorId,
    PrevState,
    CreatedAt,
}

#[derive(Iden)]
enum Attachments {
    Table,
    Id,
    Name,
    Path,
    MediaType,
    TaskId,
}
