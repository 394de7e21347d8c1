use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::{application, comment, team, user};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Create comments table
        manager
            .create_table(
                Table::create()
                    .table(Comment::table())
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comment::column(comment::Column::Id))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comment::column(comment::Column::TeamId)).integer().not_null())
                    .col(ColumnDef::new(Comment::column(comment::Column::AuthorId)).integer().not_null())
                    .col(ColumnDef::new(Comment::column(comment::Column::ParentId)).integer())
                    .col(ColumnDef::new(Comment::column(comment::Column::Body)).text().not_null())
                    .col(
                        ColumnDef::new(Comment::column(comment::Column::CreatedAt))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Comment::column(comment::Column::UpdatedAt))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comment-team")
                            .from(Comment::table(), Comment::column(comment::Column::TeamId))
                            .to(Team::table(), Team::column(team::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comment-author")
                            .from(Comment::table(), Comment::column(comment::Column::AuthorId))
                            .to(User::table(), User::column(user::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comment-parent")
                            .from(Comment::table(), Comment::column(comment::Column::ParentId))
                            .to(Comment::table(), Comment::column(comment::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. Create applications table
        manager
            .create_table(
                Table::create()
                    .table(Application::table())
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Application::column(application::Column::Id))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Application::column(application::Column::TeamId)).integer().not_null())
                    .col(
                        ColumnDef::new(Application::column(application::Column::ApplicantId))
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Application::column(application::Column::Status))
                            .string_len(10)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Application::column(application::Column::CreatedAt))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-application-team")
                            .from(Application::table(), Application::column(application::Column::TeamId))
                            .to(Team::table(), Team::column(team::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-application-applicant")
                            .from(Application::table(), Application::column(application::Column::ApplicantId))
                            .to(User::table(), User::column(user::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. One application per (team, applicant)
        manager
            .create_index(
                Index::create()
                    .name("idx-application-team-applicant")
                    .table(Application::table())
                    .col(Application::column(application::Column::TeamId))
                    .col(Application::column(application::Column::ApplicantId))
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Application::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comment::table()).to_owned())
            .await?;
        Ok(())
    }
}
