use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 150).unique_key())
                    .col(string_null(Users::Password))
                    .col(string_null(Users::Nickname))
                    .col(string_null(Users::Email))
                    .col(text_null(Users::Introduction))
                    .col(string_null(Users::Image))
                    .col(boolean(Users::IsGithubAuthenticated).default(false))
                    .col(big_integer_null(Users::GithubId).unique_key())
                    .col(boolean(Users::IsActive).default(true))
                    .col(timestamp_with_time_zone(Users::DateJoined))
                    .to_owned(),
            )
            .await?;

        // Create tags table
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(string_len(Tags::Name, 50).primary_key())
                    .to_owned(),
            )
            .await?;

        // Create teams table
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(pk_auto(Teams::Id))
                    .col(integer(Teams::LeaderId))
                    .col(string(Teams::Title))
                    .col(text(Teams::Description))
                    .col(date(Teams::EndDate))
                    .col(string_null(Teams::Image))
                    .col(integer(Teams::MaxPersonnel))
                    .col(integer(Teams::CurrentPersonnel).default(1))
                    .col(string(Teams::ChatUrl))
                    .col(timestamp_with_time_zone(Teams::CreatedAt))
                    .col(timestamp_with_time_zone(Teams::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_leader")
                            .from(Teams::Table, Teams::LeaderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create teams_tags table (join table)
        manager
            .create_table(
                Table::create()
                    .table(TeamsTags::Table)
                    .if_not_exists()
                    .col(integer(TeamsTags::TeamId))
                    .col(string_len(TeamsTags::TagName, 50))
                    .primary_key(
                        Index::create()
                            .name("pk_teams_tags")
                            .col(TeamsTags::TeamId)
                            .col(TeamsTags::TagName),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_tags_team")
                            .from(TeamsTags::Table, TeamsTags::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_tags_tag")
                            .from(TeamsTags::Table, TeamsTags::TagName)
                            .to(Tags::Table, Tags::Name)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create teams_likes table (join table)
        manager
            .create_table(
                Table::create()
                    .table(TeamsLikes::Table)
                    .if_not_exists()
                    .col(integer(TeamsLikes::TeamId))
                    .col(integer(TeamsLikes::UserId))
                    .primary_key(
                        Index::create()
                            .name("pk_teams_likes")
                            .col(TeamsLikes::TeamId)
                            .col(TeamsLikes::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_likes_team")
                            .from(TeamsLikes::Table, TeamsLikes::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_likes_user")
                            .from(TeamsLikes::Table, TeamsLikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeamsLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamsTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

// Define identifiers for all tables
#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Password,
    Nickname,
    Email,
    Introduction,
    Image,
    IsGithubAuthenticated,
    GithubId,
    IsActive,
    DateJoined,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    LeaderId,
    Title,
    Description,
    EndDate,
    Image,
    MaxPersonnel,
    CurrentPersonnel,
    ChatUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeamsTags {
    Table,
    TeamId,
    TagName,
}

#[derive(DeriveIden)]
enum TeamsLikes {
    Table,
    TeamId,
    UserId,
}
