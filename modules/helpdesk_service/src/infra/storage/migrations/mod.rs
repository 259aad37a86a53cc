//! Database migrations for the helpdesk service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_organizations_and_profiles::Migration),
            Box::new(m20250301_000002_create_memberships::Migration),
            Box::new(m20250301_000003_create_tickets::Migration),
            Box::new(m20250301_000004_create_tags::Migration),
        ]
    }
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

fn timestamp_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn deleted_at_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).timestamp_with_time_zone().null().to_owned()
}

mod m20250301_000001_create_organizations_and_profiles {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_organizations_and_profiles"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Organizations::Table)
                        .if_not_exists()
                        .col(id_col(Organizations::Id))
                        .col(ColumnDef::new(Organizations::Name).string().not_null())
                        .col(timestamp_col(Organizations::CreatedAt))
                        .col(timestamp_col(Organizations::UpdatedAt))
                        .col(deleted_at_col(Organizations::DeletedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Profiles::Table)
                        .if_not_exists()
                        .col(id_col(Profiles::Id))
                        .col(ColumnDef::new(Profiles::FullName).string())
                        .col(ColumnDef::new(Profiles::AvatarUrl).string())
                        .col(timestamp_col(Profiles::CreatedAt))
                        .col(timestamp_col(Profiles::UpdatedAt))
                        .col(deleted_at_col(Profiles::DeletedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Profiles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Organizations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
        Name,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum Profiles {
        Table,
        Id,
        FullName,
        AvatarUrl,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }
}

mod m20250301_000002_create_memberships {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_memberships"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrganizationMembers::Table)
                        .if_not_exists()
                        .col(id_col(OrganizationMembers::Id))
                        .col(
                            ColumnDef::new(OrganizationMembers::OrganizationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrganizationMembers::ProfileId).uuid().not_null())
                        .col(
                            ColumnDef::new(OrganizationMembers::Role)
                                .string()
                                .not_null()
                                .default("member"),
                        )
                        .col(timestamp_col(OrganizationMembers::CreatedAt))
                        .col(timestamp_col(OrganizationMembers::UpdatedAt))
                        .col(deleted_at_col(OrganizationMembers::DeletedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_organization_members_organization")
                                .from(OrganizationMembers::Table, OrganizationMembers::OrganizationId)
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_organization_members_profile")
                                .from(OrganizationMembers::Table, OrganizationMembers::ProfileId)
                                .to(Profiles::Table, Profiles::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_organization_members_organization_profile")
                        .table(OrganizationMembers::Table)
                        .col(OrganizationMembers::OrganizationId)
                        .col(OrganizationMembers::ProfileId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_organization_members_profile_id")
                        .table(OrganizationMembers::Table)
                        .col(OrganizationMembers::ProfileId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrganizationInvitations::Table)
                        .if_not_exists()
                        .col(id_col(OrganizationInvitations::Id))
                        .col(
                            ColumnDef::new(OrganizationInvitations::OrganizationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrganizationInvitations::Email).string().not_null())
                        .col(
                            ColumnDef::new(OrganizationInvitations::Role)
                                .string()
                                .not_null()
                                .default("member"),
                        )
                        .col(ColumnDef::new(OrganizationInvitations::InvitedBy).uuid())
                        .col(timestamp_col(OrganizationInvitations::CreatedAt))
                        .col(timestamp_col(OrganizationInvitations::UpdatedAt))
                        .col(deleted_at_col(OrganizationInvitations::DeletedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_organization_invitations_organization")
                                .from(
                                    OrganizationInvitations::Table,
                                    OrganizationInvitations::OrganizationId,
                                )
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_organization_invitations_invited_by")
                                .from(
                                    OrganizationInvitations::Table,
                                    OrganizationInvitations::InvitedBy,
                                )
                                .to(Profiles::Table, Profiles::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_organization_invitations_email")
                        .table(OrganizationInvitations::Table)
                        .col(OrganizationInvitations::Email)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrganizationInvitations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrganizationMembers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrganizationMembers {
        Table,
        Id,
        OrganizationId,
        ProfileId,
        Role,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum OrganizationInvitations {
        Table,
        Id,
        OrganizationId,
        Email,
        Role,
        InvitedBy,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Profiles {
        Table,
        Id,
    }
}

mod m20250301_000003_create_tickets {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_tickets"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tickets::Table)
                        .if_not_exists()
                        .col(id_col(Tickets::Id))
                        .col(ColumnDef::new(Tickets::OrganizationId).uuid().not_null())
                        .col(ColumnDef::new(Tickets::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Tickets::AssignedTo).uuid())
                        .col(ColumnDef::new(Tickets::Title).string().not_null())
                        .col(ColumnDef::new(Tickets::Description).text())
                        .col(
                            ColumnDef::new(Tickets::Status)
                                .string()
                                .not_null()
                                .default("open"),
                        )
                        .col(
                            ColumnDef::new(Tickets::Priority)
                                .string()
                                .not_null()
                                .default("medium"),
                        )
                        .col(timestamp_col(Tickets::CreatedAt))
                        .col(timestamp_col(Tickets::UpdatedAt))
                        .col(deleted_at_col(Tickets::DeletedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tickets_organization")
                                .from(Tickets::Table, Tickets::OrganizationId)
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tickets_created_by")
                                .from(Tickets::Table, Tickets::CreatedBy)
                                .to(Profiles::Table, Profiles::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tickets_assigned_to")
                                .from(Tickets::Table, Tickets::AssignedTo)
                                .to(Profiles::Table, Profiles::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_tickets_organization_id")
                        .table(Tickets::Table)
                        .col(Tickets::OrganizationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TicketComments::Table)
                        .if_not_exists()
                        .col(id_col(TicketComments::Id))
                        .col(ColumnDef::new(TicketComments::TicketId).uuid().not_null())
                        .col(ColumnDef::new(TicketComments::UserId).uuid().not_null())
                        .col(ColumnDef::new(TicketComments::Comment).text().not_null())
                        .col(timestamp_col(TicketComments::CreatedAt))
                        .col(timestamp_col(TicketComments::UpdatedAt))
                        .col(deleted_at_col(TicketComments::DeletedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_ticket_comments_ticket")
                                .from(TicketComments::Table, TicketComments::TicketId)
                                .to(Tickets::Table, Tickets::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_ticket_comments_user")
                                .from(TicketComments::Table, TicketComments::UserId)
                                .to(Profiles::Table, Profiles::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_ticket_comments_ticket_id")
                        .table(TicketComments::Table)
                        .col(TicketComments::TicketId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TicketComments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tickets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Tickets {
        Table,
        Id,
        OrganizationId,
        CreatedBy,
        AssignedTo,
        Title,
        Description,
        Status,
        Priority,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum TicketComments {
        Table,
        Id,
        TicketId,
        UserId,
        Comment,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Profiles {
        Table,
        Id,
    }
}

mod m20250301_000004_create_tags {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_tags"
        }
    }

    /// Shared layout of the scalar value tables
    fn value_table(table: TagValues, value: ColumnDef) -> TableCreateStatement {
        let name = table.to_string();
        Table::create()
            .table(table)
            .if_not_exists()
            .col(id_col(TagValues::Id))
            .col(ColumnDef::new(TagValues::TagKeyId).uuid().not_null())
            .col(ColumnDef::new(TagValues::TicketId).uuid().not_null())
            .col(value)
            .col(timestamp_col(TagValues::CreatedAt))
            .col(timestamp_col(TagValues::UpdatedAt))
            .col(deleted_at_col(TagValues::DeletedAt))
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_tag_key", name))
                    .from(table, TagValues::TagKeyId)
                    .to(TagKeys::Table, TagKeys::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_ticket", name))
                    .from(table, TagValues::TicketId)
                    .to(Tickets::Table, Tickets::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned()
    }

    /// One value row per (ticket, key); cleared values are revived in place
    fn value_index(table: TagValues) -> IndexCreateStatement {
        Index::create()
            .name(format!("idx_{}_ticket_key", table.to_string()))
            .table(table)
            .col(TagValues::TicketId)
            .col(TagValues::TagKeyId)
            .unique()
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TagKeys::Table)
                        .if_not_exists()
                        .col(id_col(TagKeys::Id))
                        .col(ColumnDef::new(TagKeys::OrganizationId).uuid().not_null())
                        .col(ColumnDef::new(TagKeys::Name).string().not_null())
                        .col(ColumnDef::new(TagKeys::TagType).string().not_null())
                        .col(ColumnDef::new(TagKeys::Description).text())
                        .col(timestamp_col(TagKeys::CreatedAt))
                        .col(timestamp_col(TagKeys::UpdatedAt))
                        .col(deleted_at_col(TagKeys::DeletedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tag_keys_organization")
                                .from(TagKeys::Table, TagKeys::OrganizationId)
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TagEnumOptions::Table)
                        .if_not_exists()
                        .col(id_col(TagEnumOptions::Id))
                        .col(ColumnDef::new(TagEnumOptions::TagKeyId).uuid().not_null())
                        .col(ColumnDef::new(TagEnumOptions::Value).string().not_null())
                        .col(timestamp_col(TagEnumOptions::CreatedAt))
                        .col(timestamp_col(TagEnumOptions::UpdatedAt))
                        .col(deleted_at_col(TagEnumOptions::DeletedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tag_enum_options_tag_key")
                                .from(TagEnumOptions::Table, TagEnumOptions::TagKeyId)
                                .to(TagKeys::Table, TagKeys::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(value_table(
                    TagValues::TagTextValues,
                    ColumnDef::new(TagValues::Value).text().not_null().to_owned(),
                ))
                .await?;
            manager
                .create_table(value_table(
                    TagValues::TagNumberValues,
                    ColumnDef::new(TagValues::Value).double().not_null().to_owned(),
                ))
                .await?;
            manager
                .create_table(value_table(
                    TagValues::TagDateValues,
                    ColumnDef::new(TagValues::Value).date().not_null().to_owned(),
                ))
                .await?;

            let mut enum_values = value_table(
                TagValues::TagEnumValues,
                ColumnDef::new(TagValues::EnumOptionId).uuid().not_null().to_owned(),
            );
            enum_values.foreign_key(
                ForeignKey::create()
                    .name("fk_tag_enum_values_option")
                    .from(TagValues::TagEnumValues, TagValues::EnumOptionId)
                    .to(TagEnumOptions::Table, TagEnumOptions::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            );
            manager.create_table(enum_values).await?;

            for table in TagValues::TABLES {
                manager.create_index(value_index(table)).await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in TagValues::TABLES {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            manager
                .drop_table(Table::drop().table(TagEnumOptions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TagKeys::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum TagKeys {
        Table,
        Id,
        OrganizationId,
        Name,
        TagType,
        Description,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum TagEnumOptions {
        Table,
        Id,
        TagKeyId,
        Value,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    /// The four value tables and their shared columns
    #[derive(DeriveIden, Clone, Copy)]
    enum TagValues {
        TagTextValues,
        TagNumberValues,
        TagDateValues,
        TagEnumValues,
        Id,
        TagKeyId,
        TicketId,
        Value,
        EnumOptionId,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    impl TagValues {
        const TABLES: [TagValues; 4] = [
            TagValues::TagTextValues,
            TagValues::TagNumberValues,
            TagValues::TagDateValues,
            TagValues::TagEnumValues,
        ];
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Tickets {
        Table,
        Id,
    }
}
