use sea_orm::entity::prelude::*;

/// Selected enum option of a tag on a ticket
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "tag_enum_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tag_key_id: Uuid,
    pub ticket_id: Uuid,
    pub enum_option_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tag_key::Entity",
        from = "Column::TagKeyId",
        to = "super::tag_key::Column::Id"
    )]
    TagKey,
    #[sea_orm(
        belongs_to = "super::ticket::Entity",
        from = "Column::TicketId",
        to = "super::ticket::Column::Id"
    )]
    Ticket,
    #[sea_orm(
        belongs_to = "super::enum_option::Entity",
        from = "Column::EnumOptionId",
        to = "super::enum_option::Column::Id"
    )]
    EnumOption,
}

impl ActiveModelBehavior for ActiveModel {}
