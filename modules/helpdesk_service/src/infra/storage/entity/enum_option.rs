use sea_orm::entity::prelude::*;

/// Allowed values of an enum tag key
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "tag_enum_options")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tag_key_id: Uuid,
    pub value: String,
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
}

impl Related<super::tag_key::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TagKey.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
