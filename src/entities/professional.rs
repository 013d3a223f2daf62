use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use super::StringList;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "professionals")]
#[serde(rename_all = "camelCase")]
#[schema(as = ProfessionalRecord)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub current_title: String,
    pub experience_years: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub skills: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub industries: StringList,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip)]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
