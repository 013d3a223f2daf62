use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use super::StringList;

/// A college's directory listing, distinct from the `college_masters` lookup.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "colleges")]
#[serde(rename_all = "camelCase")]
#[schema(as = CollegeRecord)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub college_name: String,
    pub location: String,
    pub accreditation: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub departments: StringList,
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

impl ActiveModelBehavior for ActiveModel {}
