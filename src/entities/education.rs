use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "educations")]
#[serde(rename_all = "camelCase")]
#[schema(as = EducationRecord)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub college_id: i32,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: Date,
    pub end_date: Date,
    pub cgpa: f64,
    pub year_of_study: i32,
    pub duration_months: i32,
    pub is_latest: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::college_master::Entity",
        from = "Column::CollegeId",
        to = "super::college_master::Column::Id"
    )]
    College,
}

impl Related<super::college_master::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::College.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
