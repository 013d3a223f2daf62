use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "offices")]
#[serde(rename_all = "camelCase")]
#[schema(as = OfficeRecord)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub corporate_id: i32,
    pub name: String,
    pub country_id: i32,
    pub state_id: i32,
    pub city: String,
    pub address: String,
    pub pin_code: String,
    pub phone: String,
    pub head_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::corporate::Entity",
        from = "Column::CorporateId",
        to = "super::corporate::Column::Id",
        on_delete = "Cascade"
    )]
    Corporate,
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id"
    )]
    Country,
    #[sea_orm(
        belongs_to = "super::state::Entity",
        from = "Column::StateId",
        to = "super::state::Column::Id"
    )]
    State,
}

impl ActiveModelBehavior for ActiveModel {}
