use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "corporate_services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub corporate_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_master_id: i32,
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
        belongs_to = "super::service::Entity",
        from = "Column::ServiceMasterId",
        to = "super::service::Column::Id"
    )]
    Service,
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
