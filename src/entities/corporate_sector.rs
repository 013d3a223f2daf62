use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "corporate_sectors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub corporate_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub sector_master_id: i32,
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
        belongs_to = "super::sector::Entity",
        from = "Column::SectorMasterId",
        to = "super::sector::Column::Id"
    )]
    Sector,
}

impl Related<super::sector::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sector.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
