//! Corporate directory: head-count ranges, office location and
//! industry/sector/service unions.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

use super::reload;
use crate::{
    core::DirectoryResource,
    entities::{
        corporate, corporate_industry, corporate_sector, corporate_service, country, industry,
        office, sector, service, state,
    },
    filtering::{Bound, Field, FilterPlan, Join, Predicate, RangeSet, SetSemantics, multi_value},
    pagination::{DataEnvelope, ListEnvelope, Paginated},
};

const ID: Field = Field::new("corporates", "id");
const DELETED_AT: Field = Field::new("corporates", "deleted_at");
const HEAD_COUNT: Field = Field::new("corporates", "head_count");
const COMPANY_NAME: Field = Field::new("corporates", "company_name");

// country and state each join offices under their own alias so both can be active
const COUNTRY_OFFICE: Join = Join::new("offices", "country_office", "corporate_id", ID);
const OFFICE_COUNTRY: Join = Join::new(
    "country_masters",
    "office_country",
    "id",
    COUNTRY_OFFICE.field("country_id"),
);
const STATE_OFFICE: Join = Join::new("offices", "state_office", "corporate_id", ID);
const OFFICE_STATE: Join = Join::new(
    "state_masters",
    "office_state",
    "id",
    STATE_OFFICE.field("state_id"),
);
const INDUSTRY_LINK: Join = Join::new("corporate_industries", "industry_link", "corporate_id", ID);
const INDUSTRY: Join = Join::new(
    "industry_masters",
    "industry",
    "id",
    INDUSTRY_LINK.field("industry_master_id"),
);
const SECTOR_LINK: Join = Join::new("corporate_sectors", "sector_link", "corporate_id", ID);
const SECTOR: Join = Join::new(
    "sector_masters",
    "sector",
    "id",
    SECTOR_LINK.field("sector_master_id"),
);
const SERVICE_LINK: Join = Join::new("corporate_services", "service_link", "corporate_id", ID);
const SERVICE: Join = Join::new(
    "service_masters",
    "service",
    "id",
    SERVICE_LINK.field("service_master_id"),
);

/// Query parameters for `GET /corporates`.
///
/// Every multi-value filter is a union: a corporate matches when it is
/// linked to any of the given names.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CorporateFilter {
    /// Head-count ranges such as `500-1000,2000+`; malformed segments are ignored
    #[serde(default, deserialize_with = "multi_value")]
    pub head_count_ranges: Vec<String>,
    /// Country names of any office
    #[serde(default, deserialize_with = "multi_value")]
    pub country: Vec<String>,
    /// State names of any office
    #[serde(default, deserialize_with = "multi_value")]
    pub states: Vec<String>,
    #[serde(default, deserialize_with = "multi_value")]
    pub sectors: Vec<String>,
    #[serde(default, deserialize_with = "multi_value")]
    pub industries: Vec<String>,
    #[serde(default, deserialize_with = "multi_value")]
    pub services: Vec<String>,
    /// Minimum head count
    pub min_size: Option<i32>,
    /// Substring of the company name
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Paginated for CorporateFilter {
    fn page(&self) -> Option<i64> {
        self.page
    }

    fn page_size(&self) -> Option<i64> {
        self.page_size
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfficeInput {
    pub name: String,
    pub country_id: i32,
    pub state_id: i32,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pin_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub head_count: i32,
}

/// Body of `POST /corporates` and `PUT /corporates/{id}`. Links and offices
/// are replaced wholesale.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorporatePayload {
    pub company_name: String,
    pub head_count: i32,
    #[serde(default)]
    pub industry_ids: Vec<i32>,
    #[serde(default)]
    pub sector_ids: Vec<i32>,
    #[serde(default)]
    pub service_ids: Vec<i32>,
    #[serde(default)]
    pub offices: Vec<OfficeInput>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfficeView {
    #[serde(flatten)]
    pub office: office::Model,
    pub country: Option<country::Model>,
    pub state: Option<state::Model>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Corporate {
    #[serde(flatten)]
    pub corporate: corporate::Model,
    pub industries: Vec<industry::Model>,
    pub sectors: Vec<sector::Model>,
    pub services: Vec<service::Model>,
    pub offices: Vec<OfficeView>,
}

fn unique(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

async fn replace_links(
    txn: &DatabaseTransaction,
    corporate_id: i32,
    payload: &CorporatePayload,
) -> Result<(), DbErr> {
    corporate_industry::Entity::delete_many()
        .filter(corporate_industry::Column::CorporateId.eq(corporate_id))
        .exec(txn)
        .await?;
    corporate_sector::Entity::delete_many()
        .filter(corporate_sector::Column::CorporateId.eq(corporate_id))
        .exec(txn)
        .await?;
    corporate_service::Entity::delete_many()
        .filter(corporate_service::Column::CorporateId.eq(corporate_id))
        .exec(txn)
        .await?;

    let industries = unique(&payload.industry_ids);
    if !industries.is_empty() {
        corporate_industry::Entity::insert_many(industries.into_iter().map(|id| {
            corporate_industry::ActiveModel {
                corporate_id: Set(corporate_id),
                industry_master_id: Set(id),
            }
        }))
        .exec_without_returning(txn)
        .await?;
    }

    let sectors = unique(&payload.sector_ids);
    if !sectors.is_empty() {
        corporate_sector::Entity::insert_many(sectors.into_iter().map(|id| {
            corporate_sector::ActiveModel {
                corporate_id: Set(corporate_id),
                sector_master_id: Set(id),
            }
        }))
        .exec_without_returning(txn)
        .await?;
    }

    let services = unique(&payload.service_ids);
    if !services.is_empty() {
        corporate_service::Entity::insert_many(services.into_iter().map(|id| {
            corporate_service::ActiveModel {
                corporate_id: Set(corporate_id),
                service_master_id: Set(id),
            }
        }))
        .exec_without_returning(txn)
        .await?;
    }

    Ok(())
}

async fn replace_offices(
    txn: &DatabaseTransaction,
    corporate_id: i32,
    offices: &[OfficeInput],
) -> Result<(), DbErr> {
    office::Entity::delete_many()
        .filter(office::Column::CorporateId.eq(corporate_id))
        .exec(txn)
        .await?;

    for input in offices {
        office::ActiveModel {
            corporate_id: Set(corporate_id),
            name: Set(input.name.clone()),
            country_id: Set(input.country_id),
            state_id: Set(input.state_id),
            city: Set(input.city.clone()),
            address: Set(input.address.clone()),
            pin_code: Set(input.pin_code.clone()),
            phone: Set(input.phone.clone()),
            head_count: Set(input.head_count),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl DirectoryResource for Corporate {
    type EntityType = corporate::Entity;
    type Filter = CorporateFilter;
    type Payload = CorporatePayload;

    const RESOURCE_NAME_SINGULAR: &'static str = "corporate";
    const RESOURCE_NAME_PLURAL: &'static str = "corporates";
    const ID: Field = ID;
    const DELETED_AT: Field = DELETED_AT;

    fn filter_plan(filter: &CorporateFilter) -> FilterPlan {
        Self::base_plan()
            .with(Predicate::in_ranges(
                HEAD_COUNT,
                RangeSet::<i64>::parse(&filter.head_count_ranges),
            ))
            .with(Predicate::compare(HEAD_COUNT, Bound::AtLeast, filter.min_size))
            .with(Predicate::matches_names(
                vec![COUNTRY_OFFICE, OFFICE_COUNTRY],
                OFFICE_COUNTRY.field("name"),
                &filter.country,
                SetSemantics::Any,
            ))
            .with(Predicate::matches_names(
                vec![STATE_OFFICE, OFFICE_STATE],
                OFFICE_STATE.field("name"),
                &filter.states,
                SetSemantics::Any,
            ))
            .with(Predicate::matches_names(
                vec![SECTOR_LINK, SECTOR],
                SECTOR.field("name"),
                &filter.sectors,
                SetSemantics::Any,
            ))
            .with(Predicate::matches_names(
                vec![INDUSTRY_LINK, INDUSTRY],
                INDUSTRY.field("name"),
                &filter.industries,
                SetSemantics::Any,
            ))
            .with(Predicate::matches_names(
                vec![SERVICE_LINK, SERVICE],
                SERVICE.field("name"),
                &filter.services,
                SetSemantics::Any,
            ))
            .with(Predicate::search(
                vec![],
                vec![COMPANY_NAME],
                filter.search.as_deref(),
            ))
    }

    /// Hydration profile: industries, sectors, services, offices with
    /// country and state.
    async fn hydrate(
        db: &DatabaseConnection,
        models: Vec<corporate::Model>,
    ) -> Result<Vec<Self>, DbErr> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();

        let mut industries: HashMap<i32, Vec<industry::Model>> = HashMap::new();
        for (link, industry) in corporate_industry::Entity::find()
            .find_also_related(industry::Entity)
            .filter(corporate_industry::Column::CorporateId.is_in(ids.clone()))
            .order_by_asc(corporate_industry::Column::IndustryMasterId)
            .all(db)
            .await?
        {
            industries.entry(link.corporate_id).or_default().extend(industry);
        }

        let mut sectors: HashMap<i32, Vec<sector::Model>> = HashMap::new();
        for (link, sector) in corporate_sector::Entity::find()
            .find_also_related(sector::Entity)
            .filter(corporate_sector::Column::CorporateId.is_in(ids.clone()))
            .order_by_asc(corporate_sector::Column::SectorMasterId)
            .all(db)
            .await?
        {
            sectors.entry(link.corporate_id).or_default().extend(sector);
        }

        let mut services: HashMap<i32, Vec<service::Model>> = HashMap::new();
        for (link, service) in corporate_service::Entity::find()
            .find_also_related(service::Entity)
            .filter(corporate_service::Column::CorporateId.is_in(ids.clone()))
            .order_by_asc(corporate_service::Column::ServiceMasterId)
            .all(db)
            .await?
        {
            services.entry(link.corporate_id).or_default().extend(service);
        }

        let office_rows = office::Entity::find()
            .filter(office::Column::CorporateId.is_in(ids))
            .order_by_asc(office::Column::Id)
            .all(db)
            .await?;
        let country_ids: Vec<i32> = office_rows.iter().map(|o| o.country_id).collect();
        let state_ids: Vec<i32> = office_rows.iter().map(|o| o.state_id).collect();
        let countries: HashMap<i32, country::Model> = country::Entity::find()
            .filter(country::Column::Id.is_in(country_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let states: HashMap<i32, state::Model> = state::Entity::find()
            .filter(state::Column::Id.is_in(state_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut offices: HashMap<i32, Vec<OfficeView>> = HashMap::new();
        for office in office_rows {
            offices.entry(office.corporate_id).or_default().push(OfficeView {
                country: countries.get(&office.country_id).cloned(),
                state: states.get(&office.state_id).cloned(),
                office,
            });
        }

        Ok(models
            .into_iter()
            .map(|corporate| {
                let id = corporate.id;
                Self {
                    industries: industries.remove(&id).unwrap_or_default(),
                    sectors: sectors.remove(&id).unwrap_or_default(),
                    services: services.remove(&id).unwrap_or_default(),
                    offices: offices.remove(&id).unwrap_or_default(),
                    corporate,
                }
            })
            .collect())
    }

    async fn create(db: &DatabaseConnection, payload: CorporatePayload) -> Result<Self, DbErr> {
        let now = Utc::now();
        let txn = db.begin().await?;

        let row = corporate::ActiveModel {
            company_name: Set(payload.company_name.clone()),
            head_count: Set(payload.head_count),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        replace_links(&txn, row.id, &payload).await?;
        replace_offices(&txn, row.id, &payload.offices).await?;
        txn.commit().await?;

        tracing::info!(corporate_id = row.id, "corporate created");
        reload(db, row.id).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i32,
        payload: CorporatePayload,
    ) -> Result<Self, DbErr> {
        let txn = db.begin().await?;

        let row = corporate::Entity::update(corporate::ActiveModel {
            id: Set(id),
            company_name: Set(payload.company_name.clone()),
            head_count: Set(payload.head_count),
            updated_at: Set(Utc::now()),
            ..Default::default()
        })
        .filter(corporate::Column::DeletedAt.is_null())
        .exec(&txn)
        .await?;
        replace_links(&txn, row.id, &payload).await?;
        replace_offices(&txn, row.id, &payload.offices).await?;
        txn.commit().await?;

        reload(db, row.id).await
    }
}

crate::directory_router!(Corporate, CorporateFilter, CorporatePayload);

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, sea_query::SqliteQueryBuilder};

    fn render(filter: &CorporateFilter) -> String {
        Corporate::filter_plan(filter)
            .matching_ids(DbBackend::Sqlite)
            .to_string(SqliteQueryBuilder)
    }

    #[test]
    fn test_head_count_ranges_skip_malformed() {
        let sql = render(&CorporateFilter {
            head_count_ranges: vec!["500-1000,2000+".into(), "abc-500".into()],
            ..Default::default()
        });
        assert!(sql.contains(r#""corporates"."head_count" BETWEEN 500 AND 1000"#), "{sql}");
        assert!(sql.contains(r#""corporates"."head_count" > 2000"#), "{sql}");
    }

    #[test]
    fn test_head_count_bounds_are_whole_numbers() {
        let sql = render(&CorporateFilter {
            head_count_ranges: vec!["500.5-1000".into(), "50-100".into()],
            ..Default::default()
        });
        assert!(sql.contains(r#""corporates"."head_count" BETWEEN 50 AND 100"#), "{sql}");
        assert!(!sql.contains("500"), "{sql}");
    }

    #[test]
    fn test_country_and_state_use_distinct_office_aliases() {
        let sql = render(&CorporateFilter {
            country: vec!["India".into()],
            states: vec!["Karnataka".into(), "Goa".into()],
            ..Default::default()
        });
        assert!(sql.contains(r#""offices" AS "country_office""#), "{sql}");
        assert!(sql.contains(r#""offices" AS "state_office""#), "{sql}");
        assert!(sql.contains(r#"LOWER("office_state"."name") IN ('karnataka', 'goa')"#), "{sql}");
        assert!(!sql.contains("HAVING"), "{sql}");
        assert_eq!(sql.matches("GROUP BY").count(), 1, "{sql}");
    }

    #[test]
    fn test_industries_union() {
        let sql = render(&CorporateFilter {
            industries: vec!["FinTech".into(), "EdTech".into()],
            ..Default::default()
        });
        assert!(sql.contains(r#"LOWER("industry"."name") IN ('fintech', 'edtech')"#), "{sql}");
        assert!(!sql.contains("HAVING"), "{sql}");
    }

    #[test]
    fn test_search_on_company_name_without_join() {
        let sql = render(&CorporateFilter {
            search: Some("tech".into()),
            ..Default::default()
        });
        assert!(sql.contains(r#"LOWER("corporates"."company_name") LIKE '%tech%'"#), "{sql}");
        assert!(!sql.contains("JOIN"), "{sql}");
    }

    #[test]
    fn test_min_size() {
        let sql = render(&CorporateFilter {
            min_size: Some(50),
            ..Default::default()
        });
        assert!(sql.contains(r#""corporates"."head_count" >= 50"#), "{sql}");
    }
}
