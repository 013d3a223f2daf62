use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{reload, users_by_id};
use crate::{
    core::DirectoryResource,
    entities::{college, user},
    filtering::{Field, FilterPlan, Predicate, multi_value},
    pagination::{DataEnvelope, ListEnvelope, Paginated},
};

const ID: Field = Field::new("colleges", "id");
const DELETED_AT: Field = Field::new("colleges", "deleted_at");
const COLLEGE_NAME: Field = Field::new("colleges", "college_name");
const LOCATION: Field = Field::new("colleges", "location");
const ACCREDITATION: Field = Field::new("colleges", "accreditation");
const DEPARTMENTS: Field = Field::new("colleges", "departments");

/// Query parameters for `GET /colleges`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CollegeFilter {
    pub college_name: Option<String>,
    pub location: Option<String>,
    pub accreditation: Option<String>,
    /// A college must list every one of these departments (exact match)
    #[serde(default, deserialize_with = "multi_value")]
    pub departments: Vec<String>,
    /// Matches college name or location
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Paginated for CollegeFilter {
    fn page(&self) -> Option<i64> {
        self.page
    }

    fn page_size(&self) -> Option<i64> {
        self.page_size
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollegePayload {
    pub user_id: i32,
    pub college_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub accreditation: String,
    #[serde(default)]
    pub departments: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct College {
    #[serde(flatten)]
    pub college: college::Model,
    pub user: Option<user::Model>,
}

#[async_trait]
impl DirectoryResource for College {
    type EntityType = college::Entity;
    type Filter = CollegeFilter;
    type Payload = CollegePayload;

    const RESOURCE_NAME_SINGULAR: &'static str = "college";
    const RESOURCE_NAME_PLURAL: &'static str = "colleges";
    const ID: Field = ID;
    const DELETED_AT: Field = DELETED_AT;

    fn filter_plan(filter: &CollegeFilter) -> FilterPlan {
        Self::base_plan()
            .with(Predicate::contains(COLLEGE_NAME, filter.college_name.as_deref()))
            .with(Predicate::contains(LOCATION, filter.location.as_deref()))
            .with(Predicate::contains(ACCREDITATION, filter.accreditation.as_deref()))
            .with(Predicate::contains_all(DEPARTMENTS, &filter.departments))
            .with(Predicate::search(
                vec![],
                vec![COLLEGE_NAME, LOCATION],
                filter.search.as_deref(),
            ))
    }

    async fn hydrate(
        db: &DatabaseConnection,
        models: Vec<college::Model>,
    ) -> Result<Vec<Self>, DbErr> {
        let users = users_by_id(db, models.iter().map(|m| m.user_id)).await?;
        Ok(models
            .into_iter()
            .map(|college| Self {
                user: users.get(&college.user_id).cloned(),
                college,
            })
            .collect())
    }

    async fn create(db: &DatabaseConnection, payload: CollegePayload) -> Result<Self, DbErr> {
        let now = Utc::now();
        let row = college::ActiveModel {
            user_id: Set(payload.user_id),
            college_name: Set(payload.college_name),
            location: Set(payload.location),
            accreditation: Set(payload.accreditation),
            departments: Set(payload.departments.into()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(college_id = row.id, "college created");
        reload(db, row.id).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i32,
        payload: CollegePayload,
    ) -> Result<Self, DbErr> {
        let row = college::Entity::update(college::ActiveModel {
            id: Set(id),
            user_id: Set(payload.user_id),
            college_name: Set(payload.college_name),
            location: Set(payload.location),
            accreditation: Set(payload.accreditation),
            departments: Set(payload.departments.into()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        })
        .filter(college::Column::DeletedAt.is_null())
        .exec(db)
        .await?;

        reload(db, row.id).await
    }
}

crate::directory_router!(College, CollegeFilter, CollegePayload);
