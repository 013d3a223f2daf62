//! Professional directory: title, experience floor and superset matching on
//! the skills and industries arrays.

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
    entities::{professional, user},
    filtering::{Bound, Field, FilterPlan, Join, Predicate, multi_value},
    pagination::{DataEnvelope, ListEnvelope, Paginated},
};

const ID: Field = Field::new("professionals", "id");
const USER_ID: Field = Field::new("professionals", "user_id");
const DELETED_AT: Field = Field::new("professionals", "deleted_at");
const CURRENT_TITLE: Field = Field::new("professionals", "current_title");
const EXPERIENCE_YEARS: Field = Field::new("professionals", "experience_years");
const SKILLS: Field = Field::new("professionals", "skills");
const INDUSTRIES: Field = Field::new("professionals", "industries");

const SEARCH_USER: Join = Join::new("users", "search_user", "id", USER_ID);

/// Query parameters for `GET /professionals`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProfessionalFilter {
    /// Substring of the current title
    pub title: Option<String>,
    pub min_experience: Option<i32>,
    /// Every listed skill must be present (exact match)
    #[serde(default, deserialize_with = "multi_value")]
    pub skills: Vec<String>,
    /// Every listed industry must be present (exact match)
    #[serde(default, deserialize_with = "multi_value")]
    pub industries: Vec<String>,
    /// Matches first name, last name or current title
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Paginated for ProfessionalFilter {
    fn page(&self) -> Option<i64> {
        self.page
    }

    fn page_size(&self) -> Option<i64> {
        self.page_size
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalPayload {
    pub user_id: i32,
    pub current_title: String,
    #[serde(default)]
    pub experience_years: i32,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    #[serde(flatten)]
    pub professional: professional::Model,
    pub user: Option<user::Model>,
}

#[async_trait]
impl DirectoryResource for Professional {
    type EntityType = professional::Entity;
    type Filter = ProfessionalFilter;
    type Payload = ProfessionalPayload;

    const RESOURCE_NAME_SINGULAR: &'static str = "professional";
    const RESOURCE_NAME_PLURAL: &'static str = "professionals";
    const ID: Field = ID;
    const DELETED_AT: Field = DELETED_AT;

    fn filter_plan(filter: &ProfessionalFilter) -> FilterPlan {
        Self::base_plan()
            .with(Predicate::contains(CURRENT_TITLE, filter.title.as_deref()))
            .with(Predicate::compare(
                EXPERIENCE_YEARS,
                Bound::AtLeast,
                filter.min_experience,
            ))
            .with(Predicate::contains_all(SKILLS, &filter.skills))
            .with(Predicate::contains_all(INDUSTRIES, &filter.industries))
            .with(Predicate::search(
                vec![SEARCH_USER],
                vec![
                    SEARCH_USER.field("first_name"),
                    SEARCH_USER.field("last_name"),
                    CURRENT_TITLE,
                ],
                filter.search.as_deref(),
            ))
    }

    async fn hydrate(
        db: &DatabaseConnection,
        models: Vec<professional::Model>,
    ) -> Result<Vec<Self>, DbErr> {
        let users = users_by_id(db, models.iter().map(|m| m.user_id)).await?;
        Ok(models
            .into_iter()
            .map(|professional| Self {
                user: users.get(&professional.user_id).cloned(),
                professional,
            })
            .collect())
    }

    async fn create(db: &DatabaseConnection, payload: ProfessionalPayload) -> Result<Self, DbErr> {
        let now = Utc::now();
        let row = professional::ActiveModel {
            user_id: Set(payload.user_id),
            current_title: Set(payload.current_title),
            experience_years: Set(payload.experience_years),
            skills: Set(payload.skills.into()),
            industries: Set(payload.industries.into()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(professional_id = row.id, "professional created");
        reload(db, row.id).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i32,
        payload: ProfessionalPayload,
    ) -> Result<Self, DbErr> {
        let row = professional::Entity::update(professional::ActiveModel {
            id: Set(id),
            user_id: Set(payload.user_id),
            current_title: Set(payload.current_title),
            experience_years: Set(payload.experience_years),
            skills: Set(payload.skills.into()),
            industries: Set(payload.industries.into()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        })
        .filter(professional::Column::DeletedAt.is_null())
        .exec(db)
        .await?;

        reload(db, row.id).await
    }
}

crate::directory_router!(Professional, ProfessionalFilter, ProfessionalPayload);

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{
        DbBackend,
        sea_query::{MysqlQueryBuilder, PostgresQueryBuilder, SqliteQueryBuilder},
    };

    #[test]
    fn test_search_joins_users_only_when_present() {
        let plain = ProfessionalFilter {
            title: Some("Engineer".into()),
            ..Default::default()
        };
        let sql = Professional::filter_plan(&plain)
            .matching_ids(DbBackend::Sqlite)
            .to_string(SqliteQueryBuilder);
        assert!(!sql.contains("JOIN"), "{sql}");

        let searching = ProfessionalFilter {
            search: Some("lead".into()),
            ..Default::default()
        };
        let sql = Professional::filter_plan(&searching)
            .matching_ids(DbBackend::Sqlite)
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""users" AS "search_user""#), "{sql}");
        assert!(sql.contains(r#"LOWER("professionals"."current_title") LIKE '%lead%'"#), "{sql}");
    }

    #[test]
    fn test_skills_superset_per_backend() {
        let filter = ProfessionalFilter {
            skills: vec!["Rust".into(), "Go".into()],
            min_experience: Some(3),
            ..Default::default()
        };
        let plan = Professional::filter_plan(&filter);

        let pg = plan.matching_ids(DbBackend::Postgres).to_string(PostgresQueryBuilder);
        assert!(pg.contains(r#""professionals"."skills" @> CAST("#), "{pg}");

        let my = plan.matching_ids(DbBackend::MySql).to_string(MysqlQueryBuilder);
        assert!(my.contains("JSON_CONTAINS(`professionals`.`skills`"), "{my}");
        assert!(my.contains("`professionals`.`experience_years` >= 3"), "{my}");
    }
}
