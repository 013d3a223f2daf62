//! Read-only master lookups under `/masters/{kind}`, each returned whole as
//! `{data: [...]}` ordered by id.

use axum::{Json, extract::State};
use sea_orm::{EntityTrait, QueryOrder};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{
    entities::{
        college_master, company_master, country, industry, sector, service, skill, state,
    },
    errors::ApiError,
    pagination::DataEnvelope,
    state::AppState,
};

/// A state with its country embedded.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    #[serde(flatten)]
    pub state: state::Model,
    pub country: Option<country::Model>,
}

macro_rules! master_list {
    ($handler:ident, $path:literal, $entity:ident, $kind:literal) => {
        #[utoipa::path(
            get,
            path = $path,
            responses(
                (status = axum::http::StatusCode::OK, description = "Every record of this kind wrapped in `data`", body = [$entity::Model]),
                (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
            ),
            tag = "masters"
        )]
        pub async fn $handler(
            State(app): State<AppState>,
        ) -> Result<Json<DataEnvelope<Vec<$entity::Model>>>, ApiError> {
            let data = $entity::Entity::find()
                .order_by_asc($entity::Column::Id)
                .all(&app.db)
                .await
                .map_err(|err| ApiError::database(concat!("fetch ", $kind), err))?;
            Ok(Json(DataEnvelope { data }))
        }
    };
}

master_list!(list_industries, "/industries", industry, "industries");
master_list!(list_companies, "/companies", company_master, "companies");
master_list!(list_sectors, "/sectors", sector, "sectors");
master_list!(list_services, "/services", service, "services");
master_list!(list_skills, "/skills", skill, "skills");
master_list!(list_countries, "/countries", country, "countries");
master_list!(list_colleges, "/colleges", college_master, "colleges");

#[utoipa::path(
    get,
    path = "/states",
    responses(
        (status = axum::http::StatusCode::OK, description = "All states with their country, wrapped in `data`", body = [StateView]),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    tag = "masters"
)]
pub async fn list_states(
    State(app): State<AppState>,
) -> Result<Json<DataEnvelope<Vec<StateView>>>, ApiError> {
    let data = state::Entity::find()
        .find_also_related(country::Entity)
        .order_by_asc(state::Column::Id)
        .all(&app.db)
        .await
        .map_err(|err| ApiError::database("fetch states", err))?
        .into_iter()
        .map(|(state, country)| StateView { state, country })
        .collect();
    Ok(Json(DataEnvelope { data }))
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_industries))
        .routes(routes!(list_companies))
        .routes(routes!(list_sectors))
        .routes(routes!(list_services))
        .routes(routes!(list_states))
        .routes(routes!(list_skills))
        .routes(routes!(list_countries))
        .routes(routes!(list_colleges))
}
