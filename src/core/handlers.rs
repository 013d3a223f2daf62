//! Generic axum handlers shared by every directory resource.
//!
//! [`directory_router!`](crate::directory_router) stamps out concrete,
//! OpenAPI-documented wrappers around these for one resource.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::{Query, QueryRejection};

use super::resource::{DirectoryResource, fetch_page};
use crate::{
    errors::ApiError,
    pagination::{DataEnvelope, ListEnvelope, MessageEnvelope},
    state::AppState,
};

/// Parse a path id as a non-negative 32-bit integer.
///
/// # Errors
///
/// `400 invalid <resource> ID` for anything else.
pub fn parse_id(raw: &str, resource: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| ApiError::bad_request(format!("invalid {resource} ID")))
}

pub async fn get_all<R: DirectoryResource>(
    State(state): State<AppState>,
    query: Result<Query<R::Filter>, QueryRejection>,
) -> Result<Json<ListEnvelope<R>>, ApiError> {
    let Query(filter) = query.map_err(|rejection| ApiError::bad_request(rejection.to_string()))?;
    let page = fetch_page::<R>(&state.db, &filter, state.max_page_size())
        .await
        .map_err(|err| ApiError::database(format!("fetch {}", R::RESOURCE_NAME_PLURAL), err))?;
    Ok(Json(page))
}

pub async fn get_one<R: DirectoryResource>(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DataEnvelope<R>>, ApiError> {
    let id = parse_id(&raw_id, R::RESOURCE_NAME_SINGULAR)?;
    let item = R::get_one(&state.db, id)
        .await
        .map_err(|err| ApiError::database(format!("get {}", R::RESOURCE_NAME_SINGULAR), err))?
        .ok_or_else(|| ApiError::not_found(R::RESOURCE_NAME_SINGULAR))?;
    Ok(Json(DataEnvelope { data: item }))
}

pub async fn create_one<R: DirectoryResource>(
    State(state): State<AppState>,
    body: Result<Json<R::Payload>, JsonRejection>,
) -> Result<(StatusCode, Json<DataEnvelope<R>>), ApiError> {
    let Json(payload) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let item = R::create(&state.db, payload)
        .await
        .map_err(|err| ApiError::database(format!("create {}", R::RESOURCE_NAME_SINGULAR), err))?;
    Ok((StatusCode::CREATED, Json(DataEnvelope { data: item })))
}

pub async fn update_one<R: DirectoryResource>(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<R::Payload>, JsonRejection>,
) -> Result<Json<DataEnvelope<R>>, ApiError> {
    let id = parse_id(&raw_id, R::RESOURCE_NAME_SINGULAR)?;
    let Json(payload) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let item = R::update(&state.db, id, payload)
        .await
        .map_err(|err| ApiError::database(format!("update {}", R::RESOURCE_NAME_SINGULAR), err))?;
    Ok(Json(DataEnvelope { data: item }))
}

pub async fn delete_one<R: DirectoryResource>(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageEnvelope>, ApiError> {
    let id = parse_id(&raw_id, R::RESOURCE_NAME_SINGULAR)?;
    R::delete(&state.db, id)
        .await
        .map_err(|err| ApiError::database(format!("delete {}", R::RESOURCE_NAME_SINGULAR), err))?;
    Ok(Json(MessageEnvelope {
        message: format!("{} deleted successfully", R::RESOURCE_NAME_SINGULAR),
    }))
}

/// Build the documented CRUD router for one resource.
///
/// utoipa names generic response bodies by their last path segment, so the
/// calling module must import `DataEnvelope` and `ListEnvelope`.
///
/// ```rust,ignore
/// use crate::pagination::{DataEnvelope, ListEnvelope};
///
/// directory_router!(Student, StudentFilter, StudentPayload);
/// // later: OpenApiRouter::new().nest("/students", router())
/// ```
#[macro_export]
macro_rules! directory_router {
    ($resource:ty, $filter:ty, $payload:ty) => {
        #[utoipa::path(
            get,
            path = "/",
            params($filter),
            responses(
                (status = axum::http::StatusCode::OK, description = "Page of matching records as `{data, page, pageSize, totalItems}`", body = $crate::pagination::ListEnvelope<$resource>),
                (status = axum::http::StatusCode::BAD_REQUEST, description = "Query string could not be bound"),
                (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
            ),
            operation_id = format!("get_all_{}", <$resource as $crate::core::DirectoryResource>::RESOURCE_NAME_PLURAL),
            summary = format!("List {}", <$resource as $crate::core::DirectoryResource>::RESOURCE_NAME_PLURAL)
        )]
        pub async fn get_all_handler(
            state: axum::extract::State<$crate::state::AppState>,
            query: Result<axum_extra::extract::Query<$filter>, axum_extra::extract::QueryRejection>,
        ) -> Result<
            axum::Json<$crate::pagination::ListEnvelope<$resource>>,
            $crate::errors::ApiError,
        > {
            $crate::core::handlers::get_all::<$resource>(state, query).await
        }

        #[utoipa::path(
            get,
            path = "/{id}",
            params(("id" = String, Path, description = "Numeric record id")),
            responses(
                (status = axum::http::StatusCode::OK, description = "The record wrapped in `data`", body = $crate::pagination::DataEnvelope<$resource>),
                (status = axum::http::StatusCode::BAD_REQUEST, description = "Invalid id"),
                (status = axum::http::StatusCode::NOT_FOUND, description = "Record not found"),
                (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
            ),
            operation_id = format!("get_one_{}", <$resource as $crate::core::DirectoryResource>::RESOURCE_NAME_SINGULAR),
            summary = format!("Get one {}", <$resource as $crate::core::DirectoryResource>::RESOURCE_NAME_SINGULAR)
        )]
        pub async fn get_one_handler(
            state: axum::extract::State<$crate::state::AppState>,
            path: axum::extract::Path<String>,
        ) -> Result<
            axum::Json<$crate::pagination::DataEnvelope<$resource>>,
            $crate::errors::ApiError,
        > {
            $crate::core::handlers::get_one::<$resource>(state, path).await
        }

        #[utoipa::path(
            post,
            path = "/",
            request_body = $payload,
            responses(
                (status = axum::http::StatusCode::CREATED, description = "Created record wrapped in `data`", body = $crate::pagination::DataEnvelope<$resource>),
                (status = axum::http::StatusCode::BAD_REQUEST, description = "Invalid body"),
                (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
            ),
            operation_id = format!("create_one_{}", <$resource as $crate::core::DirectoryResource>::RESOURCE_NAME_SINGULAR),
            summary = format!("Create one {}", <$resource as $crate::core::DirectoryResource>::RESOURCE_NAME_SINGULAR)
        )]
        pub async fn create_one_handler(
            state: axum::extract::State<$crate::state::AppState>,
            body: Result<axum::Json<$payload>, axum::extract::rejection::JsonRejection>,
        ) -> Result<
            (
                axum::http::StatusCode,
                axum::Json<$crate::pagination::DataEnvelope<$resource>>,
            ),
            $crate::errors::ApiError,
        > {
            $crate::core::handlers::create_one::<$resource>(state, body).await
        }

        #[utoipa::path(
            put,
            path = "/{id}",
            params(("id" = String, Path, description = "Numeric record id")),
            request_body = $payload,
            responses(
                (status = axum::http::StatusCode::OK, description = "Updated record wrapped in `data`", body = $crate::pagination::DataEnvelope<$resource>),
                (status = axum::http::StatusCode::BAD_REQUEST, description = "Invalid id or body"),
                (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Storage failure, including a missing id")
            ),
            operation_id = format!("update_one_{}", <$resource as $crate::core::DirectoryResource>::RESOURCE_NAME_SINGULAR),
            summary = format!("Replace one {}", <$resource as $crate::core::DirectoryResource>::RESOURCE_NAME_SINGULAR)
        )]
        pub async fn update_one_handler(
            state: axum::extract::State<$crate::state::AppState>,
            path: axum::extract::Path<String>,
            body: Result<axum::Json<$payload>, axum::extract::rejection::JsonRejection>,
        ) -> Result<
            axum::Json<$crate::pagination::DataEnvelope<$resource>>,
            $crate::errors::ApiError,
        > {
            $crate::core::handlers::update_one::<$resource>(state, path, body).await
        }

        #[utoipa::path(
            delete,
            path = "/{id}",
            params(("id" = String, Path, description = "Numeric record id")),
            responses(
                (status = axum::http::StatusCode::OK, description = "Soft-deleted; also returned when nothing matched", body = $crate::pagination::MessageEnvelope),
                (status = axum::http::StatusCode::BAD_REQUEST, description = "Invalid id"),
                (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
            ),
            operation_id = format!("delete_one_{}", <$resource as $crate::core::DirectoryResource>::RESOURCE_NAME_SINGULAR),
            summary = format!("Delete one {}", <$resource as $crate::core::DirectoryResource>::RESOURCE_NAME_SINGULAR)
        )]
        pub async fn delete_one_handler(
            state: axum::extract::State<$crate::state::AppState>,
            path: axum::extract::Path<String>,
        ) -> Result<axum::Json<$crate::pagination::MessageEnvelope>, $crate::errors::ApiError> {
            $crate::core::handlers::delete_one::<$resource>(state, path).await
        }

        pub fn router() -> utoipa_axum::router::OpenApiRouter<$crate::state::AppState> {
            use utoipa_axum::{router::OpenApiRouter, routes};

            OpenApiRouter::new()
                .routes(routes!(get_all_handler))
                .routes(routes!(get_one_handler))
                .routes(routes!(create_one_handler))
                .routes(routes!(update_one_handler))
                .routes(routes!(delete_one_handler))
        }
    };
}
