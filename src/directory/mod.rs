//! The four directory resources and the master lookups, mounted under
//! `/api/v1/directory`.

pub mod college;
pub mod corporate;
pub mod masters;
pub mod professional;
pub mod student;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use std::collections::HashMap;
use utoipa_axum::router::OpenApiRouter;

use crate::{core::DirectoryResource, entities::user, state::AppState};

pub use college::College;
pub use corporate::Corporate;
pub use professional::Professional;
pub use student::Student;

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/students", student::router())
        .nest("/corporates", corporate::router())
        .nest("/colleges", college::router())
        .nest("/professionals", professional::router())
        .nest("/masters", masters::router())
}

/// Users referenced by a batch of rows, keyed by id.
pub(crate) async fn users_by_id<I>(
    db: &DatabaseConnection,
    ids: I,
) -> Result<HashMap<i32, user::Model>, DbErr>
where
    I: IntoIterator<Item = i32>,
{
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

/// Re-read a row after a write through the resource's hydration profile.
pub(crate) async fn reload<R: DirectoryResource>(
    db: &DatabaseConnection,
    id: i32,
) -> Result<R, DbErr> {
    R::get_one(db, id).await?.ok_or_else(|| {
        DbErr::RecordNotFound(format!("{} {id}", R::RESOURCE_NAME_SINGULAR))
    })
}
