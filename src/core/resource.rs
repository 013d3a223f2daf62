use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    sea_query::{Alias, Expr, Query},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    filtering::{Field, FilterPlan, Predicate},
    pagination::{ListEnvelope, Paginated},
};

/// A directory entry exposed under `/api/v1/directory/{plural}`.
///
/// `Self` is the hydrated view returned to clients: the root row plus the
/// associations loaded by [`hydrate`](DirectoryResource::hydrate). List and
/// get-by-id share that one hydration profile.
#[async_trait]
pub trait DirectoryResource: Sized + Serialize + Send + Sync + 'static {
    type EntityType: EntityTrait + Sync;
    type Filter: Paginated + DeserializeOwned + Send + Sync;
    type Payload: DeserializeOwned + Send;

    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    /// Root primary key column.
    const ID: Field;

    /// Soft-delete timestamp column.
    const DELETED_AT: Field;

    /// Plan matching every live (not soft-deleted) row.
    fn base_plan() -> FilterPlan {
        FilterPlan::new(Self::ID).with(Predicate::is_null(Self::DELETED_AT))
    }

    /// Translate a bound filter into a plan. Pure; never touches the database.
    fn filter_plan(filter: &Self::Filter) -> FilterPlan;

    /// Load the associations for a batch of root rows, keeping their order.
    async fn hydrate(
        db: &DatabaseConnection,
        models: Vec<<Self::EntityType as EntityTrait>::Model>,
    ) -> Result<Vec<Self>, DbErr>;

    async fn create(db: &DatabaseConnection, payload: Self::Payload) -> Result<Self, DbErr>;

    /// Full replace of the row `id`. A missing row is a storage error
    /// (`DbErr::RecordNotUpdated`), not a 404.
    async fn update(db: &DatabaseConnection, id: i32, payload: Self::Payload)
    -> Result<Self, DbErr>;

    async fn total_count(db: &DatabaseConnection, plan: &FilterPlan) -> Result<u64, DbErr> {
        plan.count(db).await
    }

    async fn get_all(
        db: &DatabaseConnection,
        plan: &FilterPlan,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let models = plan
            .fetch(db, Self::EntityType::find(), offset, limit)
            .await?;
        Self::hydrate(db, models).await
    }

    async fn get_one(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        let plan = Self::base_plan().with(Predicate::equals(Self::ID, Some(id)));
        let models = plan.fetch(db, Self::EntityType::find(), 0, 1).await?;
        Ok(Self::hydrate(db, models).await?.into_iter().next())
    }

    /// Stamp the soft-delete column. Returns the number of rows affected,
    /// zero when the row is missing or already deleted.
    async fn delete(db: &DatabaseConnection, id: i32) -> Result<u64, DbErr> {
        let statement = Query::update()
            .table(Alias::new(Self::ID.table))
            .value(Alias::new(Self::DELETED_AT.column), Utc::now())
            .and_where(Expr::col(Alias::new(Self::ID.column)).eq(id))
            .and_where(Expr::col(Alias::new(Self::DELETED_AT.column)).is_null())
            .to_owned();
        let backend = db.get_database_backend();
        let result = db.execute(backend.build(&statement)).await?;
        tracing::debug!(
            resource = Self::RESOURCE_NAME_SINGULAR,
            id,
            rows = result.rows_affected(),
            "soft delete"
        );
        Ok(result.rows_affected())
    }
}

/// Count then fetch one page through the same plan.
///
/// # Errors
///
/// Either statement failing aborts the whole request.
pub async fn fetch_page<R>(
    db: &DatabaseConnection,
    filter: &R::Filter,
    max_page_size: u64,
) -> Result<ListEnvelope<R>, DbErr>
where
    R: DirectoryResource,
{
    let request = filter.page_request(max_page_size);
    let plan = R::filter_plan(filter);
    let total = R::total_count(db, &plan).await?;
    let data = R::get_all(db, &plan, request.offset(), request.limit()).await?;
    Ok(ListEnvelope::new(data, request, total))
}
