//! Connection setup and schema bootstrap.

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};

use crate::{config::DatabaseConfig, entities};

/// Open the connection pool described by `config`.
///
/// # Errors
///
/// Returns the driver error when the database is unreachable.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout())
        .sqlx_logging(config.sql_logging);

    let db = Database::connect(options).await?;
    tracing::info!(backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}

async fn create_table<E, C>(db: &C, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(db.get_database_backend().build(&statement)).await?;
    tracing::debug!(table = entity.table_name(), "ensured table");
    Ok(())
}

/// Create every missing table, referenced tables first.
///
/// # Errors
///
/// Returns the first DDL failure.
pub async fn create_tables<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    use entities::{
        college, college_master, company_master, corporate, corporate_industry, corporate_sector,
        corporate_service, country, education, experience, industry, office, professional, sector,
        service, skill, state, student, student_skill, user,
    };

    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, user::Entity).await?;
    create_table(db, &schema, skill::Entity).await?;
    create_table(db, &schema, college_master::Entity).await?;
    create_table(db, &schema, company_master::Entity).await?;
    create_table(db, &schema, industry::Entity).await?;
    create_table(db, &schema, sector::Entity).await?;
    create_table(db, &schema, service::Entity).await?;
    create_table(db, &schema, country::Entity).await?;
    create_table(db, &schema, state::Entity).await?;

    create_table(db, &schema, student::Entity).await?;
    create_table(db, &schema, education::Entity).await?;
    create_table(db, &schema, experience::Entity).await?;
    create_table(db, &schema, student_skill::Entity).await?;

    create_table(db, &schema, corporate::Entity).await?;
    create_table(db, &schema, office::Entity).await?;
    create_table(db, &schema, corporate_industry::Entity).await?;
    create_table(db, &schema, corporate_sector::Entity).await?;
    create_table(db, &schema, corporate_service::Entity).await?;

    create_table(db, &schema, college::Entity).await?;
    create_table(db, &schema, professional::Entity).await?;

    tracing::info!("schema ready");
    Ok(())
}
