//! Sea-ORM entities for the directory schema.
//!
//! Primary tables carry a soft-delete timestamp; master tables are plain
//! `id` + `name` lookups referenced by foreign key. Association tables use a
//! composite primary key.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod college;
pub mod college_master;
pub mod company_master;
pub mod corporate;
pub mod corporate_industry;
pub mod corporate_sector;
pub mod corporate_service;
pub mod country;
pub mod education;
pub mod experience;
pub mod industry;
pub mod office;
pub mod professional;
pub mod sector;
pub mod service;
pub mod skill;
pub mod state;
pub mod student;
pub mod student_skill;
pub mod user;

/// A list of strings persisted as a JSON array column.
///
/// Used for the value-set columns (college departments, professional skills
/// and industries) that superset filters run against.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
pub struct StringList(pub Vec<String>);

impl From<Vec<String>> for StringList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}
