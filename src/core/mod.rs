pub mod handlers;
pub mod records;
pub mod resource;

pub use resource::{DirectoryResource, fetch_page};
