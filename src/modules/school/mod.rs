/// School catalog module
///
/// - Domain: catalog entities and the storage collaborator trait
/// - Infrastructure: in-memory storage
/// - Application: merge/upsert of scraped records
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{IngestionSummary, SchoolIngestionService};
pub use domain::{School, SchoolRating, SchoolRepository, SchoolType};
pub use infrastructure::InMemorySchoolRepository;
