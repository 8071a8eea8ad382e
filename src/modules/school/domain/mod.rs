pub mod entities;
pub mod repository;
pub mod value_objects;

pub use entities::{School, SchoolRating};
pub use repository::SchoolRepository;
pub use value_objects::SchoolType;
