pub mod places;
pub mod registry;

pub use places::PlacesStrategy;
pub use registry::RegistryStrategy;
