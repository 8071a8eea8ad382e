pub mod adapters;
pub mod http_client;

pub use adapters::{PlacesStrategy, RegistryStrategy};
pub use http_client::{FetchClient, FetchRequest};
