pub mod jwks;
pub mod memory;
pub mod source;

pub use jwks::{JwksFetcher, JwksFetcherOptions};
pub use memory::StaticKeySource;
pub use source::{KeySource, KeySourceError};
