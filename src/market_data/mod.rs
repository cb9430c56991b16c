pub mod adapters;
pub mod error;
pub mod normalize;
pub mod traits;
pub mod types;

pub use error::FetchError;
pub use normalize::PricePolicy;
pub use traits::TickerSource;
pub use types::{PriceSnapshot, PriceWarning};
