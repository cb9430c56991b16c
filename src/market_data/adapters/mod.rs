pub mod gmx;

pub use gmx::{GmxNetwork, GmxTickerClient};
