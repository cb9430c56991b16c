pub mod prometheus;

pub use prometheus::{init_metrics, render_metrics};
