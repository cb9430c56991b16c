use tracing::{error, info, warn};

use super::traits::{Diagnostic, DiagnosticSink};
use crate::market_data::error::display_raw;

/// Forwards diagnostics to `tracing`.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic<'_>) {
        match diagnostic {
            Diagnostic::FetchStarted { endpoint } => {
                info!(%endpoint, "fetching price tickers");
            }
            Diagnostic::Fetched { endpoint, ticks } => {
                info!(%endpoint, ticks, "price tickers fetched");
            }
            Diagnostic::SentinelPrices { warnings } => {
                for w in warnings {
                    warn!(
                        index = w.index,
                        field = w.rejected.field,
                        raw = %display_raw(&w.rejected.raw),
                        "non-numeric price stored as null"
                    );
                }
            }
            Diagnostic::FetchFailed { endpoint, error } => {
                error!(%endpoint, %error, "error occurred while fetching price tickers");
            }
            Diagnostic::Persisted { report } => {
                info!(
                    path = %report.path.display(),
                    bytes = report.bytes,
                    "price data successfully saved to disk"
                );
            }
            Diagnostic::PersistFailed { error } => {
                error!(%error, "error occurred while saving price data");
            }
        }
    }
}
