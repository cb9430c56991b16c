use std::process::ExitCode;

use crate::market_data::{FetchError, PriceWarning};
use crate::persistence::{PersistError, PersistReport};

/// Something the pipeline wants an operator to know about.
#[derive(Debug)]
pub enum Diagnostic<'a> {
    FetchStarted { endpoint: &'a str },
    Fetched { endpoint: &'a str, ticks: usize },
    /// Prices that were stored as the not-a-number sentinel.
    SentinelPrices { warnings: &'a [PriceWarning] },
    FetchFailed { endpoint: &'a str, error: &'a FetchError },
    Persisted { report: &'a PersistReport },
    PersistFailed { error: &'a PersistError },
}

/// Receives pipeline diagnostics. Owned by the entry point so fetch and
/// persist code never writes to the console directly.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic<'_>);
}

/// How one run ended.
#[derive(Debug)]
pub enum PipelineOutcome {
    Persisted(PersistReport),
    FetchFailed(FetchError),
    PersistFailed(PersistError),
}

impl PipelineOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            PipelineOutcome::Persisted(_) => ExitCode::SUCCESS,
            PipelineOutcome::FetchFailed(_) => ExitCode::from(1),
            PipelineOutcome::PersistFailed(_) => ExitCode::from(2),
        }
    }
}
