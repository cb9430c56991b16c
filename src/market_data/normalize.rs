use serde_json::Value;

use crate::market_data::error::{FetchError, FetchResult};
use crate::market_data::types::{PriceSnapshot, PriceWarning, Tick};

/// What to do with a price field that does not coerce to a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PricePolicy {
    /// Keep the tick and store the not-a-number sentinel.
    #[default]
    Lenient,
    /// Reject the whole response.
    Strict,
}

/// A normalized snapshot plus the sentinel prices it carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedSnapshot {
    pub snapshot: PriceSnapshot,
    pub warnings: Vec<PriceWarning>,
}

/// Turns a decoded ticker response into a snapshot.
///
/// The body must be an array of objects. Order is preserved.
pub fn normalize_ticks(body: Value, policy: PricePolicy) -> FetchResult<FetchedSnapshot> {
    let Value::Array(entries) = body else {
        return Err(FetchError::NotAnArray);
    };

    let mut ticks = Vec::with_capacity(entries.len());
    let mut warnings = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let Value::Object(fields) = entry else {
            return Err(FetchError::NotAnObject { index });
        };

        let (tick, rejected) = Tick::normalize(fields);

        if policy == PricePolicy::Strict {
            if let Some(first) = rejected.into_iter().next() {
                return Err(FetchError::InvalidPrice {
                    index,
                    field: first.field,
                    raw: first.raw,
                });
            }
        } else {
            warnings.extend(
                rejected
                    .into_iter()
                    .map(|rejected| PriceWarning { index, rejected }),
            );
        }

        ticks.push(tick);
    }

    Ok(FetchedSnapshot {
        snapshot: PriceSnapshot::new(ticks),
        warnings,
    })
}
