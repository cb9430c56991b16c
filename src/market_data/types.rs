use serde::Serialize;
use serde_json::{Map, Value};

pub const MIN_PRICE_FIELD: &str = "minPrice";
pub const MAX_PRICE_FIELD: &str = "maxPrice";

/// Price fields coerced from decimal strings to numbers, in write order.
pub const PRICE_FIELDS: [&str; 2] = [MIN_PRICE_FIELD, MAX_PRICE_FIELD];

/// Largest integer an f64 holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// One priced instrument entry from the upstream feed.
///
/// Kept as an ordered JSON object so every field other than the two
/// prices passes through untouched and in upstream order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Tick(Map<String, Value>);

impl Tick {
    /// Builds a tick from raw upstream fields, replacing `minPrice` and
    /// `maxPrice` with their coerced values.
    ///
    /// Returns the tick together with every price field that could not be
    /// coerced. Those fields hold `null`, the not-a-number sentinel.
    pub fn normalize(mut fields: Map<String, Value>) -> (Self, Vec<RejectedPrice>) {
        let mut rejected = Vec::new();

        for field in PRICE_FIELDS {
            let raw = fields.get(field);
            let coerced = coerce_price(raw);
            if coerced.is_none() {
                rejected.push(RejectedPrice {
                    field,
                    raw: raw.cloned(),
                });
            }
            // Existing keys keep their position; a missing key is appended.
            fields.insert(field.to_string(), price_value(coerced));
        }

        (Tick(fields), rejected)
    }
}

#[cfg(test)]
impl Tick {
    pub fn min_price(&self) -> Option<f64> {
        self.price(MIN_PRICE_FIELD)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.price(MAX_PRICE_FIELD)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn price(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }
}

/// Envelope for every tick returned by one fetch, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub data: Vec<Tick>,
}

impl PriceSnapshot {
    pub fn new(data: Vec<Tick>) -> Self {
        Self { data }
    }
}

/// A price field that was replaced by the not-a-number sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedPrice {
    pub field: &'static str,
    /// Upstream value, `None` when the field was absent.
    pub raw: Option<Value>,
}

/// A rejected price located in the upstream array.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceWarning {
    pub index: usize,
    pub rejected: RejectedPrice,
}

/// Coerces an upstream price value to a finite number.
///
/// Blank strings and `null` are zero, booleans are 0/1, and strings must
/// be plain decimal literals. Hex strings and arrays are not prices.
/// `None` is the not-a-number sentinel.
pub fn coerce_price(raw: Option<&Value>) -> Option<f64> {
    let value = match raw? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_decimal(s)?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => return None,
    };

    value.is_finite().then_some(value)
}

fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    // f64::from_str also takes "inf" and "NaN" spellings; a price never does.
    let decimal_only = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if !decimal_only {
        return None;
    }

    s.parse().ok()
}

fn price_value(price: Option<f64>) -> Value {
    match price {
        Some(p) if p.fract() == 0.0 && p.abs() <= MAX_SAFE_INTEGER => Value::from(p as i64),
        Some(p) => Value::from(p),
        None => Value::Null,
    }
}
