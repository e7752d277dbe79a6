//! Response normalization.
//!
//! List endpoints answer in several shapes. Each payload is classified once
//! into a [`ResponseShape`]; everything downstream sees only [`Page`].
//!
//! Recognized shapes, in priority order:
//!
//! | Shape       | Rows                      | Metadata                               |
//! |-------------|---------------------------|----------------------------------------|
//! | `Paginated` | `data` or `datas`         | `pagination` object                    |
//! | `Items`     | `items`                   | `totalPages`                           |
//! | `Counted`   | `data` or `datas`         | `totalCount`                           |
//! | `Bare`      | `data`, `datas`, `items`  | none (falls back to `X-Total-Count`)   |
//! | `Listing`   | top-level array           | none (falls back to `X-Total-Count`)   |

use crate::error::MalformedResponse;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

const ROW_KEYS: [&str; 2] = ["data", "datas"];
const TOTAL_PAGES_KEYS: [&str; 2] = ["totalPages", "total_pages"];
const TOTAL_COUNT_KEYS: [&str; 3] = ["totalCount", "total_count", "total"];

/// Canonical page of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total_pages: u32,
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total_pages: 0,
            total_count: Some(0),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Undecoded response body plus the transport metadata the normalizer uses.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub body: Value,
    /// Value of the `X-Total-Count` header, when the server sent one.
    pub total_count: Option<u64>,
}

impl RawResponse {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            total_count: None,
        }
    }

    pub fn with_total_count(mut self, total_count: u64) -> Self {
        self.total_count = Some(total_count);
        self
    }
}

/// A classified payload. Borrowed from the raw body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseShape<'a> {
    Paginated {
        rows: &'a [Value],
        pagination: &'a Map<String, Value>,
        total_count: Option<u64>,
    },
    Items {
        rows: &'a [Value],
        total_pages: u64,
        total_count: Option<u64>,
    },
    Counted {
        rows: &'a [Value],
        total_count: u64,
    },
    Bare {
        rows: &'a [Value],
    },
    Listing {
        rows: &'a [Value],
    },
}

impl<'a> ResponseShape<'a> {
    /// First shape whose required fields are present and non-null.
    pub fn detect(body: &'a Value) -> Option<Self> {
        let obj = match body {
            Value::Array(rows) => return Some(ResponseShape::Listing { rows }),
            Value::Object(obj) => obj,
            _ => return None,
        };

        let data = ROW_KEYS.iter().find_map(|k| array(obj, k));

        if let (Some(rows), Some(pagination)) = (data, obj.get("pagination").and_then(Value::as_object)) {
            return Some(ResponseShape::Paginated {
                rows,
                pagination,
                total_count: metadata(obj, &TOTAL_COUNT_KEYS),
            });
        }

        if let Some(rows) = array(obj, "items") {
            if let Some(total_pages) = metadata(obj, &TOTAL_PAGES_KEYS) {
                return Some(ResponseShape::Items {
                    rows,
                    total_pages,
                    total_count: metadata(obj, &TOTAL_COUNT_KEYS),
                });
            }
        }

        if let Some(rows) = data {
            if let Some(total_count) = metadata(obj, &TOTAL_COUNT_KEYS) {
                return Some(ResponseShape::Counted { rows, total_count });
            }
        }

        data.or_else(|| array(obj, "items"))
            .map(|rows| ResponseShape::Bare { rows })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResponseShape::Paginated { .. } => "paginated",
            ResponseShape::Items { .. } => "items",
            ResponseShape::Counted { .. } => "counted",
            ResponseShape::Bare { .. } => "bare",
            ResponseShape::Listing { .. } => "listing",
        }
    }

    pub fn rows(&self) -> &'a [Value] {
        match *self {
            ResponseShape::Paginated { rows, .. }
            | ResponseShape::Items { rows, .. }
            | ResponseShape::Counted { rows, .. }
            | ResponseShape::Bare { rows }
            | ResponseShape::Listing { rows } => rows,
        }
    }

    /// `(total_pages, total_count)` for this shape.
    fn totals(&self, page_size: u32, header_count: Option<u64>) -> (u32, Option<u64>) {
        match *self {
            ResponseShape::Paginated {
                pagination,
                total_count,
                ..
            } => {
                let count = metadata(pagination, &TOTAL_COUNT_KEYS)
                    .or(total_count)
                    .or(header_count);
                let pages = metadata(pagination, &TOTAL_PAGES_KEYS)
                    .map(saturate)
                    .or_else(|| count.map(|c| pages_for(c, page_size)))
                    .unwrap_or(1);
                (pages, count)
            }
            ResponseShape::Items {
                total_pages,
                total_count,
                ..
            } => (saturate(total_pages), total_count.or(header_count)),
            ResponseShape::Counted { total_count, .. } => {
                (pages_for(total_count, page_size), Some(total_count))
            }
            ResponseShape::Bare { .. } | ResponseShape::Listing { .. } => match header_count {
                Some(count) => (pages_for(count, page_size), Some(count)),
                None => (1, None),
            },
        }
    }
}

/// Map a raw payload onto a [`Page`].
///
/// Pure: the same `raw` and `page_size` always yield the same result.
pub fn normalize<T: DeserializeOwned>(
    raw: &RawResponse,
    page_size: u32,
) -> Result<Page<T>, MalformedResponse> {
    let shape = ResponseShape::detect(&raw.body).ok_or_else(|| {
        MalformedResponse::UnrecognizedShape {
            keys: describe_keys(&raw.body),
        }
    })?;

    let (total_pages, total_count) = shape.totals(page_size, raw.total_count);

    let mut rows = shape.rows();
    let limit = page_size as usize;
    if page_size > 0 && rows.len() > limit {
        tracing::warn!(
            shape = shape.name(),
            received = rows.len(),
            page_size,
            "response carried more rows than the page size, truncating"
        );
        rows = &rows[..limit];
    }

    let rows = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            T::deserialize(row).map_err(|e| MalformedResponse::RowDecode {
                index,
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<T>, _>>()?;

    tracing::trace!(shape = shape.name(), rows = rows.len(), total_pages, "response normalized");

    Ok(Page {
        rows,
        total_pages,
        total_count,
    })
}

/// `ceil(count / page_size)`; a zero page size is treated as a single page.
pub fn pages_for(count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    saturate(count.div_ceil(u64::from(page_size)))
}

fn saturate(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn array<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a [Value]> {
    obj.get(key).and_then(Value::as_array).map(Vec::as_slice)
}

/// Non-negative integer metadata, given as a number or a numeric string.
/// Fractional numbers round up so a partial page is still counted.
fn metadata(obj: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.ceil() as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

fn describe_keys(body: &Value) -> String {
    match body {
        Value::Object(obj) if obj.is_empty() => "none".to_string(),
        Value::Object(obj) => obj.keys().cloned().collect::<Vec<_>>().join(", "),
        Value::Null => "null body".to_string(),
        _ => "non-object body".to_string(),
    }
}
