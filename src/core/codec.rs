//! Flat hash codec for orders
//!
//! An order is stored as a single hash. Each top-level field becomes one hash
//! field whose value is a string; the [`ORDER_FIELDS`] table says how each
//! field is encoded. Nested documents are JSON strings, numbers and booleans
//! use their plain textual form, and null fields are not stored at all.
//!
//! Decoding is lenient per field: a value that cannot be decoded (malformed
//! JSON, a non-numeric number, an unknown enum value) is logged and read back
//! as null instead of failing the whole record. Only a record missing its
//! `orderNumber` or `orderStatus` fails as a whole.

use crate::core::error::{OrderResult, StorageError};
use crate::core::order::{ApprovalStatus, Order};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeSet, HashMap};

/// Storage encoding of a single order field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Stored verbatim
    Text,
    /// One of a fixed set of strings
    Choice(&'static [&'static str]),
    /// Integer (epoch millis)
    Timestamp,
    /// Floating point number
    Amount,
    /// `true` / `false`
    Flag,
    /// Arbitrary JSON document
    Json,
    /// JSON document, or plain text when the stored value is not JSON
    JsonOrText,
    /// JSON array of status changes
    History,
}

/// One row of the codec table
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire / hash field name
    pub name: &'static str,
    pub kind: FieldKind,
    /// Whether an update may change the field
    pub mutable: bool,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        mutable: true,
    }
}

/// Every field of [`Order`] and how it is stored
pub const ORDER_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "orderNumber",
        kind: FieldKind::Text,
        mutable: false,
    },
    field("orderStatus", FieldKind::Text),
    field("approvalStatus", FieldKind::Choice(ApprovalStatus::ALL)),
    field("statusChanges", FieldKind::History),
    field("orderDate", FieldKind::Timestamp),
    field("packedDate", FieldKind::Timestamp),
    field("shipDate", FieldKind::Timestamp),
    field("deliveryPrediction", FieldKind::Timestamp),
    field("readyToPrintDate", FieldKind::Timestamp),
    field("filesDueBy", FieldKind::Timestamp),
    field("orderApprovedDate", FieldKind::Timestamp),
    field("cutDate", FieldKind::Timestamp),
    field("lastModified", FieldKind::Timestamp),
    field("orderBatchedDate", FieldKind::Timestamp),
    field("printDate", FieldKind::Timestamp),
    field("total", FieldKind::Amount),
    field("subTotal", FieldKind::Amount),
    field("tax", FieldKind::Amount),
    field("timeSpent", FieldKind::Amount),
    field("shippingAddress", FieldKind::Json),
    field("lineItems", FieldKind::Json),
    field("orderFlag", FieldKind::Json),
    field("accountFlag", FieldKind::Json),
    field("discounts", FieldKind::Json),
    field("dealsOnOrder", FieldKind::Json),
    field("shippingService", FieldKind::Json),
    field("onTheWayPrediction", FieldKind::Json),
    field("shippingPrediction", FieldKind::Json),
    field("paymentInfo", FieldKind::JsonOrText),
    field("customerEmail", FieldKind::Text),
    field("trackingNumber", FieldKind::Text),
    field("shippedCarrier", FieldKind::Text),
    field("packedBy", FieldKind::Text),
    field("packedImage", FieldKind::Text),
    field("firstOrder", FieldKind::Flag),
    field("onBatch", FieldKind::Flag),
    field("fb_pixel_id", FieldKind::Text),
];

/// Legacy spellings accepted on input and on read, with the field they stand for
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("onTheWayPridiction", "onTheWayPrediction"),
    ("shippingPridiction", "shippingPrediction"),
];

/// Wire name for `name`, resolving legacy spellings
pub fn canonical_name(name: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Look up a field by its wire name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    ORDER_FIELDS.iter().find(|spec| spec.name == name)
}

/// Check that the codec table and the `Order` schema describe the same fields.
///
/// Called when the server is built; a mismatch means a field would be
/// silently dropped or stored with the wrong encoding.
pub fn verify_schema() -> Result<(), String> {
    let value = serde_json::to_value(Order::default()).map_err(|e| e.to_string())?;
    let schema: BTreeSet<&str> = value
        .as_object()
        .map(|obj| obj.keys().map(String::as_str).collect())
        .unwrap_or_default();
    let table: BTreeSet<&str> = ORDER_FIELDS.iter().map(|spec| spec.name).collect();

    if table.len() != ORDER_FIELDS.len() {
        return Err("codec table lists a field more than once".to_string());
    }

    let missing: Vec<_> = schema.difference(&table).collect();
    let extra: Vec<_> = table.difference(&schema).collect();
    if missing.is_empty() && extra.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "codec table out of sync with Order: missing {:?}, unknown {:?}",
            missing, extra
        ))
    }
}

/// Flat representation of an order, ready for the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedOrder {
    /// Non-null fields with their encoded values
    pub fields: Vec<(String, String)>,
    /// Fields that are null and must not remain in the hash
    pub absent: Vec<String>,
}

/// Encode an order into hash fields
pub fn encode_order(order: &Order) -> OrderResult<EncodedOrder> {
    let value = serde_json::to_value(order).map_err(|e| StorageError::Integrity {
        message: format!("cannot encode order '{}': {}", order.order_number, e),
    })?;
    let Value::Object(mut map) = value else {
        return Err(StorageError::Integrity {
            message: "order did not serialize to an object".to_string(),
        }
        .into());
    };

    let mut encoded = EncodedOrder::default();
    for spec in ORDER_FIELDS {
        match map.remove(spec.name) {
            None | Some(Value::Null) => encoded.absent.push(spec.name.to_string()),
            Some(value) => encoded
                .fields
                .push((spec.name.to_string(), encode_value(spec.kind, value))),
        }
    }
    Ok(encoded)
}

fn encode_value(kind: FieldKind, value: Value) -> String {
    match (kind, value) {
        (FieldKind::Text | FieldKind::Choice(_), Value::String(s)) => s,
        // documents, numbers and booleans all render as their JSON text
        (_, value) => value.to_string(),
    }
}

/// Decode hash fields into an order.
///
/// Returns `Ok(None)` for an empty hash, the store's not-found signal. A
/// non-empty hash without an `orderNumber` and `orderStatus` is corrupt.
pub fn decode_order(hash: HashMap<String, String>) -> OrderResult<Option<Order>> {
    if hash.is_empty() {
        return Ok(None);
    }

    // legacy spellings are read after the canonical ones and never replace them
    let (canonical, legacy): (Vec<_>, Vec<_>) = hash
        .into_iter()
        .partition(|(stored, _)| canonical_name(stored) == stored.as_str());

    let mut map = Map::new();
    for (stored, raw) in canonical.into_iter().chain(legacy) {
        let name = canonical_name(&stored).to_string();
        if map.contains_key(&name) {
            continue;
        }
        let Some(spec) = field_spec(&name) else {
            tracing::debug!(field = %stored, "ignoring field outside the order schema");
            continue;
        };
        match decode_value(spec.kind, &raw) {
            Ok(value) => {
                map.insert(name, value);
            }
            Err(reason) => {
                tracing::warn!(field = %stored, %reason, "could not decode stored field, reading it as null");
            }
        }
    }

    for required in ["orderNumber", "orderStatus"] {
        if map.get(required).and_then(Value::as_str).is_none_or(str::is_empty) {
            return Err(StorageError::Integrity {
                message: format!("stored order has no {}", required),
            }
            .into());
        }
    }

    let order: Order =
        serde_json::from_value(Value::Object(map)).map_err(|e| StorageError::Integrity {
            message: format!("stored order is not decodable: {}", e),
        })?;
    Ok(Some(order))
}

fn decode_value(kind: FieldKind, raw: &str) -> Result<Value, String> {
    match kind {
        FieldKind::Text => Ok(Value::String(raw.to_string())),
        FieldKind::Choice(allowed) => {
            if allowed.contains(&raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(format!("'{}' is not one of {:?}", raw, allowed))
            }
        }
        FieldKind::Timestamp => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| {
                // tolerate values written as floats, e.g. "1700000000000.0"
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| Value::from(f.trunc() as i64))
                    .ok_or_else(|| format!("'{}' is not a timestamp", raw))
            }),
        FieldKind::Amount => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("'{}' is not a number", raw)),
        FieldKind::Flag => match raw {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            other => Err(format!("'{}' is not a boolean", other)),
        },
        FieldKind::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
        FieldKind::JsonOrText => {
            Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
        }
        FieldKind::History => decode_history(raw),
    }
}

/// Status history is a JSON array of `{date, status}` objects. Older writers
/// stored each entry as a JSON string inside the array, so both shapes are
/// accepted, as is a whole array that was encoded twice.
fn decode_history(raw: &str) -> Result<Value, String> {
    let mut parsed: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if let Value::String(inner) = &parsed {
        parsed = serde_json::from_str(inner).map_err(|e| e.to_string())?;
    }
    let Value::Array(entries) = parsed else {
        return Err("status history is not an array".to_string());
    };

    entries
        .into_iter()
        .map(|entry| {
            let entry = match entry {
                Value::String(s) => serde_json::from_str(&s).map_err(|e| e.to_string())?,
                other => other,
            };
            match &entry {
                Value::Object(obj)
                    if obj.get("date").is_some_and(Value::is_i64)
                        && obj.get("status").is_some_and(Value::is_string) =>
                {
                    Ok(entry)
                }
                _ => Err(format!("malformed status history entry: {}", entry)),
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}
