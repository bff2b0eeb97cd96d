//! Document model and query evaluation shared by the backend and the client.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Stored fields of a document, keyed by field name.
pub type Fields = Map<String, Value>;

// --- Records ---

/// A document as seen by readers.
///
/// The backend id is merged under `id` next to the stored fields when the
/// record is serialized, so `{"id": "abc", "title": "..."}` round-trips into
/// `Record { id: "abc", fields: {"title": ...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Build a record. A stored field named `id` is shadowed by the backend id.
    pub fn new(id: impl Into<String>, mut fields: Fields) -> Self {
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_str())
    }

    pub fn timestamp_field(&self, field: &str) -> Option<Timestamp> {
        self.fields.get(field).and_then(Timestamp::from_value)
    }
}

// --- Timestamps ---

/// Backend clock value, stored as `{"seconds": .., "nanoseconds": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanoseconds: dt.timestamp_subsec_nanos(),
        }
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanoseconds).single()
    }

    /// The smallest timestamp strictly after `self`.
    pub fn next_after(self) -> Self {
        if self.nanoseconds + 1 >= 1_000_000_000 {
            Self {
                seconds: self.seconds + 1,
                nanoseconds: 0,
            }
        } else {
            Self {
                seconds: self.seconds,
                nanoseconds: self.nanoseconds + 1,
            }
        }
    }

    pub fn to_value(self) -> Value {
        json!({ "seconds": self.seconds, "nanoseconds": self.nanoseconds })
    }

    /// Read a timestamp map back. Any object with integral `seconds` and
    /// `nanoseconds` keys (and nothing else) qualifies.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        if obj.len() != 2 {
            return None;
        }
        let seconds = obj.get("seconds")?.as_i64()?;
        let nanoseconds = u32::try_from(obj.get("nanoseconds")?.as_u64()?).ok()?;
        Some(Self {
            seconds,
            nanoseconds,
        })
    }
}

// --- References & queries ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// `collection/id`, used in logs.
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "array-contains")]
    ArrayContains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// A document lacking the field never matches, whatever the operator.
    pub fn matches(&self, fields: &Fields) -> bool {
        let Some(actual) = fields.get(&self.field) else {
            return false;
        };

        match self.op {
            FilterOp::Eq => values_equal(actual, &self.value),
            FilterOp::Ne => !values_equal(actual, &self.value),
            FilterOp::Lt => same_kind(actual, &self.value) && compare_values(actual, &self.value).is_lt(),
            FilterOp::Le => same_kind(actual, &self.value) && compare_values(actual, &self.value).is_le(),
            FilterOp::Gt => same_kind(actual, &self.value) && compare_values(actual, &self.value).is_gt(),
            FilterOp::Ge => same_kind(actual, &self.value) && compare_values(actual, &self.value).is_ge(),
            FilterOp::In => self
                .value
                .as_array()
                .is_some_and(|candidates| candidates.iter().any(|c| values_equal(actual, c))),
            FilterOp::ArrayContains => actual
                .as_array()
                .is_some_and(|items| items.iter().any(|item| values_equal(item, &self.value))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Immutable description of the records a consumer wants to observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub collection: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl QueryDescriptor {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document would appear in this query's results, ignoring the limit.
    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters.iter().all(|f| f.matches(fields))
            && self.order_by.iter().all(|o| fields.contains_key(&o.field))
    }

    /// Run the query over a collection's documents.
    ///
    /// Results follow the requested ordering with the document id as the final
    /// tie-break, then the limit is applied.
    pub fn evaluate<'a, I>(&self, documents: I) -> Vec<Record>
    where
        I: IntoIterator<Item = (&'a String, &'a Fields)>,
    {
        let mut records: Vec<Record> = documents
            .into_iter()
            .filter(|(_, fields)| self.matches(fields))
            .map(|(id, fields)| Record::new(id.clone(), fields.clone()))
            .collect();

        records.sort_by(|a, b| self.compare(a, b));

        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
        records
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for order in &self.order_by {
            let (Some(left), Some(right)) = (a.get(&order.field), b.get(&order.field)) else {
                continue;
            };
            let ordering = match order.direction {
                Direction::Asc => compare_values(left, right),
                Direction::Desc => compare_values(right, left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.id.cmp(&b.id)
    }
}

// --- Value ordering ---

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::Object(_) if Timestamp::from_value(value).is_some() => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    kind_rank(a) == kind_rank(b)
}

fn values_equal(a: &Value, b: &Value) -> bool {
    same_kind(a, b) && compare_values(a, b) == Ordering::Equal
}

/// Total order over stored values: null < bool < number < timestamp < string
/// < array < map. Values of the same kind compare naturally.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let rank = kind_rank(a).cmp(&kind_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(i), Some(j)) => i.cmp(&j),
                _ => {
                    let x = x.as_f64().unwrap_or(f64::NAN);
                    let y = y.as_f64().unwrap_or(f64::NAN);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
            }
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (left, right) in x.iter().zip(y.iter()) {
                let ordering = compare_values(left, right);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(_), Value::Object(_)) => {
            if let (Some(x), Some(y)) = (Timestamp::from_value(a), Timestamp::from_value(b)) {
                return x.cmp(&y);
            }
            let (x, y) = (a.as_object(), b.as_object());
            match (x, y) {
                (Some(x), Some(y)) => {
                    for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                        let ordering = lk.cmp(rk).then_with(|| compare_values(lv, rv));
                        if ordering != Ordering::Equal {
                            return ordering;
                        }
                    }
                    x.len().cmp(&y.len())
                }
                _ => Ordering::Equal,
            }
        }
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    fn posts() -> Vec<(String, Fields)> {
        vec![
            (
                "p1".to_string(),
                fields(json!({
                    "title": "Concours national",
                    "association": "",
                    "createdAt": { "seconds": 300, "nanoseconds": 0 }
                })),
            ),
            (
                "p2".to_string(),
                fields(json!({
                    "title": "Sortie de l'amicale",
                    "association": "amicale",
                    "createdAt": { "seconds": 500, "nanoseconds": 0 }
                })),
            ),
            (
                "p3".to_string(),
                fields(json!({
                    "title": "Journée portes ouvertes",
                    "association": "",
                    "createdAt": { "seconds": 100, "nanoseconds": 0 }
                })),
            ),
            (
                "p4".to_string(),
                fields(json!({ "title": "Brouillon sans date", "association": "" })),
            ),
        ]
    }

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn record_serializes_id_next_to_fields() {
        let record = Record::new("abc", fields(json!({ "id": "stale", "name": "LTDK" })));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({ "id": "abc", "name": "LTDK" }));

        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn query_filters_orders_and_limits() {
        let docs = posts();
        let query = QueryDescriptor::new("posts")
            .where_eq("association", "")
            .order_by("createdAt", Direction::Desc)
            .limit(3);

        let records = query.evaluate(docs.iter().map(|(id, f)| (id, f)));
        // p4 has no createdAt and is excluded by the ordering
        assert_eq!(ids(&records), vec!["p1", "p3"]);
    }

    #[test]
    fn query_without_ordering_sorts_by_id() {
        let docs = posts();
        let records = QueryDescriptor::new("posts").evaluate(docs.iter().map(|(id, f)| (id, f)));
        assert_eq!(ids(&records), vec!["p1", "p2", "p3", "p4"]);
    }

    #[test]
    fn comparison_operators_only_match_same_kind() {
        let doc = fields(json!({ "order": 2, "tags": ["bac", "td"], "series": "F3" }));

        assert!(Filter { field: "order".into(), op: FilterOp::Ge, value: json!(2) }.matches(&doc));
        assert!(Filter { field: "order".into(), op: FilterOp::Lt, value: json!(2.5) }.matches(&doc));
        assert!(!Filter { field: "order".into(), op: FilterOp::Lt, value: json!("3") }.matches(&doc));
        assert!(Filter { field: "tags".into(), op: FilterOp::ArrayContains, value: json!("td") }.matches(&doc));
        assert!(Filter { field: "series".into(), op: FilterOp::In, value: json!(["F2", "F3"]) }.matches(&doc));
        assert!(!Filter { field: "missing".into(), op: FilterOp::Ne, value: json!(1) }.matches(&doc));
    }

    #[test]
    fn timestamps_order_before_strings() {
        let ts = Timestamp { seconds: 10, nanoseconds: 5 }.to_value();
        assert_eq!(compare_values(&ts, &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!(1), &ts), Ordering::Less);
        assert_eq!(Timestamp::from_value(&ts), Some(Timestamp { seconds: 10, nanoseconds: 5 }));
    }

    #[test]
    fn next_after_rolls_over_seconds() {
        let ts = Timestamp { seconds: 7, nanoseconds: 999_999_999 };
        assert_eq!(ts.next_after(), Timestamp { seconds: 8, nanoseconds: 0 });
        assert!(ts.next_after() > ts);
    }

    #[test]
    fn descriptor_wire_format_uses_operator_symbols() {
        let query = QueryDescriptor::new("schoolOfficials")
            .where_eq("type", "administration")
            .order_by("order", Direction::Asc);
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            json!({
                "collection": "schoolOfficials",
                "filters": [{ "field": "type", "op": "==", "value": "administration" }],
                "orderBy": [{ "field": "order", "direction": "asc" }]
            })
        );
    }
}
