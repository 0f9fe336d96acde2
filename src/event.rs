/// Events exchanged between entities.
///
/// An `Event` says what happens (`name`), to whom (`target`), with what
/// data (`arguments`) and after how long (`delay`). Events are immutable
/// once built; the timeline stores them as-is and hands each one out
/// exactly once.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Arguments ─────────────────────────────────────────────────────────

/// A single key/value record inside an event's arguments.
pub type Record = Map<String, Value>;

/// Ordered sequence of key/value records carried by an event.
///
/// The engine never looks inside; entities agree among themselves on
/// which keys they use.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Vec<Record>);

impl Arguments {
    /// No records.
    pub fn empty() -> Self {
        Arguments(Vec::new())
    }

    /// One record holding a single key.
    pub fn single(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut record = Record::new();
        record.insert(key.into(), value.into());
        Arguments(vec![record])
    }

    /// Append a record.
    pub fn push(&mut self, record: Record) {
        self.0.push(record);
    }

    /// First value stored under `key`, scanning records in order.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find_map(|record| record.get(key))
    }

    /// Like [`get`](Self::get) but only for string values.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn records(&self) -> &[Record] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Record>> for Arguments {
    fn from(records: Vec<Record>) -> Self {
        Arguments(records)
    }
}

/// Builds arguments from a JSON value: an object becomes one record, an
/// array of objects becomes one record per object, anything else is
/// stored under the `"value"` key.
impl From<Value> for Arguments {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(record) => Arguments(vec![record]),
            Value::Array(items) => Arguments(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(record) => record,
                        other => {
                            let mut record = Record::new();
                            record.insert("value".into(), other);
                            record
                        }
                    })
                    .collect(),
            ),
            Value::Null => Arguments::empty(),
            other => Arguments::single("value", other),
        }
    }
}

// ── Event ─────────────────────────────────────────────────────────────

/// A scheduled unit of work addressed to a named entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Name of the entity that scheduled this event, if any. External
    /// callers may schedule anonymously.
    pub issuer: Option<String>,

    /// Event tag; the receiving entity decides what it means.
    pub name: String,

    /// Registry name of the receiving entity.
    pub target: String,

    pub arguments: Arguments,

    /// Seconds after the moment of scheduling. Negative delays are
    /// accepted here and rejected by the timeline.
    pub delay: i64,
}

impl Event {
    pub fn new(
        issuer: Option<String>,
        name: impl Into<String>,
        target: impl Into<String>,
        arguments: Arguments,
        delay: i64,
    ) -> Self {
        Event {
            issuer,
            name: name.into(),
            target: target.into(),
            arguments,
            delay,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.issuer {
            Some(issuer) => write!(f, "{}({} → {}, +{}s)", self.name, issuer, self.target, self.delay),
            None => write!(f, "{}(→ {}, +{}s)", self.name, self.target, self.delay),
        }
    }
}
