//! Event capture for market sessions.
//!
//! A `tracing` subscriber that files every info-level event under its target
//! (`trade`, `trade_rejected`, `round`, `game`) as one row of named fields.
//! Tests read the rows back directly or as polars DataFrames.
//!
//! # Usage
//!
//! ```ignore
//! // In session code:
//! tracing::info!(target: "trade", trade_id, round, price);
//!
//! // In test:
//! let log = instrument::capture(|| { /* drive a session */ });
//! let prices = log.table("trade").unwrap().i64s("price");
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use polars::prelude::*;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

// === VALUES ===

/// One recorded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U64(u64),
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl FieldValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::U64(v) => Some(*v),
            FieldValue::I64(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::I64(v) => Some(*v),
            FieldValue::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

pub type Row = BTreeMap<String, FieldValue>;

// === TABLES ===

/// All events recorded under one target, in emission order.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    pub rows: Vec<Row>,
}

impl EventTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of `field` down the table; `None` where a row lacks it.
    pub fn column(&self, field: &str) -> Vec<Option<&FieldValue>> {
        self.rows.iter().map(|row| row.get(field)).collect()
    }

    /// Integer values of `field`, skipping rows without one.
    pub fn i64s(&self, field: &str) -> Vec<i64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(field)?.as_i64())
            .collect()
    }

    pub fn u64s(&self, field: &str) -> Vec<u64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(field)?.as_u64())
            .collect()
    }

    pub fn strs(&self, field: &str) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.get(field)?.as_str())
            .collect()
    }

    /// Rows whose `field` is the string `value`.
    pub fn filter_str<'a>(&'a self, field: &'a str, value: &'a str) -> impl Iterator<Item = &'a Row> {
        self.rows
            .iter()
            .filter(move |row| row.get(field).and_then(FieldValue::as_str) == Some(value))
    }

    fn field_names(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect()
    }

    /// Convert to a DataFrame. A column takes the type of its first value;
    /// missing or mismatched cells become nulls.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::new();

        for name in self.field_names() {
            let cells = self.column(name);
            let first = cells.iter().flatten().next();
            let column = match first {
                Some(FieldValue::U64(_)) => Column::new(
                    name.into(),
                    cells.iter().map(|c| c.and_then(FieldValue::as_u64)).collect::<Vec<_>>(),
                ),
                Some(FieldValue::I64(_)) => Column::new(
                    name.into(),
                    cells.iter().map(|c| c.and_then(FieldValue::as_i64)).collect::<Vec<_>>(),
                ),
                Some(FieldValue::F64(_)) => Column::new(
                    name.into(),
                    cells
                        .iter()
                        .map(|c| match c {
                            Some(FieldValue::F64(v)) => Some(*v),
                            _ => None,
                        })
                        .collect::<Vec<_>>(),
                ),
                Some(FieldValue::Bool(_)) => Column::new(
                    name.into(),
                    cells.iter().map(|c| c.and_then(FieldValue::as_bool)).collect::<Vec<_>>(),
                ),
                _ => Column::new(
                    name.into(),
                    cells
                        .iter()
                        .map(|c| c.and_then(FieldValue::as_str).map(str::to_string))
                        .collect::<Vec<_>>(),
                ),
            };
            columns.push(column);
        }

        DataFrame::new(columns)
    }
}

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub tables: HashMap<String, EventTable>,
}

impl EventLog {
    pub fn table(&self, target: &str) -> Option<&EventTable> {
        self.tables.get(target)
    }

    /// Number of events recorded under `target` (zero if none).
    pub fn count(&self, target: &str) -> usize {
        self.table(target).map_or(0, EventTable::len)
    }

    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

thread_local! {
    static LOG: RefCell<EventLog> = RefCell::default();
}

// === SUBSCRIBER ===

struct RowVisitor<'a> {
    row: &'a mut Row,
}

impl RowVisitor<'_> {
    fn put(&mut self, field: &Field, value: FieldValue) {
        self.row.insert(field.name().to_string(), value);
    }
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, FieldValue::U64(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, FieldValue::I64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, FieldValue::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, FieldValue::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, FieldValue::Str(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `%value` fields arrive here already formatted with Display
        self.put(field, FieldValue::Str(format!("{value:?}")));
    }
}

/// Subscriber that appends each info-or-higher event to the thread-local log.
/// Spans are ignored.
pub struct SessionEventSubscriber;

impl Subscriber for SessionEventSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut row = Row::new();
        event.record(&mut RowVisitor { row: &mut row });

        let target = event.metadata().target().to_string();
        LOG.with(|log| {
            log.borrow_mut()
                .tables
                .entry(target)
                .or_default()
                .rows
                .push(row);
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install the subscriber as the global default. Later calls are no-ops.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(SessionEventSubscriber);
}

/// Take everything recorded on this thread so far.
pub fn drain() -> EventLog {
    LOG.with(|log| std::mem::take(&mut *log.borrow_mut()))
}

pub fn clear() {
    LOG.with(|log| *log.borrow_mut() = EventLog::default());
}

/// Run `f` with the subscriber scoped to this thread and return what it emitted.
pub fn capture(f: impl FnOnce()) -> EventLog {
    clear();
    tracing::subscriber::with_default(SessionEventSubscriber, f);
    drain()
}
