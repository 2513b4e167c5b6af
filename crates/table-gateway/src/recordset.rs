//! In-memory collection of records indexed by primary key.
//!
//! A [`RecordSet`] holds records fetched from a table, keyed by their integer
//! id, and lets callers look them up, edit them locally and append new ones.
//! Appending goes through a [`RecordStore`] (normally the table's
//! [`TableDataGateway`]) so new records get a database-assigned id.
//!
//! ```rust,no_run
//! use table_gateway::{record, RecordSet, TableDataGateway};
//!
//! # fn demo(users: &TableDataGateway) -> table_gateway::Result<()> {
//! let mut set = RecordSet::new(users, users.find_all()?)?;
//! let id = set.add(record([("name", "bob")]))?;
//! assert!(set.has(id));
//! # Ok(())
//! # }
//! ```

use indexmap::IndexMap;

use crate::core::value::{Criteria, Record, Value};
use crate::error::{GatewayError, Result};
use crate::gateway::TableDataGateway;

/// Backing store a record set inserts through.
pub trait RecordStore {
    /// Name of the primary-key column.
    fn id_column(&self) -> &str;

    /// Persist `record` and return its new id.
    fn insert(&self, record: &Record) -> Result<i64>;
}

impl RecordStore for TableDataGateway {
    fn id_column(&self) -> &str {
        TableDataGateway::id_column(self)
    }

    fn insert(&self, record: &Record) -> Result<i64> {
        TableDataGateway::insert(self, record)
    }
}

/// Records keyed by primary key, in insertion order.
#[derive(Debug)]
pub struct RecordSet<'g, S: RecordStore + ?Sized = TableDataGateway> {
    store: &'g S,
    id_column: String,
    records: IndexMap<i64, Record>,
}

impl<'g, S: RecordStore + ?Sized> RecordSet<'g, S> {
    /// Index `records` by the store's id column.
    ///
    /// Every record must carry an integer id. A repeated id keeps its first
    /// position and the later record replaces the earlier one.
    pub fn new(store: &'g S, records: impl IntoIterator<Item = Record>) -> Result<Self> {
        let id_column = store.id_column().to_string();
        let mut indexed = IndexMap::new();

        for record in records {
            let id = record
                .get(&id_column)
                .and_then(Value::as_i64)
                .ok_or_else(|| {
                    GatewayError::RecordSet(format!(
                        "Record has no integer ID column \"{}\"",
                        id_column
                    ))
                })?;
            indexed.insert(id, record);
        }

        Ok(Self {
            store,
            id_column,
            records: indexed,
        })
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has(&self, id: i64) -> bool {
        self.records.contains_key(&id)
    }

    /// Ids in index order.
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.records.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &Record)> + '_ {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// Id of the first record whose columns equal every criterion.
    pub fn find(&self, criteria: &Criteria) -> Option<i64> {
        self.records
            .iter()
            .find(|(_, record)| {
                criteria
                    .iter()
                    .all(|(column, expected)| record.get(column) == Some(expected))
            })
            .map(|(id, _)| *id)
    }

    pub fn get(&self, id: i64) -> Result<&Record> {
        self.records.get(&id).ok_or_else(|| missing(id))
    }

    /// One column of a record. `Ok(None)` if the record lacks the column.
    pub fn get_column(&self, id: i64, column: &str) -> Result<Option<&Value>> {
        Ok(self.get(id)?.get(column))
    }

    /// Set one column of a record in memory. Nothing is written back.
    pub fn set(&mut self, id: i64, column: &str, value: impl Into<Value>) -> Result<()> {
        if column == self.id_column {
            return Err(GatewayError::RecordSet(format!(
                "Cannot change ID column \"{}\" of record ID {}",
                column, id
            )));
        }
        let record = self.records.get_mut(&id).ok_or_else(|| missing(id))?;
        record.insert(column.to_string(), value.into());
        Ok(())
    }

    /// Insert `record` through the store and add it under its new id.
    pub fn add(&mut self, mut record: Record) -> Result<i64> {
        let id = self.store.insert(&record)?;
        record.insert(self.id_column.clone(), Value::Integer(id));
        self.records.insert(id, record);
        Ok(id)
    }

    /// Records in index order.
    pub fn into_records(self) -> Vec<Record> {
        self.records.into_values().collect()
    }
}

fn missing(id: i64) -> GatewayError {
    GatewayError::RecordSet(format!("Record ID {} not in record set", id))
}
