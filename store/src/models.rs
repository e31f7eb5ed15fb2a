use chrono::Utc;
use riziq_types::{Document, Fields};

use crate::Error;

/// Which kind of row a change refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Collection,
    Slot,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Collection => "collection",
            Scope::Slot => "slot",
        }
    }
}

/// One committed write, as recorded in the `changes` table.
#[derive(Debug, Clone)]
pub struct Change {
    pub ordinal: i64,
    pub scope: Scope,
    /// Collection name or slot key.
    pub key: String,
    /// Handle that made the write.
    pub context: String,
    /// Microseconds since the epoch.
    pub timestamp: i64,
}

impl Change {
    pub fn new(scope: Scope, key: String, context: String) -> Self {
        Self {
            ordinal: 0,
            scope,
            key,
            context,
            timestamp: Utc::now().timestamp_micros(),
        }
    }
}

/// A `documents` row before its fields are decoded.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub fields: String,
}

impl StoredDocument {
    pub fn decode(self) -> Result<Document, Error> {
        let fields: Fields = serde_json::from_str(&self.fields)?;
        Ok(Document::new(self.id, fields))
    }
}

impl From<(String, String)> for StoredDocument {
    fn from((id, fields): (String, String)) -> Self {
        Self { id, fields }
    }
}
