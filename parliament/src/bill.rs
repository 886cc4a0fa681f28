//! Bill record.
//!
//! The bill is drafted and amended by other tooling; this crate only creates
//! the empty document at initialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillScope {
    pub in_scope: Vec<Value>,
    pub out_of_scope: Vec<Value>,
    pub assumptions: Vec<Value>,
    pub definitions: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillSections {
    pub problem: String,
    pub scope: BillScope,
    pub solution: String,
    pub implementation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub bill_id: Option<String>,
    pub title: Option<String>,
    pub version: u32,
    pub drafter: Value,
    pub sections: BillSections,
    pub amendments: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bill {
    /// Blank bill: no id, version 0, empty sections.
    pub fn empty() -> Self {
        Self::default()
    }
}
