//! Declared column types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "TEXT")]
    Text,
}

impl DataType {
    /// Coerces raw statement text into a value of this type.
    ///
    /// INT values are parsed as base-10 integers, TEXT is taken as-is.
    pub fn parse_value(&self, raw: &str) -> Option<Value> {
        match self {
            DataType::Int => raw.trim().parse::<i64>().ok().map(Value::Int64),
            DataType::Text => Some(Value::String(raw.to_string())),
        }
    }
}

impl FromStr for DataType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => Ok(DataType::Int),
            "TEXT" => Ok(DataType::Text),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Int => write!(f, "INT"),
            DataType::Text => write!(f, "TEXT"),
        }
    }
}
