use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Whether an invoice was issued by us or received from a supplier.
///
/// Sent and received invoices are uploaded through separate flows, so each
/// direction keeps its own saved header mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceDirection {
    #[default]
    Sent,
    Received,
}

impl InvoiceDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceDirection::Sent => "sent",
            InvoiceDirection::Received => "received",
        }
    }
}

impl fmt::Display for InvoiceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceDirection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sent" | "outgoing" => Ok(InvoiceDirection::Sent),
            "received" | "incoming" => Ok(InvoiceDirection::Received),
            _ => Err(ModelError::UnknownDirection(s.to_string())),
        }
    }
}
