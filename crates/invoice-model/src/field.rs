use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Section of the invoice a field belongs to.
///
/// Categories group the catalog in selection surfaces; they carry no
/// matching semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    /// Document-level identifiers and dates.
    Invoice,
    /// Seller party (`accounting_supplier_party.*`).
    Supplier,
    /// Buyer party (`accounting_customer_party.*`).
    Customer,
    /// Monetary totals of the whole document.
    Totals,
    /// Tax breakdown.
    Tax,
    /// Payment means and terms.
    Payment,
    /// Per-line fields (`invoice_line[].*`).
    Line,
}

impl FieldCategory {
    pub const ALL: [FieldCategory; 7] = [
        FieldCategory::Invoice,
        FieldCategory::Supplier,
        FieldCategory::Customer,
        FieldCategory::Totals,
        FieldCategory::Tax,
        FieldCategory::Payment,
        FieldCategory::Line,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCategory::Invoice => "invoice",
            FieldCategory::Supplier => "supplier",
            FieldCategory::Customer => "customer",
            FieldCategory::Totals => "totals",
            FieldCategory::Tax => "tax",
            FieldCategory::Payment => "payment",
            FieldCategory::Line => "line",
        }
    }

    /// Human-readable section title.
    pub fn title(&self) -> &'static str {
        match self {
            FieldCategory::Invoice => "Invoice",
            FieldCategory::Supplier => "Supplier",
            FieldCategory::Customer => "Customer",
            FieldCategory::Totals => "Totals",
            FieldCategory::Tax => "Tax",
            FieldCategory::Payment => "Payment",
            FieldCategory::Line => "Invoice Lines",
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldCategory {
    type Err = ModelError;

    /// Case-insensitive; accepts either the identifier or the title.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        FieldCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized || c.title().to_lowercase() == normalized)
            .ok_or_else(|| ModelError::UnknownCategory(s.to_string()))
    }
}

/// One target field of the invoice schema.
///
/// `id` is a dotted path into the invoice record (`accounting_supplier_party.tin`)
/// or an array-element path (`invoice_line[].item.name`). Identity is the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub label: String,
    pub required: bool,
    pub category: FieldCategory,
}

impl FieldDescriptor {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        required: bool,
        category: FieldCategory,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            required,
            category,
        }
    }

    /// Shorthand for a required field.
    pub fn required(id: impl Into<String>, label: impl Into<String>, category: FieldCategory) -> Self {
        Self::new(id, label, true, category)
    }

    /// Shorthand for an optional field.
    pub fn optional(id: impl Into<String>, label: impl Into<String>, category: FieldCategory) -> Self {
        Self::new(id, label, false, category)
    }

    /// True when the id addresses an element of a repeated group (`foo[].bar`).
    pub fn is_repeated(&self) -> bool {
        self.id.contains("[]")
    }

    /// Path segments of the id with array markers stripped.
    pub fn path_segments(&self) -> Vec<&str> {
        self.id
            .split('.')
            .map(|segment| segment.trim_end_matches("[]"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_identifier_and_title() {
        assert_eq!("line".parse::<FieldCategory>().unwrap(), FieldCategory::Line);
        assert_eq!(
            "Invoice-Lines".parse::<FieldCategory>().unwrap(),
            FieldCategory::Line
        );
        assert_eq!(
            " SUPPLIER ".parse::<FieldCategory>().unwrap(),
            FieldCategory::Supplier
        );
        assert!("shipping".parse::<FieldCategory>().is_err());
    }

    #[test]
    fn path_segments_strip_array_markers() {
        let field = FieldDescriptor::required(
            "invoice_line[].item.name",
            "Item Name",
            FieldCategory::Line,
        );
        assert!(field.is_repeated());
        assert_eq!(field.path_segments(), vec!["invoice_line", "item", "name"]);
    }
}
