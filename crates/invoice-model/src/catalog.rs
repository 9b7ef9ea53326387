//! Ordered, immutable schema of invoice fields.
//!
//! Catalog order matters: the suggester breaks ties in favour of the field
//! that appears first.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::field::{FieldCategory, FieldDescriptor};

/// The ordered set of fields a header may be mapped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDescriptor>", into = "Vec<FieldDescriptor>")]
pub struct FieldCatalog {
    fields: Vec<FieldDescriptor>,
}

impl FieldCatalog {
    /// Build a catalog, rejecting empty or duplicate ids.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for field in &fields {
            if field.id.trim().is_empty() {
                return Err(ModelError::EmptyFieldId);
            }
            if !seen.insert(field.id.as_str()) {
                return Err(ModelError::DuplicateFieldId(field.id.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// The built-in invoice schema.
    pub fn invoice() -> Self {
        use FieldCategory::{Customer, Invoice, Line, Payment, Supplier, Tax, Totals};

        let fields = vec![
            // Document
            FieldDescriptor::required("invoice_number", "Invoice Number", Invoice),
            FieldDescriptor::required("issue_date", "Issue Date", Invoice),
            FieldDescriptor::optional("due_date", "Due Date", Invoice),
            FieldDescriptor::optional("invoice_type_code", "Invoice Type Code", Invoice),
            FieldDescriptor::optional("document_currency_code", "Currency", Invoice),
            FieldDescriptor::optional("order_reference", "Order Reference", Invoice),
            FieldDescriptor::optional("note", "Note", Invoice),
            // Seller
            FieldDescriptor::required("accounting_supplier_party.name", "Seller Name", Supplier),
            FieldDescriptor::required("accounting_supplier_party.tin", "Seller TIN", Supplier),
            FieldDescriptor::optional(
                "accounting_supplier_party.address.street",
                "Seller Street",
                Supplier,
            ),
            FieldDescriptor::optional(
                "accounting_supplier_party.address.city",
                "Seller City",
                Supplier,
            ),
            FieldDescriptor::optional(
                "accounting_supplier_party.address.country",
                "Seller Country",
                Supplier,
            ),
            FieldDescriptor::optional("accounting_supplier_party.email", "Seller Email", Supplier),
            FieldDescriptor::optional("accounting_supplier_party.phone", "Seller Phone", Supplier),
            // Buyer
            FieldDescriptor::required("accounting_customer_party.name", "Buyer Name", Customer),
            FieldDescriptor::required("accounting_customer_party.tin", "Buyer TIN", Customer),
            FieldDescriptor::optional(
                "accounting_customer_party.address.street",
                "Buyer Street",
                Customer,
            ),
            FieldDescriptor::optional(
                "accounting_customer_party.address.city",
                "Buyer City",
                Customer,
            ),
            FieldDescriptor::optional(
                "accounting_customer_party.address.country",
                "Buyer Country",
                Customer,
            ),
            FieldDescriptor::optional("accounting_customer_party.email", "Buyer Email", Customer),
            FieldDescriptor::optional("accounting_customer_party.phone", "Buyer Phone", Customer),
            // Totals
            FieldDescriptor::optional(
                "legal_monetary_total.line_extension_amount",
                "Net Amount",
                Totals,
            ),
            FieldDescriptor::optional(
                "legal_monetary_total.tax_exclusive_amount",
                "Tax Exclusive Amount",
                Totals,
            ),
            FieldDescriptor::optional(
                "legal_monetary_total.tax_inclusive_amount",
                "Tax Inclusive Amount",
                Totals,
            ),
            FieldDescriptor::optional("legal_monetary_total.payable_amount", "Payable Amount", Totals),
            // Tax
            FieldDescriptor::optional("tax_total.tax_amount", "Tax Amount", Tax),
            FieldDescriptor::optional("tax_total.tax_category", "Tax Category", Tax),
            FieldDescriptor::optional("tax_total.tax_percent", "Tax Rate", Tax),
            // Payment
            FieldDescriptor::optional("payment_means.code", "Payment Method", Payment),
            FieldDescriptor::optional("payment_means.iban", "IBAN", Payment),
            FieldDescriptor::optional("payment_terms.note", "Payment Terms", Payment),
            // Lines
            FieldDescriptor::optional("invoice_line[].id", "Line Number", Line),
            FieldDescriptor::required("invoice_line[].item.name", "Item Name", Line),
            FieldDescriptor::optional("invoice_line[].item.description", "Item Description", Line),
            FieldDescriptor::required("invoice_line[].invoiced_quantity", "Invoiced Quantity", Line),
            FieldDescriptor::optional("invoice_line[].unit_code", "Unit of Measure", Line),
            FieldDescriptor::required("invoice_line[].price_amount", "Unit Price", Line),
            FieldDescriptor::optional(
                "invoice_line[].line_extension_amount",
                "Line Amount",
                Line,
            ),
            FieldDescriptor::optional("invoice_line[].tax_percent", "Line Tax Rate", Line),
        ];

        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by id.
    ///
    /// `None` means the id is not (or no longer) part of the schema; callers
    /// treat such mappings as orphaned.
    pub fn get(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// True when `id` exists and is required.
    pub fn is_required(&self, id: &str) -> bool {
        self.get(id).is_some_and(|f| f.required)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn required_count(&self) -> usize {
        self.required_fields().count()
    }

    pub fn in_category(&self, category: FieldCategory) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(move |f| f.category == category)
    }

    /// Categories present in the catalog, in first-appearance order.
    pub fn categories(&self) -> Vec<FieldCategory> {
        let mut out: Vec<FieldCategory> = Vec::new();
        for field in &self.fields {
            if !out.contains(&field.category) {
                out.push(field.category);
            }
        }
        out
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::invoice()
    }
}

impl TryFrom<Vec<FieldDescriptor>> for FieldCatalog {
    type Error = ModelError;

    fn try_from(fields: Vec<FieldDescriptor>) -> Result<Self> {
        Self::new(fields)
    }
}

impl From<FieldCatalog> for Vec<FieldDescriptor> {
    fn from(catalog: FieldCatalog) -> Self {
        catalog.fields
    }
}

impl<'a> IntoIterator for &'a FieldCatalog {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_catalog_ids_are_unique() {
        let catalog = FieldCatalog::invoice();
        let rebuilt = FieldCatalog::new(catalog.fields().to_vec());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn invoice_catalog_required_fields() {
        let catalog = FieldCatalog::invoice();
        let required: Vec<&str> = catalog.required_fields().map(|f| f.id.as_str()).collect();
        assert_eq!(
            required,
            vec![
                "invoice_number",
                "issue_date",
                "accounting_supplier_party.name",
                "accounting_supplier_party.tin",
                "accounting_customer_party.name",
                "accounting_customer_party.tin",
                "invoice_line[].item.name",
                "invoice_line[].invoiced_quantity",
                "invoice_line[].price_amount",
            ]
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = FieldCatalog::new(vec![
            FieldDescriptor::required("invoice_number", "Invoice Number", FieldCategory::Invoice),
            FieldDescriptor::optional("invoice_number", "Number", FieldCategory::Invoice),
        ])
        .unwrap_err();
        assert_eq!(err, ModelError::DuplicateFieldId("invoice_number".into()));
    }

    #[test]
    fn lookup_miss_is_none() {
        let catalog = FieldCatalog::invoice();
        assert!(catalog.get("accounting_supplier_party.tin").is_some());
        assert!(catalog.get("removed_field").is_none());
        assert!(!catalog.is_required("removed_field"));
    }

    #[test]
    fn categories_follow_catalog_order() {
        let catalog = FieldCatalog::invoice();
        assert_eq!(catalog.categories(), FieldCategory::ALL.to_vec());
    }
}
