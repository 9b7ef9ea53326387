//! Tests for invoice-model types.

use invoice_model::{
    FieldCatalog, FieldCategory, FieldDescriptor, HeaderMapping, InvoiceDirection, MappingTarget,
    SKIP_SENTINEL,
};

#[test]
fn mapping_serializes_skip_as_sentinel() {
    let mut mapping = HeaderMapping::new();
    mapping.insert("Invoice No", MappingTarget::field("invoice_number"));
    mapping.insert("Comment", MappingTarget::Skip);

    let json = serde_json::to_string(&mapping).expect("serialize mapping");
    assert_eq!(
        json,
        format!(r#"{{"Comment":"{SKIP_SENTINEL}","Invoice No":"invoice_number"}}"#)
    );

    let round: HeaderMapping = serde_json::from_str(&json).expect("deserialize mapping");
    assert_eq!(round, mapping);
    assert!(round.is_skipped("Comment"));
}

#[test]
fn catalog_deserialization_rejects_duplicates() {
    let json = r#"[
        {"id": "invoice_number", "label": "Invoice Number", "required": true, "category": "invoice"},
        {"id": "invoice_number", "label": "Number", "required": false, "category": "invoice"}
    ]"#;
    let result: Result<FieldCatalog, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[test]
fn catalog_round_trips_through_json() {
    let catalog = FieldCatalog::new(vec![FieldDescriptor::required(
        "invoice_line[].item.name",
        "Item Name",
        FieldCategory::Line,
    )])
    .expect("valid catalog");

    let json = serde_json::to_string(&catalog).expect("serialize catalog");
    assert!(json.contains(r#""category":"line""#));
    let round: FieldCatalog = serde_json::from_str(&json).expect("deserialize catalog");
    assert_eq!(round, catalog);
}

#[test]
fn direction_parses_aliases() {
    assert_eq!(
        "incoming".parse::<InvoiceDirection>().unwrap(),
        InvoiceDirection::Received
    );
    assert_eq!("Sent".parse::<InvoiceDirection>().unwrap(), InvoiceDirection::Sent);
    assert!("sideways".parse::<InvoiceDirection>().is_err());
}
