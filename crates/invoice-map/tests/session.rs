use std::time::{Duration, Instant};

use invoice_map::{
    AutoSaveConfig, FilterMode, MappingError, MappingSession, MappingStorage, MemoryStorage,
    PersistenceError, SaveError, SortMode,
};
use invoice_model::{FieldCatalog, FieldCategory, FieldDescriptor, HeaderMapping, MappingTarget};

const KEY: &str = "invoice-mapping-sent";

fn catalog() -> FieldCatalog {
    FieldCatalog::new(vec![
        FieldDescriptor::required("invoice_number", "Invoice Number", FieldCategory::Invoice),
        FieldDescriptor::required(
            "accounting_customer_party.tin",
            "Customer TIN",
            FieldCategory::Customer,
        ),
        FieldDescriptor::optional("note", "Note", FieldCategory::Invoice),
    ])
    .expect("valid catalog")
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

fn session(names: &[&str]) -> MappingSession {
    MappingSession::new(catalog(), headers(names), KEY)
}

/// Storage whose writes always fail.
struct BrokenStorage;

impl MappingStorage for BrokenStorage {
    fn load(&self, _key: &str) -> Result<Option<HeaderMapping>, PersistenceError> {
        Ok(None)
    }

    fn save(&self, _key: &str, _mapping: &HeaderMapping) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("quota exceeded".into()))
    }
}

#[test]
fn accept_all_suggestions_then_finalize() {
    let mut session = session(&["Invoice No", "Buyer TIN", "Qty"]);
    assert!(!session.can_finalize());

    let accepted = session.accept_all_suggestions();
    assert_eq!(accepted, headers(&["Invoice No", "Buyer TIN"]));
    assert!(session.is_dirty());

    let snapshot = session.progress();
    assert_eq!(snapshot.mapped, 2);
    assert_eq!(snapshot.unmapped, 1);
    assert_eq!(snapshot.progress_percent, 100);
    assert!(session.can_finalize());
    assert!(session.suggestions().is_empty());
}

#[test]
fn accept_all_does_not_give_one_field_to_two_headers() {
    let mut session = session(&["Invoice Number", "invoice-number"]);
    let accepted = session.accept_all_suggestions();
    assert_eq!(accepted, headers(&["Invoice Number"]));
    assert_eq!(
        session.mapping().field_for("Invoice Number"),
        Some("invoice_number")
    );
    assert!(session.mapping().get("invoice-number").is_none());
}

#[test]
fn accept_single_suggestion() {
    let mut session = session(&["Invoice No", "Qty"]);
    assert_eq!(
        session.accept_suggestion("Invoice No").unwrap(),
        "invoice_number"
    );
    assert_eq!(
        session.accept_suggestion("Qty"),
        Err(MappingError::NoSuggestion("Qty".into()))
    );
}

#[test]
fn finalize_lists_missing_required_fields() {
    let mut session = session(&["Invoice No", "Remarks"]);
    session.set_field("Invoice No", "invoice_number").unwrap();

    assert_eq!(
        session.finalize(),
        Err(MappingError::RequiredFieldsUnmapped(vec![
            "accounting_customer_party.tin".into()
        ]))
    );
    let missing: Vec<&str> = session
        .unmapped_required_fields()
        .iter()
        .map(|f| f.id.as_str())
        .collect();
    assert_eq!(missing, vec!["accounting_customer_party.tin"]);
}

#[test]
fn edits_validate_header_and_field() {
    let mut session = session(&["Invoice No"]);
    assert_eq!(
        session.set_field("Nope", "invoice_number"),
        Err(MappingError::HeaderNotFound("Nope".into()))
    );
    assert_eq!(
        session.set_field("Invoice No", "nope"),
        Err(MappingError::FieldNotFound("nope".into()))
    );
    assert!(!session.is_dirty());
}

#[test]
fn assign_and_reassign() {
    let mut session = session(&["Invoice No", "Doc Number"]);
    session.assign_field("Invoice No", "invoice_number").unwrap();

    let err = session
        .assign_field("Doc Number", "invoice_number")
        .unwrap_err();
    assert_eq!(err.header(), Some("Invoice No"));

    let cleared = session
        .reassign_field("Doc Number", "invoice_number")
        .unwrap();
    assert_eq!(cleared, headers(&["Invoice No"]));
    assert!(session.mapping().get("Invoice No").is_none());
}

#[test]
fn field_options_disable_claimed_fields() {
    let mut session = session(&["Invoice No", "Doc Number"]);
    session.set_field("Invoice No", "invoice_number").unwrap();

    let options = session.field_options("Doc Number");
    let invoice = options
        .iter()
        .find(|o| o.field.id == "invoice_number")
        .unwrap();
    assert!(invoice.disabled());
    assert_eq!(invoice.claimed_by, Some("Invoice No"));

    let own = session.field_options("Invoice No");
    let invoice = own.iter().find(|o| o.field.id == "invoice_number").unwrap();
    assert!(!invoice.disabled());
    assert!(invoice.selected);
}

#[test]
fn field_options_follow_category_and_search() {
    let mut session = session(&["Remarks"]);
    session.set_active_category(Some(FieldCategory::Invoice));
    let ids: Vec<&str> = session
        .field_options("Remarks")
        .iter()
        .map(|o| o.field.id.as_str())
        .collect();
    assert_eq!(ids, vec!["invoice_number", "note"]);

    session.set_field_search("Remarks", "NOT");
    let ids: Vec<&str> = session
        .field_options("Remarks")
        .iter()
        .map(|o| o.field.id.as_str())
        .collect();
    assert_eq!(ids, vec!["note"]);
}

#[test]
fn visible_headers_use_view_state() {
    let mut session = session(&["Remarks", "Invoice No", "Internal"]);
    session.set_field("Invoice No", "invoice_number").unwrap();
    session.skip("Internal").unwrap();

    session.set_filter(FilterMode::Unmapped);
    assert_eq!(session.visible_headers(), headers(&["Remarks", "Internal"]));

    session.set_filter(FilterMode::All);
    session.set_sort(SortMode::MappedFirst);
    assert_eq!(
        session.visible_headers(),
        headers(&["Invoice No", "Remarks", "Internal"])
    );

    session.set_sort(SortMode::Original);
    session.set_search("re");
    assert_eq!(session.visible_headers(), headers(&["Remarks"]));
}

#[test]
fn skipped_header_gets_no_suggestion() {
    let mut session = session(&["Invoice No"]);
    session.skip("Invoice No").unwrap();
    assert!(session.suggestions().is_empty());

    assert!(session.clear("Invoice No"));
    assert!(session.suggestions().contains_key("Invoice No"));
    assert!(!session.clear("Invoice No"));
}

#[test]
fn open_restores_saved_mapping_and_reports_orphans() {
    let storage = MemoryStorage::new();
    let mut saved = HeaderMapping::new();
    saved.insert("Invoice No", MappingTarget::field("invoice_number"));
    saved.insert("Legacy", MappingTarget::field("retired_field"));
    storage.save(KEY, &saved).unwrap();

    let session = MappingSession::open(
        catalog(),
        headers(&["Invoice No", "Legacy"]),
        &storage,
        KEY,
    );
    assert_eq!(session.mapping(), &saved);
    assert!(!session.is_dirty());
    assert_eq!(session.orphaned_headers(), vec!["Legacy"]);
    assert_eq!(session.progress().mapped, 1);
}

#[test]
fn orphaned_header_is_listed_as_unmapped() {
    let storage = MemoryStorage::new();
    let mut saved = HeaderMapping::new();
    saved.insert("Invoice No", MappingTarget::field("invoice_number"));
    saved.insert("Legacy", MappingTarget::field("retired_field"));
    storage.save(KEY, &saved).unwrap();

    let mut session = MappingSession::open(
        catalog(),
        headers(&["Invoice No", "Legacy", "Qty"]),
        &storage,
        KEY,
    );
    session.set_filter(FilterMode::Mapped);
    assert_eq!(session.visible_headers(), headers(&["Invoice No"]));
    assert_eq!(session.visible_headers().len(), session.progress().mapped);

    session.set_filter(FilterMode::Unmapped);
    assert_eq!(session.visible_headers(), headers(&["Legacy", "Qty"]));
    assert_eq!(session.visible_headers().len(), session.progress().unmapped);
}

#[test]
fn open_with_corrupt_storage_starts_empty() {
    let storage = MemoryStorage::new();
    storage.insert_raw(KEY, "[1, 2, 3");

    let session = MappingSession::open(catalog(), headers(&["Invoice No"]), &storage, KEY);
    assert!(session.mapping().is_empty());
}

#[test]
fn auto_save_waits_for_quiet_period() {
    let storage = MemoryStorage::new();
    let mut session = session(&["Invoice No"]).with_autosave(AutoSaveConfig {
        debounce_ms: 60_000,
        ..Default::default()
    });

    session.set_field("Invoice No", "invoice_number").unwrap();
    assert!(!session.poll_auto_save(&storage).unwrap());
    assert!(storage.raw(KEY).is_none());

    let later = Instant::now() + Duration::from_secs(61);
    assert!(session.poll_auto_save_at(&storage, later).unwrap());
    assert!(!session.is_dirty());
    assert_eq!(
        storage.load(KEY).unwrap().unwrap().field_for("Invoice No"),
        Some("invoice_number")
    );

    // Nothing new to save.
    assert!(!session.poll_auto_save_at(&storage, later).unwrap());
}

#[test]
fn auto_save_persists_incomplete_mapping() {
    let storage = MemoryStorage::new();
    let mut session = session(&["Invoice No", "Remarks"]).with_autosave(AutoSaveConfig {
        debounce_ms: 0,
        ..Default::default()
    });
    session.set_field("Remarks", "note").unwrap();

    assert!(!session.can_finalize());
    assert!(session.poll_auto_save(&storage).unwrap());
    assert!(storage.load(KEY).unwrap().is_some());
}

#[test]
fn disabled_auto_save_never_fires() {
    let storage = MemoryStorage::new();
    let mut session = session(&["Invoice No"]).with_autosave(AutoSaveConfig::disabled());
    session.set_field("Invoice No", "invoice_number").unwrap();
    let later = Instant::now() + Duration::from_secs(3600);
    assert!(!session.poll_auto_save_at(&storage, later).unwrap());
}

#[test]
fn explicit_save_is_gated_by_required_fields() {
    let storage = MemoryStorage::new();
    let mut session = session(&["Invoice No", "Buyer TIN"]);
    session.set_field("Invoice No", "invoice_number").unwrap();

    let err = session.save(&storage).unwrap_err();
    assert!(matches!(
        err,
        SaveError::Incomplete(MappingError::RequiredFieldsUnmapped(_))
    ));
    assert!(storage.raw(KEY).is_none());
    assert_eq!(
        session.mapping().field_for("Invoice No"),
        Some("invoice_number")
    );

    session
        .set_field("Buyer TIN", "accounting_customer_party.tin")
        .unwrap();
    let saved = session.save(&storage).unwrap();
    assert_eq!(saved.len(), 2);
    assert!(!session.is_dirty());
}

#[test]
fn failed_save_keeps_mapping_and_dirty_flag() {
    let mut session = session(&["Invoice No", "Buyer TIN"]);
    session.set_field("Invoice No", "invoice_number").unwrap();
    session
        .set_field("Buyer TIN", "accounting_customer_party.tin")
        .unwrap();

    let err = session.save(&BrokenStorage).unwrap_err();
    match err {
        SaveError::Storage(error) => assert!(error.user_message().contains("quota exceeded")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(session.is_dirty());
    assert_eq!(session.mapping().len(), 2);
}
