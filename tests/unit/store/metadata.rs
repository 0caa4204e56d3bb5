use super::*;
use crate::compose::settings::{ArrowColor, AspectRatio};

fn shared() -> SharedRecords {
    Rc::new(RefCell::new(RecordStore::in_memory()))
}

#[test]
fn missing_record_reads_as_defaults() {
    let store = MetadataStore::new(shared());
    let rec = store.load();
    assert!(!rec.before.has_stored_content);
    assert_eq!(rec.after.viewport(), Viewport::default());
}

#[test]
fn record_uses_camel_case_wire_names() {
    let records = shared();
    let store = MetadataStore::new(Rc::clone(&records));
    let mut rec = MetadataRecord::default();
    rec.after = SlotRecord::from_viewport(true, &Viewport::new(10.0, 90.0, 2.0));
    store.save(&rec);

    let raw = records.borrow().get(METADATA_KEY).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["after"]["hasStoredContent"], true);
    assert_eq!(v["after"]["xPos"], 10.0);
    assert_eq!(v["before"]["zoom"], 1.0);
    assert_eq!(store.load(), rec);
}

#[test]
fn legacy_slot_names_and_bad_values_are_tolerated() {
    let records = shared();
    records.borrow_mut().set(
        METADATA_KEY,
        r#"{"then":{"hasStoredContent":true,"xPos":150,"zoom":0.2},"now":{}}"#.to_string(),
    );
    let rec = MetadataStore::new(records).load();
    assert!(rec.before.has_stored_content);
    assert_eq!(rec.before.viewport(), Viewport::new(100.0, 50.0, 1.0));
    assert!(!rec.after.has_stored_content);
}

#[test]
fn corrupt_json_reads_as_defaults() {
    let records = shared();
    records.borrow_mut().set(METADATA_KEY, "{not json".to_string());
    records.borrow_mut().set(SETTINGS_KEY, "42".to_string());
    assert_eq!(MetadataStore::new(Rc::clone(&records)).load(), MetadataRecord::default());
    assert_eq!(SettingsStore::new(records).load(), Settings::default());
}

#[test]
fn settings_are_stored_under_their_own_key() {
    let records = shared();
    let settings = SettingsStore::new(Rc::clone(&records));
    let mut s = Settings::default();
    s.aspect_ratio = AspectRatio::Portrait9x16;
    s.arrow_color = ArrowColor::Red;
    settings.save(&s);
    assert_eq!(settings.load(), s);
    assert!(records.borrow().get(METADATA_KEY).is_none());
}
