use pet_common::{AccessoryKind, MaterialSlot, Rgb};
use pet_protocol::{PetRecord, RecordError, ShortId, ShortIdRegistry, sample_records};

const STORED_PET: &str = r##"{
    "id": "-NxQ42abc",
    "shortId": "GF123",
    "name": "Gizmo",
    "description": "Curious little hound.",
    "colors": { "coat": "#d5b6fb", "eye": "#eb7a88", "snout": null },
    "accessories": [
        { "type": "wizhat", "scale": 0.8, "ass1": "#008EFF", "ass2": "#ffff00" },
        { "type": "partyhat" }
    ],
    "level": 3,
    "xp": 0.42,
    "createdAt": 1700000000000
}"##;

#[test]
fn stored_pet_parses_with_camel_case_fields() {
    let record = PetRecord::from_json(STORED_PET).unwrap();
    assert_eq!(record.short_id, Some(ShortId::parse("GF123").unwrap()));
    assert_eq!(record.level, 3);
    assert_eq!(record.created_at.unwrap().timestamp_millis(), 1_700_000_000_000);

    let overrides = record.color_overrides();
    assert_eq!(
        overrides.get(MaterialSlot::Coat),
        Some(Rgb::new(0xd5, 0xb6, 0xfb))
    );
    assert_eq!(overrides.get(MaterialSlot::Snout), None);
}

#[test]
fn only_first_accessory_is_active() {
    let record = PetRecord::from_json(STORED_PET).unwrap();
    let request = record.accessory_request();
    assert_eq!(request.kind, Some(AccessoryKind::WizardHat));
    assert!((request.size - 0.8).abs() < 1e-6);
    assert_eq!(request.primary, Some(Rgb::new(0x00, 0x8e, 0xff)));
    assert_eq!(request.secondary, Some(Rgb::new(0xff, 0xff, 0x00)));
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let record = PetRecord::from_json(r#"{ "id": "x1" }"#).unwrap();
    assert_eq!(record.level, 1);
    assert_eq!(record.xp_fraction(), 0.0);
    assert!(record.color_overrides().is_empty());
    assert_eq!(record.accessory_request().kind, None);
    assert!(record.created_at.is_none());
}

#[test]
fn missing_scale_uses_fallback_size() {
    let record = PetRecord::from_json(
        r#"{ "id": "x2", "accessories": [ { "type": "spinhat" } ] }"#,
    )
    .unwrap();
    let request = record.accessory_request();
    assert_eq!(request.kind, Some(AccessoryKind::SpinnerHat));
    assert_eq!(request.size, 1.0);
    assert_eq!(request.primary, None);
}

#[test]
fn strict_ingestion_rejects_bad_values() {
    let bad_color = r##"{ "id": "x3", "colors": { "coat": "#zzzzzz" } }"##;
    assert!(matches!(
        PetRecord::from_json(bad_color),
        Err(RecordError::InvalidColor { field: "coat", .. })
    ));

    let bad_hat = r#"{ "id": "x4", "accessories": [ { "type": "crown" } ] }"#;
    assert!(matches!(
        PetRecord::from_json(bad_hat),
        Err(RecordError::UnknownAccessory(id)) if id == "crown"
    ));

    assert!(matches!(
        PetRecord::from_json(r#"{ "id": " " }"#),
        Err(RecordError::MissingId)
    ));
    assert!(matches!(
        PetRecord::from_json("not json"),
        Err(RecordError::Parse(_))
    ));
}

#[test]
fn lenient_paths_degrade_instead_of_failing() {
    let record: PetRecord = serde_json::from_str(
        r##"{ "id": "x5", "colors": { "eye": "blue" }, "accessories": [ { "type": "crown", "ass1": "#123" } ] }"##,
    )
    .unwrap();
    assert!(record.color_overrides().is_empty());
    let request = record.accessory_request();
    assert_eq!(request.kind, None);
    assert_eq!(request.primary, Some(Rgb::new(0x11, 0x22, 0x33)));
}

#[test]
fn xp_fraction_is_clamped() {
    let mut record = PetRecord::new("x6", "Rex");
    record.xp = 1.7;
    assert_eq!(record.xp_fraction(), 1.0);
    record.xp = -0.2;
    assert_eq!(record.xp_fraction(), 0.0);
    record.xp = f32::NAN;
    assert_eq!(record.xp_fraction(), 0.0);
}

#[test]
fn set_accessory_round_trips_through_json() {
    let mut record = PetRecord::new("x7", "Pip");
    let mut request = pet_common::AccessoryRequest::wearing(AccessoryKind::PartyHat);
    request.size = 1.05;
    record.set_accessory(&request);

    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains(r#""type":"partyhat""#));
    let back = PetRecord::from_json(&json).unwrap();
    assert_eq!(back.accessory_request(), request);
}

#[test]
fn sample_pets_are_valid_and_level_gated() {
    let samples = sample_records();
    assert_eq!(samples.len(), 2);
    for record in &samples {
        record.validate().unwrap();
    }
    assert_eq!(samples[0].name, "Gizmo");
    assert_eq!(samples[0].unlocked_accessories().len(), 3);
    assert_eq!(samples[0].thumbnail_key(), "pet-thumb-GF123");

    let mut young = samples[1].clone();
    young.level = 1;
    assert_eq!(young.unlocked_accessories(), vec![AccessoryKind::PartyHat]);
}

#[test]
fn record_lists_act_as_short_id_registry() {
    let records = PetRecord::list_from_json(&format!("[{STORED_PET}]")).unwrap();
    assert!(records[..].is_taken(&ShortId::parse("GF123").unwrap()));
    assert!(!records[..].is_taken(&ShortId::parse("GF124").unwrap()));
}

#[test]
fn malformed_short_id_is_dropped_not_fatal() {
    let json = r#"[
        { "id": "a", "shortId": "IO12", "name": "Odd" },
        { "id": "b", "shortId": "AB777", "name": "Bolt" }
    ]"#;
    let records = PetRecord::list_from_json(json).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].short_id, None);
    assert_eq!(records[1].short_id, Some(ShortId::parse("AB777").unwrap()));
}

#[test]
fn zero_accessory_scale_means_default_size() {
    let record = PetRecord::from_json(
        r#"{ "id": "a", "accessories": [{ "type": "partyhat", "scale": 0 }] }"#,
    )
    .unwrap();
    assert_eq!(record.accessory_request().size, 1.0);
}
