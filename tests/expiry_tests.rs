/// Expiry encoding tests
///
/// Run with: cargo test --test expiry_tests

use chrono::{TimeZone, Utc};
use couchodm::{
    DocumentMetadata, EntityMetadata, Expiry, ExpiryUnit, MappingError, PropertySource,
    TTL_IN_SECONDS_INCLUSIVE_END,
};

#[test]
fn test_thirty_days_is_still_relative() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let meta = EntityMetadata::new("Boundary").expire_after(TTL_IN_SECONDS_INCLUSIVE_END);

    assert_eq!(meta.expiry_at(now).unwrap(), Expiry::Relative(2_592_000));
}

#[test]
fn test_one_second_past_thirty_days_is_absolute() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let meta = EntityMetadata::new("Past").expire_after(2_592_001);

    let expected = (now.timestamp() + 2_592_001) as u32;
    assert_eq!(meta.expiry_at(now).unwrap(), Expiry::Absolute(expected));
}

#[test]
fn test_days_unit() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let thirty = EntityMetadata::new("Month")
        .expire_after(30)
        .expiry_unit(ExpiryUnit::Days);
    assert_eq!(thirty.expiry_at(now).unwrap(), Expiry::Relative(2_592_000));

    let ninety = EntityMetadata::new("Quarter")
        .expire_after(90)
        .expiry_unit(ExpiryUnit::Days);
    let expected = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap().timestamp() as u32;
    assert_eq!(ninety.expiry_at(now).unwrap(), Expiry::Absolute(expected));
}

#[test]
fn test_expression_is_evaluated_on_every_lookup() {
    let properties = PropertySource::new().with_property("session.ttl", "2592000");
    let meta = EntityMetadata::new("Session")
        .expiry_expression("${session.ttl}")
        .property_source(properties.clone());
    assert_eq!(meta.expiry().unwrap(), Expiry::Relative(2_592_000));

    properties.set("session.ttl", "2592001");
    assert!(matches!(meta.expiry().unwrap(), Expiry::Absolute(_)));

    properties.set("session.ttl", "soon");
    assert_eq!(
        meta.expiry().unwrap_err(),
        MappingError::InvalidExpiryExpression("soon".into())
    );
}

#[test]
fn test_touch_on_read_needs_positive_expiry() {
    let flagged = EntityMetadata::new("Flagged").touch_on_read(true);
    assert!(!flagged.is_touch_on_read().unwrap());

    let effective = EntityMetadata::new("Effective")
        .expire_after(5)
        .expiry_unit(ExpiryUnit::Minutes)
        .touch_on_read(true);
    assert!(effective.is_touch_on_read().unwrap());
}
