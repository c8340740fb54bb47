use fleet_normalize::{format_iso_ms, parse_tor_timestamp};

const MAY_FIRST_MS: i64 = 1_714_521_600_000;

#[test]
fn parses_upstream_formats() {
    assert_eq!(parse_tor_timestamp("2024-05-01T00:00:00Z"), Some(MAY_FIRST_MS));
    assert_eq!(parse_tor_timestamp("2024-05-01T05:30:00+05:30"), Some(MAY_FIRST_MS));
    assert_eq!(parse_tor_timestamp("2024-05-01 00:00:00"), Some(MAY_FIRST_MS));
    assert_eq!(parse_tor_timestamp("2024-05-01T00:00:00.000"), Some(MAY_FIRST_MS));
    assert_eq!(parse_tor_timestamp("01-05-2024 00:00:00"), Some(MAY_FIRST_MS));
    assert_eq!(parse_tor_timestamp("01/05/2024 00:00:00"), Some(MAY_FIRST_MS));
    assert_eq!(parse_tor_timestamp("2024-05-01"), Some(MAY_FIRST_MS));
}

#[test]
fn rejects_garbage() {
    assert_eq!(parse_tor_timestamp(""), None);
    assert_eq!(parse_tor_timestamp("   "), None);
    assert_eq!(parse_tor_timestamp("yesterday"), None);
}

#[test]
fn formats_iso_with_millis() {
    assert_eq!(format_iso_ms(MAY_FIRST_MS), "2024-05-01T00:00:00.000Z");
    assert_eq!(format_iso_ms(MAY_FIRST_MS + 250), "2024-05-01T00:00:00.250Z");
}
