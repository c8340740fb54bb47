use domain::{NormalizedVehicle, Principal, VehicleStatus, roles};
use serde_json::json;

#[test]
fn status_parses_known_and_preserves_unknown() {
    assert_eq!(VehicleStatus::parse("On Charge"), VehicleStatus::OnCharge);
    assert_eq!(VehicleStatus::parse("  "), VehicleStatus::Off);
    assert_eq!(
        VehicleStatus::parse("Towing"),
        VehicleStatus::Other("Towing".to_string())
    );
    assert_eq!(VehicleStatus::NonCommunicating.as_str(), "Non-Communicating");
    assert!(VehicleStatus::OnCharge.is_charging());
}

#[test]
fn vehicle_serializes_dashboard_field_names() {
    let vehicle: NormalizedVehicle = serde_json::from_value(json!({
        "id": "123",
        "displayDeviceId": "OM-1",
        "status": null,
        "rawTor": { "HWID": "123" }
    }))
    .expect("vehicle");
    assert_eq!(vehicle.status, VehicleStatus::Off);
    assert_eq!(vehicle.metrics.time_to_charge, "00:00");

    let value = serde_json::to_value(&vehicle).expect("json");
    assert_eq!(value["displayDeviceId"], "OM-1");
    assert_eq!(value["status"], "Off");
    assert_eq!(value["rawTor"]["HWID"], "123");
    assert_eq!(value["metrics"]["vehicleModeRequest"], "NEUTRAL");
    assert!(value.get("sampleTimestamp").is_none());
}

#[test]
fn principal_visibility_by_role() {
    let admin = Principal::new("user-1", "admin", roles::ROLE_ADMIN);
    let mut customer = Principal::new("user-2", "c1", roles::ROLE_CUSTOMER);
    customer.customer_code = Some("CUST-9".to_string());
    let mut operator = Principal::new("user-3", "u1", roles::ROLE_USER);
    operator.assigned_vehicles = vec!["123".to_string()];

    let owned = json!({ "customerCode": "CUST-9" });
    let other = json!({ "customerCode": "CUST-1" });

    assert!(admin.is_admin());
    assert!(admin.can_view("999", &other));
    assert!(customer.can_view("123", &owned));
    assert!(!customer.can_view("123", &other));
    assert!(!customer.can_view("123", &json!({})));
    assert!(operator.can_view("123", &other));
    assert!(!operator.can_view("456", &owned));
    assert!(roles::is_known_role("Dealer"));
}
