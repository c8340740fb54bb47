use fleet_auth::{hash_password, verify_password_and_maybe_upgrade};

#[test]
fn argon2_hash_verifies_without_upgrade() {
    let hash = hash_password("fleet-pass").expect("hash");
    assert!(hash.starts_with("$argon2"));

    let check = verify_password_and_maybe_upgrade(&hash, "fleet-pass").expect("check");
    assert!(check.verified);
    assert!(check.upgrade_hash.is_none());

    let check = verify_password_and_maybe_upgrade(&hash, "other").expect("check");
    assert!(!check.verified);
}

#[test]
fn plaintext_password_upgrades_when_it_matches() {
    let check = verify_password_and_maybe_upgrade("admin", "admin").expect("check");
    assert!(check.verified);
    assert!(check.upgrade_hash.as_deref().unwrap_or_default().starts_with("$argon2"));

    let check = verify_password_and_maybe_upgrade("admin", "Admin").expect("check");
    assert!(!check.verified);
    assert!(check.upgrade_hash.is_none());
}
