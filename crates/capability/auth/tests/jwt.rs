use domain::Principal;
use fleet_auth::{AuthError, JwtManager};

#[test]
fn jwt_issue_and_decode() {
    let jwt = JwtManager::new("secret".to_string(), 3600);
    let mut principal = Principal::new("user-1", "acme", "Customer");
    principal.customer_code = Some("C-1".to_string());

    let tokens = jwt.issue_tokens(&principal).expect("tokens");
    let decoded = jwt.decode_access(&tokens.access_token).expect("access");

    assert_eq!(decoded, principal);
    assert!(tokens.expires_at > 0);
}

#[test]
fn jwt_wrong_secret_rejected() {
    let issuer = JwtManager::new("secret".to_string(), 3600);
    let other = JwtManager::new("other".to_string(), 3600);
    let tokens = issuer
        .issue_tokens(&Principal::new("user-1", "admin", "Admin"))
        .expect("tokens");

    let result = other.decode_access(&tokens.access_token);
    assert!(matches!(result, Err(AuthError::TokenInvalid)));
    assert!(matches!(
        issuer.decode_access("not-a-token"),
        Err(AuthError::TokenInvalid)
    ));
}
