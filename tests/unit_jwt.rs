mod common;

use cohortly::modules::users::model::Role;
use cohortly::utils::jwt::{
    create_access_token, create_reset_token, verify_reset_token, verify_token,
};

use common::test_jwt_config;

#[test]
fn test_access_token_round_trip() {
    let config = test_jwt_config();

    let token = create_access_token(Some(42), Role::Teacher, &config).unwrap();
    let claims = verify_token(&token, &config).unwrap();

    assert_eq!(claims.sub, Some(42));
    assert_eq!(claims.role, "teacher");
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_superadmin_token_has_no_subject() {
    let config = test_jwt_config();

    let token = create_access_token(None, Role::Superadmin, &config).unwrap();
    let claims = verify_token(&token, &config).unwrap();

    assert_eq!(claims.sub, None);
    assert_eq!(claims.role, "superadmin");
}

#[test]
fn test_token_rejected_with_wrong_secret() {
    let config = test_jwt_config();
    let mut other = test_jwt_config();
    other.secret = "a-different-secret".to_string();

    let token = create_access_token(Some(1), Role::Student, &config).unwrap();
    assert!(verify_token(&token, &other).is_err());
}

#[test]
fn test_garbage_token_rejected() {
    let config = test_jwt_config();
    assert!(verify_token("not-a-jwt", &config).is_err());
    assert!(verify_token("", &config).is_err());
}

#[test]
fn test_expired_token_rejected() {
    let mut config = test_jwt_config();
    config.access_token_expiry = -7200; // already expired when minted

    let token = create_access_token(Some(1), Role::Student, &config).unwrap();
    assert!(verify_token(&token, &config).is_err());
}

#[test]
fn test_reset_token_round_trip() {
    let config = test_jwt_config();

    let token = create_reset_token(7, &config).unwrap();
    let claims = verify_reset_token(&token, &config).unwrap();

    assert_eq!(claims.sub, 7);
}

#[test]
fn test_reset_token_is_not_an_access_token() {
    let config = test_jwt_config();

    // reset tokens carry no role claim, so the access-token path rejects them
    let token = create_reset_token(7, &config).unwrap();
    assert!(verify_token(&token, &config).is_err());
}
