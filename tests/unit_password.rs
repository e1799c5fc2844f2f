use cohortly::utils::password::{hash_password, verify_password};

#[test]
fn test_hash_is_not_the_plaintext() {
    let hash = hash_password("hunter2hunter2").unwrap();
    assert_ne!(hash, "hunter2hunter2");
    assert!(hash.starts_with("$2"));
}

#[test]
fn test_verify_accepts_correct_password() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(verify_password("correct horse battery staple", &hash).unwrap());
}

#[test]
fn test_verify_rejects_wrong_password() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(!verify_password("incorrect horse", &hash).unwrap());
}

#[test]
fn test_same_password_hashes_differently() {
    let a = hash_password("password123").unwrap();
    let b = hash_password("password123").unwrap();
    assert_ne!(a, b);
}
