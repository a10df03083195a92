//! 密码哈希功能测试
//!
//! 测试 Argon2id 密码哈希、验证与密码强度策略

use myflix_api::auth::PasswordHasher;
use myflix_api::config::SecurityConfig;
use myflix_api::error::AppError;
use secrecy::Secret;

/// 创建测试安全配置
fn create_policy() -> SecurityConfig {
    SecurityConfig {
        jwt_secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
        password_min_length: 8,
        password_require_uppercase: true,
        password_require_lowercase: true,
        password_require_digit: true,
        password_require_special: true,
        allowed_origins: vec![],
    }
}

#[test]
fn test_password_hash_is_phc_argon2id() {
    let hasher = PasswordHasher::new();

    let hash = hasher.hash("TestPassword123!").expect("Hashing should succeed");

    assert!(hash.starts_with("$argon2id$v=19$"));
    assert!(hasher.verify("TestPassword123!", &hash));
}

#[test]
fn test_password_hash_empty_string() {
    let hasher = PasswordHasher::new();

    let hash = hasher.hash("").expect("Empty password should hash");

    assert!(hasher.verify("", &hash));
    assert!(!hasher.verify("password", &hash));
}

#[test]
fn test_password_hash_unicode() {
    let hasher = PasswordHasher::new();
    let password = "密码测试Test123!🔒";

    let hash = hasher.hash(password).expect("Unicode password should hash");

    assert!(hasher.verify(password, &hash));
    // 稍有不同的 Unicode 密码应该失败
    assert!(!hasher.verify("密码测试Test123🔒", &hash));
}

#[test]
fn test_password_hash_long_password() {
    let hasher = PasswordHasher::new();
    let password = "a".repeat(500) + "B1!";

    let hash = hasher.hash(&password).expect("Long password should hash");

    assert!(hasher.verify(&password, &hash));
}

#[test]
fn test_verify_against_garbage_hash() {
    let hasher = PasswordHasher::new();

    assert!(!hasher.verify("TestPassword123!", ""));
    assert!(!hasher.verify("TestPassword123!", "$2b$10$notanargonhash"));
}

#[test]
fn test_password_policy_valid() {
    let policy = create_policy();

    assert!(PasswordHasher::validate_password_policy("Test123!", &policy).is_ok());
    assert!(PasswordHasher::validate_password_policy("MySecureP@ssw0rd", &policy).is_ok());
}

#[test]
fn test_password_policy_rejections() {
    let policy = create_policy();

    for weak in ["Te1!", "test123!", "TEST123!", "TestTest!", "Test1234"] {
        let result = PasswordHasher::validate_password_policy(weak, &policy);
        assert!(
            matches!(result, Err(AppError::Validation(_))),
            "{} should be rejected",
            weak
        );
    }
}

#[test]
fn test_password_policy_is_configurable() {
    let mut policy = create_policy();
    policy.password_require_special = false;
    policy.password_min_length = 6;

    assert!(PasswordHasher::validate_password_policy("Test12", &policy).is_ok());
}

#[test]
fn test_policy_rejection_names_configured_length() {
    let mut policy = create_policy();
    policy.password_min_length = 10;

    match PasswordHasher::validate_password_policy("Test123!", &policy) {
        Err(AppError::Validation(message)) => {
            assert!(message.contains("minimum of 10 characters"), "{}", message)
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}
