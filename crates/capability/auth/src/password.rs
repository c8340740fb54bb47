//! 口令哈希：新口令一律 argon2；兼容历史明文口令并在登录成功后升级。

use crate::AuthError;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand_core::OsRng;
use subtle::ConstantTimeEq;

const ARGON2_PREFIX: &str = "$argon2";

/// 口令校验结果；`upgrade_hash` 为需要回写的新哈希。
pub struct PasswordCheck {
    pub verified: bool,
    pub upgrade_hash: Option<String>,
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Internal(err.to_string()))
}

/// 校验口令；存量明文口令（未以 `$argon2` 开头）常量时间比较，通过后生成升级哈希。
pub fn verify_password_and_maybe_upgrade(
    stored: &str,
    password: &str,
) -> Result<PasswordCheck, AuthError> {
    if stored.starts_with(ARGON2_PREFIX) {
        let parsed =
            PasswordHash::new(stored).map_err(|err| AuthError::Internal(err.to_string()))?;
        let verified = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        return Ok(PasswordCheck {
            verified,
            upgrade_hash: None,
        });
    }

    let verified: bool = stored.as_bytes().ct_eq(password.as_bytes()).into();
    let upgrade_hash = if verified {
        Some(hash_password(password)?)
    } else {
        None
    };
    Ok(PasswordCheck {
        verified,
        upgrade_hash,
    })
}
