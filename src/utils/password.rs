use base64::{Engine, engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD}};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;
use thiserror::Error;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid hash format")]
    InvalidFormat,

    #[error("Invalid iterations")]
    InvalidIterations,

    #[error("Failed to decode hash: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("PBKDF2 failed")]
    Pbkdf2,
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password hashing error: {}", err))
    }
}

/// Hash un mot de passe : PBKDF2-HMAC-SHA256, salt aléatoire de 16 bytes.
/// Format: pbkdf2:sha256:iterations$salt$hash (base64 URL-safe sans padding)
pub fn hash_password(password: &str, iterations: u32) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let key = derive(password.as_bytes(), &salt, iterations, KEY_LENGTH)?;

    Ok(format!(
        "pbkdf2:sha256:{}${}${}",
        iterations,
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(key)
    ))
}

/// Vérifie un mot de passe contre un hash stocké.
/// Accepte aussi le format Django (pbkdf2_sha256$iterations$salt$hash) des
/// comptes importés de l'ancien site.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    if let Some(rest) = stored_hash.strip_prefix("pbkdf2_sha256$") {
        return verify_django(password, rest);
    }

    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err(PasswordError::InvalidFormat);
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return Err(PasswordError::InvalidFormat);
    }

    let iterations = parse_iterations(header_parts[2])?;
    let salt = URL_SAFE_NO_PAD.decode(parts[1])?;
    let expected = URL_SAFE_NO_PAD.decode(parts[2])?;

    let computed = derive(password.as_bytes(), &salt, iterations, expected.len())?;
    Ok(constant_time_eq(&computed, &expected))
}

// Django : le salt est utilisé tel quel (texte), le hash est en base64 standard
fn verify_django(password: &str, rest: &str) -> Result<bool, PasswordError> {
    let parts: Vec<&str> = rest.split('$').collect();
    if parts.len() != 3 {
        return Err(PasswordError::InvalidFormat);
    }

    let iterations = parse_iterations(parts[0])?;
    let expected = STANDARD.decode(parts[2])?;

    let computed = derive(password.as_bytes(), parts[1].as_bytes(), iterations, expected.len())?;
    Ok(constant_time_eq(&computed, &expected))
}

fn parse_iterations(raw: &str) -> Result<u32, PasswordError> {
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => Err(PasswordError::InvalidIterations),
        Ok(n) => Ok(n),
    }
}

fn derive(password: &[u8], salt: &[u8], iterations: u32, len: usize) -> Result<Vec<u8>, PasswordError> {
    let mut key = vec![0u8; len];
    pbkdf2::<HmacSha256>(password, salt, iterations, &mut key).map_err(|_| PasswordError::Pbkdf2)?;
    Ok(key)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
