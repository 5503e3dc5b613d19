use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::CryptoError;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

const SCHEME: &str = "pbkdf2-sha256";

/// Lowest iteration count accepted when verifying a stored hash.
const MIN_ITERATIONS: u32 = 1_000;

/// Hash a password into a self-describing string:
/// `pbkdf2-sha256$<iterations>$<salt>$<hash>` (unpadded base64).
pub fn hash_password(password: &str, iterations: u32) -> Result<String, CryptoError> {
    if iterations < MIN_ITERATIONS {
        return Err(CryptoError::InvalidIterations(iterations));
    }
    let salt = generate_salt();
    let derived = derive(password, &salt, iterations);
    Ok(format!(
        "{SCHEME}${iterations}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(derived.as_slice()),
    ))
}

/// Check a password against a stored hash in constant time.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, CryptoError> {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(CryptoError::MalformedHash);
    };

    if scheme != SCHEME {
        return Err(CryptoError::UnsupportedScheme(scheme.to_string()));
    }
    let iterations: u32 = iterations.parse().map_err(|_| CryptoError::MalformedHash)?;
    if iterations < MIN_ITERATIONS {
        return Err(CryptoError::InvalidIterations(iterations));
    }
    let salt = STANDARD_NO_PAD
        .decode(salt)
        .map_err(|_| CryptoError::MalformedHash)?;
    let expected = STANDARD_NO_PAD
        .decode(expected)
        .map_err(|_| CryptoError::MalformedHash)?;
    if expected.len() != HASH_LENGTH {
        return Err(CryptoError::MalformedHash);
    }

    let derived = derive(password, &salt, iterations);
    Ok(derived.as_slice().ct_eq(&expected).into())
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; HASH_LENGTH]> {
    let mut out = Zeroizing::new([0u8; HASH_LENGTH]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut *out);
    out
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keeps the suite fast; production uses PBKDF2_ITERATIONS.
    const TEST_ITERATIONS: u32 = 1_000;

    #[test]
    fn hash_then_verify() {
        let stored = hash_password("correct horse", TEST_ITERATIONS).unwrap();
        assert!(stored.starts_with("pbkdf2-sha256$1000$"));
        assert!(verify_password("correct horse", &stored).unwrap());
        assert!(!verify_password("wrong horse", &stored).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("secret", TEST_ITERATIONS).unwrap();
        let b = hash_password("secret", TEST_ITERATIONS).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret", &a).unwrap());
        assert!(verify_password("secret", &b).unwrap());
    }

    #[test]
    fn plaintext_is_not_embedded() {
        let stored = hash_password("visible-password", TEST_ITERATIONS).unwrap();
        assert!(!stored.contains("visible-password"));
    }

    #[test]
    fn low_iteration_count_rejected() {
        assert!(matches!(
            hash_password("x", 10),
            Err(CryptoError::InvalidIterations(10))
        ));
    }

    #[test]
    fn malformed_hashes_are_errors() {
        assert!(matches!(
            verify_password("x", "not-a-hash"),
            Err(CryptoError::MalformedHash)
        ));
        assert!(matches!(
            verify_password("x", "bcrypt$10$abc$def"),
            Err(CryptoError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            verify_password("x", "pbkdf2-sha256$1000$!!$AAAA"),
            Err(CryptoError::MalformedHash)
        ));
        assert!(matches!(
            verify_password("x", "pbkdf2-sha256$1000$c2FsdA$c2hvcnQ"),
            Err(CryptoError::MalformedHash)
        ));
    }

    #[test]
    fn generate_salt_is_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
