//! Webhook signing-secret generation.
//!
//! Secrets are opaque shared tokens: the subscriber compares the secret
//! header on incoming deliveries against the value shown at registration or
//! rotation time. Rotation simply generates a fresh token and persists it;
//! deliveries already in flight keep the value they captured.

use rand::RngExt;

/// Marker prefix identifying campus webhook secrets.
pub const SECRET_PREFIX: &str = "whsec_";

/// Number of random alphanumeric characters following the prefix.
pub const SECRET_RANDOM_LEN: usize = 32;

/// Generates a new webhook secret.
///
/// The token is the fixed [`SECRET_PREFIX`] followed by
/// [`SECRET_RANDOM_LEN`] characters drawn uniformly from `[A-Za-z0-9]`.
pub fn generate() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SECRET_RANDOM_LEN)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect();
    format!("{SECRET_PREFIX}{suffix}")
}

/// Returns whether a token has the shape of a generated secret.
pub fn is_well_formed(token: &str) -> bool {
    token.strip_prefix(SECRET_PREFIX).is_some_and(|suffix| {
        suffix.len() == SECRET_RANDOM_LEN && suffix.chars().all(|c| c.is_ascii_alphanumeric())
    })
}
