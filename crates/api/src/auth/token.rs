//! Proposal share-token generation.
//!
//! Share tokens gate the public (unauthenticated) proposal view, so they
//! carry all the entropy: 43 alphanumeric characters, roughly 256 bits.
//! The token is stored as-is (unique `uq_proposals_token`) -- unlike refresh
//! tokens there is no hashing step, because the link itself is the secret
//! the client receives.

use rand::Rng;

/// Length of a proposal share token.
pub const SHARE_TOKEN_LENGTH: usize = 43;

/// Generate a URL-safe random share token.
pub fn generate_share_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SHARE_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
