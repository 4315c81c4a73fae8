//! Random tokens for `{{hex}}` and `{{uuid}}` placeholders.

use rand::RngCore;

/// Length of the plain `{{hex}}` token.
pub const DEFAULT_HEX_LEN: usize = 6;

/// Group lengths of a UUID-shaped token.
const UUID_GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// Upper-case hex string of exactly `len` digits.
///
/// Every digit is drawn from a fresh random nibble, so the value is uniform
/// over all `16^len` strings.
pub fn random_hex<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> String {
    let mut bytes = vec![0u8; len.div_ceil(2)];
    rng.fill_bytes(&mut bytes);
    let mut hex = hex::encode_upper(bytes);
    hex.truncate(len);
    hex
}

/// UUID-shaped token: 32 upper-case hex digits grouped 8-4-4-4-12 and
/// joined by `delimiter`.
pub fn random_uuid<R: RngCore + ?Sized>(rng: &mut R, delimiter: &str) -> String {
    UUID_GROUPS
        .iter()
        .map(|len| random_hex(rng, *len))
        .collect::<Vec<_>>()
        .join(delimiter)
}
