//! ID generation utilities.

use uuid::Uuid;

/// Generate a new delivery ID.
///
/// UUID v4 rather than a timestamp-plus-suffix scheme, so ids generated
/// concurrently cannot collide in practice.
pub fn delivery_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a short random ID (8 hex characters).
pub fn short_id() -> String {
    let bytes: [u8; 4] = rand::random();
    hex::encode(bytes)
}
