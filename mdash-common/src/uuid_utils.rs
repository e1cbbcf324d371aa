//! UUID utilities

use uuid::Uuid;

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

/// Parse an entity key taken from a request
///
/// An empty (or all-whitespace) key maps to the nil UUID, which stands for
/// "no parent specified" and routes lookups to top-level entities.
pub fn parse_entity_key(s: &str) -> Result<Uuid, uuid::Error> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(Uuid::nil());
    }
    Uuid::parse_str(trimmed)
}
