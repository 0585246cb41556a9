//! ID generation utilities.

use uuid::Uuid;

/// Generate a short delivery identifier (first 8 characters of a UUID v4).
///
/// Short enough to read in log lines, long enough to tell concurrent
/// deliveries apart within a session.
pub fn delivery_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
