//! Random identifiers for persisted rows

use rand::Rng;

/// Length of workspace identifiers
pub const WORKSPACE_ID_LEN: usize = 8;

/// Length of every other entity identifier
pub const ENTITY_ID_LEN: usize = 12;

const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn random_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// 8 case-sensitive characters from `[a-zA-Z0-9]`.
///
/// Uniqueness is checked once by the workspace repository on insert; there
/// is no retry with a fresh id.
pub fn new_workspace_id() -> String {
    random_id(WORKSPACE_ID_LEN)
}

/// True when `id` has the shape of a generated workspace id.
pub fn is_workspace_id(id: &str) -> bool {
    id.len() == WORKSPACE_ID_LEN && id.bytes().all(|b| CHARSET.contains(&b))
}

/// 12 characters from the same alphabet. Never checked for uniqueness.
pub fn new_entity_id() -> String {
    random_id(ENTITY_ID_LEN)
}
