//! The user identity attached to a request.
//!
//! Actual authentication (sessions, login handlers, header checks, ...) lives
//! in the reverse proxy in front of this backend and is out of scope here.
//! This backend only receives the result: either an authenticated user or
//! nothing.

use crate::model::Key;


/// The authenticated user of the current request. Requests without this are
/// regular anonymous visitors, not an error case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionUser {
    /// Key of the corresponding row in the `users` table.
    pub(crate) key: Key,
    pub(crate) username: String,
}
