//! Items that define the domain data model.
//!
//! These are types that directly model the application domain and not
//! technical helpers (like a DB pool): the `Key` primary ID type and the
//! value objects embedded in the `events` row. They don't neatly fit into
//! either of `db` or `api` as they are used in multiple situations (loading
//! from DB, exposing via API, ...).

mod event;
mod key;

pub(crate) use self::{
    event::{EventLocation, EventSchedule, EventScheduleEntry},
    key::Key,
};
