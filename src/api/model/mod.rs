//! This module and its children define most of the application logic of the
//! API.

pub(crate) mod event;
pub(crate) mod user;
