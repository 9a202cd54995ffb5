//! Definition of the GraphQL API.

use juniper::{EmptyMutation, EmptySubscription};

use self::query::Query;

pub(crate) mod err;
pub(crate) mod model;

mod common;
mod context;
mod id;
mod loader;
mod query;

pub(crate) use self::{
    common::{Node, NodeValue},
    context::Context,
    id::Id,
};


/// Creates and returns the API root node.
pub(crate) fn root_node() -> RootNode {
    RootNode::new(Query, EmptyMutation::new(), EmptySubscription::new())
}

/// Type of our API root node. All mutating operations (creating events,
/// RSVPs, ...) live in a different service, so mutation and subscription are
/// empty here.
pub(crate) type RootNode = juniper::RootNode<
    'static,
    Query,
    EmptyMutation<Context>,
    EmptySubscription<Context>,
>;
