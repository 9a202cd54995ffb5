use juniper::graphql_object;

use super::{
    Context, Id, NodeValue,
    err::ApiResult,
    model::{event::Event, user::User},
};


/// The root query object.
pub(crate) struct Query;

#[graphql_object(Context = Context)]
impl Query {
    /// Returns an event by its ID.
    async fn event_by_id(id: Id, context: &Context) -> ApiResult<Option<Event>> {
        Event::load_by_id(id, context).await
    }

    /// Returns all events, newest first. `limit` returns only that many.
    async fn all_events(limit: Option<i32>, context: &Context) -> ApiResult<Vec<Event>> {
        Event::load_all(limit, context).await
    }

    /// Returns a user by their ID.
    async fn user_by_id(id: Id, context: &Context) -> ApiResult<Option<User>> {
        User::load_by_id(id, context).await
    }

    /// Returns the currently authenticated user, or `null` for anonymous
    /// requests.
    async fn current_user(context: &Context) -> ApiResult<Option<User>> {
        match &context.session {
            None => Ok(None),
            Some(session) => context.users.load(&context.db, session.key).await,
        }
    }

    /// Retrieve a node by globally unique ID. Mostly useful for relay.
    async fn node(id: Id, context: &Context) -> ApiResult<Option<NodeValue>> {
        match id.kind() {
            Id::EVENT_KIND => Ok(Event::load_by_id(id, context).await?.map(NodeValue::from)),
            Id::USER_KIND => Ok(User::load_by_id(id, context).await?.map(NodeValue::from)),
            _ => Ok(None),
        }
    }
}
