use crate::api::{
    Context, Id,
    model::{event::Event, user::User},
};


/// A node with a globally unique ID. Mostly useful for relay.
#[juniper::graphql_interface(Context = Context, for = [Event, User])]
pub(crate) trait Node {
    fn id(&self) -> Id;
}
