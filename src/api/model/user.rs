use tokio_postgres::Row;

use crate::{
    api::{Context, Id, Node, NodeValue, err::ApiResult},
    model::Key,
};


#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) key: Key,
    pub(crate) username: String,
    pub(crate) display_name: String,
    pub(crate) email: Option<String>,
}

impl User {
    /// Column list matching `from_row`.
    pub(crate) const COLUMNS: &'static str = "id, username, display_name, email";

    pub(crate) fn from_row(row: &Row) -> Self {
        Self {
            key: row.get("id"),
            username: row.get("username"),
            display_name: row.get("display_name"),
            email: row.get("email"),
        }
    }

    pub(crate) async fn load_by_id(id: Id, context: &Context) -> ApiResult<Option<Self>> {
        match id.key_for(Id::USER_KIND) {
            None => Ok(None),
            Some(key) => context.users.load(&context.db, key).await,
        }
    }
}

impl Node for User {
    fn id(&self) -> Id {
        Id::user(self.key)
    }
}

#[juniper::graphql_object(Context = Context, impl = NodeValue)]
impl User {
    fn id(&self) -> Id {
        Node::id(self)
    }

    /// The username, a unique string identifying the user.
    fn username(&self) -> &str {
        &self.username
    }

    /// The name of the user intended to be read by humans.
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
