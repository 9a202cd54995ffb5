use crate::{
    auth::SessionUser,
    db::DbConnection,
};

use super::loader::UserLoader;


/// The context that is accessible to every resolver in our API. Constructed
/// once per incoming request and dropped at the end of it, together with the
/// loader cache inside.
pub(crate) struct Context {
    pub(crate) db: DbConnection,
    pub(crate) session: Option<SessionUser>,
    pub(crate) users: UserLoader,
}

impl juniper::Context for Context {}

impl Context {
    pub(crate) fn new(db: DbConnection, session: Option<SessionUser>) -> Self {
        Self {
            db,
            session,
            users: UserLoader::new(),
        }
    }
}
