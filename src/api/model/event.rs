use chrono::{DateTime, Utc};
use juniper::GraphQLObject;
use tokio_postgres::Row;

use crate::{
    api::{
        Context, Id, Node, NodeValue,
        err::{invalid_input, ApiResult},
        model::user::User,
    },
    auth::SessionUser,
    model::{EventLocation, EventSchedule, EventScheduleEntry, Key},
};


/// An event aggregate as seen through the API.
#[derive(Debug)]
pub(crate) struct Event {
    pub(crate) key: Key,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) date: Option<String>,
    pub(crate) public_limit: Option<String>,
    pub(crate) image: Option<String>,
    pub(crate) location: Option<Location>,
    pub(crate) schedule: Vec<ScheduleEntry>,

    /// The user that created this event. Set once at creation, never
    /// reassigned. A weak reference, so it may dangle.
    pub(crate) created_by: Key,

    /// Attendance lists. Mutating operations keep each user in at most one of
    /// the three lists; here we only read them.
    pub(crate) public_list: Vec<Key>,
    pub(crate) not_going_list: Vec<Key>,
    pub(crate) wait_list: Vec<Key>,

    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, GraphQLObject)]
pub(crate) struct Location {
    postal_code: Option<String>,
    geo_coordinates: Vec<String>,
}

#[derive(Debug, GraphQLObject)]
pub(crate) struct ScheduleEntry {
    speaker: Option<String>,
    title: Option<String>,
    description: Option<String>,
    /// Offset from the start of the event, in seconds.
    start_offset_seconds: i32,
}

impl From<EventLocation> for Location {
    fn from(src: EventLocation) -> Self {
        Self {
            postal_code: src.postal_code,
            geo_coordinates: src.geo_coordinates,
        }
    }
}

impl From<EventScheduleEntry> for ScheduleEntry {
    fn from(src: EventScheduleEntry) -> Self {
        Self {
            speaker: src.speaker,
            title: src.title,
            description: src.description,
            start_offset_seconds: src.start_offset_seconds as i32,
        }
    }
}

impl Event {
    /// Column list matching `from_row`.
    const COLUMNS: &'static str = "id, title, description, event_date, public_limit, image, \
        location, schedule, created_by, public_list, not_going_list, wait_list, \
        created_at, updated_at";

    fn from_row(row: &Row) -> Self {
        Self {
            key: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            date: row.get("event_date"),
            public_limit: row.get("public_limit"),
            image: row.get("image"),
            location: row.get::<_, Option<EventLocation>>("location").map(Into::into),
            schedule: row.get::<_, EventSchedule>("schedule")
                .0
                .into_iter()
                .map(ScheduleEntry::from)
                .collect(),
            created_by: row.get("created_by"),
            public_list: row.get("public_list"),
            not_going_list: row.get("not_going_list"),
            wait_list: row.get("wait_list"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    pub(crate) async fn load_by_id(id: Id, context: &Context) -> ApiResult<Option<Self>> {
        match id.key_for(Id::EVENT_KIND) {
            None => Ok(None),
            Some(key) => Self::load_by_key(key, context).await,
        }
    }

    pub(crate) async fn load_by_key(key: Key, context: &Context) -> ApiResult<Option<Self>> {
        let query = format!("select {} from events where id = $1", Self::COLUMNS);
        let row = context.db.query_opt(&query, &[&key]).await?;
        Ok(row.map(|row| Self::from_row(&row)))
    }

    /// Loads events, newest first. `limit` loads only that many.
    pub(crate) async fn load_all(
        limit: Option<i32>,
        context: &Context,
    ) -> ApiResult<Vec<Self>> {
        if limit.is_some_and(|limit| limit <= 0) {
            return Err(invalid_input!("argument 'limit' has to be > 0, but is {:?}", limit));
        }

        let query = format!(
            "select {} from events order by created_at desc, id limit $1",
            Self::COLUMNS,
        );
        let rows = context.db.query(&query, &[&limit.map(i64::from)]).await?;
        Ok(rows.iter().map(Self::from_row).collect())
    }

    /// Whether the given user created this event. Anonymous visitors own
    /// nothing.
    fn owned_by(&self, session: Option<&SessionUser>) -> bool {
        session.is_some_and(|user| self.created_by == user.key)
    }

    /// Whether the given user is on the public attendance list. Anonymous
    /// visitors attend nothing.
    fn attended_by(&self, session: Option<&SessionUser>) -> bool {
        session.is_some_and(|user| self.public_list.contains(&user.key))
    }

    /// Resolves one attendance list to full user nodes. Empty lists are the
    /// common case and resolve without touching the loader or the DB.
    async fn user_list(&self, keys: &[Key], context: &Context) -> ApiResult<Vec<User>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        context.users.load_many(&context.db, keys).await
    }
}

impl Node for Event {
    fn id(&self) -> Id {
        Id::event(self.key)
    }
}

#[juniper::graphql_object(Context = Context, impl = NodeValue)]
impl Event {
    fn id(&self) -> Id {
        Node::id(self)
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The date of the event, as stored (free text).
    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn public_limit(&self) -> Option<&str> {
        self.public_limit.as_deref()
    }

    fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn location(&self) -> &Option<Location> {
        &self.location
    }

    /// The schedule of the event, in order.
    fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the current user created this event. `false` for anonymous
    /// visitors.
    fn is_owner(&self, context: &Context) -> bool {
        self.owned_by(context.session.as_ref())
    }

    /// Whether the current user is attending this event. `false` for
    /// anonymous visitors.
    fn is_event_attended(&self, context: &Context) -> bool {
        self.attended_by(context.session.as_ref())
    }

    /// Users attending the event.
    async fn public_list(&self, context: &Context) -> ApiResult<Vec<User>> {
        self.user_list(&self.public_list, context).await
    }

    /// Users that can't attend the event.
    async fn not_going_list(&self, context: &Context) -> ApiResult<Vec<User>> {
        self.user_list(&self.not_going_list, context).await
    }

    /// Users waiting for a spot at the event.
    async fn wait_list(&self, context: &Context) -> ApiResult<Vec<User>> {
        self.user_list(&self.wait_list, context).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_event() -> Event {
        let now = Utc::now();
        Event {
            key: Key(1),
            title: Some("Rust meetup".into()),
            description: None,
            date: None,
            public_limit: None,
            image: None,
            location: None,
            schedule: Vec::new(),
            created_by: Key(10),
            public_list: vec![Key(20), Key(30)],
            not_going_list: Vec::new(),
            wait_list: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn session(key: u64) -> Option<SessionUser> {
        Some(SessionUser { key: Key(key), username: format!("user{key}") })
    }

    #[test]
    fn owner_check() {
        let event = dummy_event();
        assert!(event.owned_by(session(10).as_ref()));
        assert!(!event.owned_by(session(20).as_ref()));
    }

    #[test]
    fn attendance_check() {
        let event = dummy_event();
        assert!(event.attended_by(session(20).as_ref()));
        assert!(event.attended_by(session(30).as_ref()));

        // The owner is not automatically attending.
        assert!(!event.attended_by(session(10).as_ref()));
    }

    #[test]
    fn anonymous_visitors() {
        // Requests without a user are normal and must resolve both derived
        // booleans to `false` instead of erroring.
        let event = dummy_event();
        assert!(!event.owned_by(None));
        assert!(!event.attended_by(None));
    }

    #[test]
    fn event_id_roundtrip() {
        let event = dummy_event();
        let id = Node::id(&event);
        assert_eq!(id.key_for(Id::EVENT_KIND), Some(event.key));
        assert_eq!(id.to_string().parse::<Id>(), Ok(id));
    }
}
