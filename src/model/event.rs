use bytes::BytesMut;
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};


/// The embedded location of an event. Stored as a single `jsonb` value inside
/// the `events` row; it has no identity or lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EventLocation {
    pub(crate) postal_code: Option<String>,

    /// Coordinates as stored, i.e. as opaque strings. We never calculate with
    /// them, so there is no reason to parse them into numbers.
    #[serde(default)]
    pub(crate) geo_coordinates: Vec<String>,
}

/// One entry of an event's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EventScheduleEntry {
    pub(crate) speaker: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,

    /// Offset from the start of the event. `u32` so that negative values are
    /// already rejected when reading the stored JSON.
    #[serde(default)]
    pub(crate) start_offset_seconds: u32,
}

/// The full schedule of an event: an ordered list of entries, stored as one
/// `jsonb` array. The order of the array is the order of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct EventSchedule(pub(crate) Vec<EventScheduleEntry>);


// Both embedded value types are read and written as `jsonb`, going through
// `serde_json::Value`.
macro_rules! impl_sql_via_json {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(
                &self,
                ty: &postgres_types::Type,
                out: &mut BytesMut,
            ) -> Result<postgres_types::IsNull, Box<dyn std::error::Error + Sync + Send>> {
                serde_json::to_value(self)
                    .expect(concat!("failed to convert `", stringify!($ty), "` to JSON value"))
                    .to_sql(ty, out)
            }

            fn accepts(ty: &postgres_types::Type) -> bool {
                <serde_json::Value as ToSql>::accepts(ty)
            }

            postgres_types::to_sql_checked!();
        }

        impl<'a> FromSql<'a> for $ty {
            fn from_sql(
                ty: &postgres_types::Type,
                raw: &'a [u8],
            ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
                serde_json::from_value(<_>::from_sql(ty, raw)?).map_err(Into::into)
            }

            fn accepts(ty: &postgres_types::Type) -> bool {
                <serde_json::Value as FromSql>::accepts(ty)
            }
        }
    };
}

impl_sql_via_json!(EventLocation);
impl_sql_via_json!(EventSchedule);


#[cfg(test)]
mod tests {
    use super::*;

    fn entry(speaker: &str, offset: u32) -> EventScheduleEntry {
        EventScheduleEntry {
            speaker: Some(speaker.into()),
            title: Some(format!("Talk by {speaker}")),
            description: None,
            start_offset_seconds: offset,
        }
    }

    #[test]
    fn schedule_order_is_preserved() {
        let schedule = EventSchedule(vec![
            entry("Ada", 0),
            entry("Grace", 1800),
            entry("Barbara", 3600),
        ]);

        let json = serde_json::to_value(&schedule).unwrap();
        let read_back: EventSchedule = serde_json::from_value(json).unwrap();
        assert_eq!(read_back, schedule);
        assert_eq!(
            read_back.0.iter().map(|e| e.speaker.as_deref()).collect::<Vec<_>>(),
            [Some("Ada"), Some("Grace"), Some("Barbara")],
        );
    }

    #[test]
    fn negative_start_offset_is_rejected() {
        let json = serde_json::json!([{
            "speaker": "Ada",
            "title": null,
            "description": null,
            "start_offset_seconds": -30,
        }]);
        assert!(serde_json::from_value::<EventSchedule>(json).is_err());
    }

    #[test]
    fn location_defaults() {
        let location: EventLocation = serde_json::from_value(
            serde_json::json!({ "postal_code": "04109" }),
        ).unwrap();
        assert_eq!(location.postal_code.as_deref(), Some("04109"));
        assert!(location.geo_coordinates.is_empty());
    }
}
