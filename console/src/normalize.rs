//! Maps raw items of any kind onto the common [`Record`] shape.
//!
//! Normalization is total: a missing or oddly typed field turns into a
//! placeholder or `None`, never an error. Field names follow what the public
//! site writes (`fullName`, `createdAt`, ...).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use riziq_types::{
    ApplicationPayload, ApplicationStatus, BlogPayload, ContactPayload, ContactStatus, Fields,
    JobPayload, JobStatus, Kind, NotificationPayload, Payload, RawItem, Record, Status,
    TestimonialPayload, PLACEHOLDER,
};
use serde_json::Value;

pub fn normalize(item: &RawItem, kind: Kind) -> Record {
    let fields = &item.fields;

    let display_name = match kind {
        Kind::Application => text(fields, "fullName"),
        Kind::ContactMessage | Kind::Testimonial => text(fields, "name"),
        Kind::JobPosting | Kind::BlogPost | Kind::Notification => text(fields, "title"),
    }
    .unwrap_or_else(|| PLACEHOLDER.to_string());

    let timestamp = match kind {
        Kind::Application => first_instant(fields, &["createdAt", "appliedAt"]),
        Kind::ContactMessage => first_instant(fields, &["receivedAt", "createdAt"]),
        Kind::BlogPost => first_instant(fields, &["createdAt", "date"]),
        Kind::Notification => {
            first_instant(fields, &["createdAt"]).or_else(|| fields.get("id").and_then(instant))
        }
        Kind::JobPosting | Kind::Testimonial => first_instant(fields, &["createdAt"]),
    };

    Record {
        id: item.id.clone(),
        display_name,
        timestamp,
        status: status_of(kind, fields),
        origin: item.origin,
        payload: payload(kind, fields),
    }
}

/// Status stored in `fields`, interpreted for `kind`.
pub fn status_of(kind: Kind, fields: &Fields) -> Status {
    let stored = text(fields, "status");
    match kind {
        Kind::Application => {
            Status::Application(stored.as_deref().and_then(ApplicationStatus::parse))
        }
        Kind::ContactMessage => Status::Contact(
            stored
                .as_deref()
                .and_then(ContactStatus::parse)
                .unwrap_or_default(),
        ),
        Kind::JobPosting => Status::Job(JobStatus::parse(stored.as_deref().unwrap_or_default())),
        Kind::Notification => Status::Sent,
        Kind::BlogPost | Kind::Testimonial => Status::Unspecified,
    }
}

fn payload(kind: Kind, fields: &Fields) -> Payload {
    match kind {
        Kind::Application => Payload::Application(ApplicationPayload {
            email: text(fields, "email"),
            phone: text(fields, "phone"),
            country: text(fields, "country"),
            experience: text(fields, "experience"),
            job_title: text(fields, "jobTitle").or_else(|| text(fields, "jobType")),
            cv: text(fields, "cv").or_else(|| text(fields, "cvUrl")),
        }),
        Kind::JobPosting => Payload::JobPosting(JobPayload {
            location: text(fields, "location"),
            salary: text(fields, "salary"),
        }),
        Kind::BlogPost => Payload::BlogPost(BlogPayload {
            date: text(fields, "date"),
            content: text(fields, "content"),
            views: fields.get("views").and_then(Value::as_u64).unwrap_or(0),
        }),
        Kind::Testimonial => Payload::Testimonial(TestimonialPayload {
            role: text(fields, "role"),
            text: text(fields, "text"),
            rating: fields
                .get("rating")
                .and_then(Value::as_u64)
                .map(|r| r.min(5) as u8)
                .unwrap_or(0),
        }),
        Kind::Notification => Payload::Notification(NotificationPayload {
            message: text(fields, "message"),
            category: text(fields, "type"),
        }),
        Kind::ContactMessage => Payload::ContactMessage(ContactPayload {
            email: text(fields, "email"),
            phone: text(fields, "phone"),
            country: text(fields, "country"),
            subject: text(fields, "subject"),
            message: text(fields, "message"),
        }),
    }
}

/// Non-empty textual form of a field; numbers and booleans are printed.
fn text(fields: &Fields, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_instant(fields: &Fields, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| fields.get(*key).and_then(instant))
}

/// Reads a point in time from any encoding the stores produce.
///
/// Accepts RFC 3339 strings, `YYYY-MM-DD` dates, naive date-times, epoch
/// milliseconds and server timestamp objects (`seconds` + `nanoseconds`).
pub fn instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Some(ts.with_timezone(&Utc));
            }
            if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(ts.and_utc());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ts| ts.and_utc())
        }
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis)
        }
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, nanos.min(999_999_999) as u32)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riziq_types::Origin;
    use serde_json::json;

    fn raw(id: &str, value: Value) -> RawItem {
        let Value::Object(fields) = value else {
            panic!("test item must be an object");
        };
        RawItem {
            id: id.to_string(),
            origin: Origin::Remote,
            fields,
        }
    }

    #[test]
    fn application_fields_are_hoisted() {
        let item = raw(
            "a1",
            json!({
                "fullName": "Amina Yusuf",
                "email": "amina@example.com",
                "phone": 971500000,
                "country": "Kenya",
                "jobTitle": "Nurse",
                "createdAt": "2024-03-01T10:00:00Z",
                "status": "shortlisted"
            }),
        );
        let record = normalize(&item, Kind::Application);

        assert_eq!(record.display_name, "Amina Yusuf");
        assert_eq!(record.kind(), Kind::Application);
        assert_eq!(
            record.status,
            Status::Application(Some(ApplicationStatus::Shortlisted))
        );
        assert_eq!(record.timestamp.unwrap().to_rfc3339(), "2024-03-01T10:00:00+00:00");
        let Payload::Application(payload) = &record.payload else {
            panic!("expected an application payload");
        };
        assert_eq!(payload.phone.as_deref(), Some("971500000"));
        assert_eq!(payload.job_title.as_deref(), Some("Nurse"));
    }

    #[test]
    fn empty_items_normalize_to_placeholders() {
        for kind in Kind::ALL {
            let record = normalize(&raw("x", json!({})), kind);
            assert_eq!(record.id, "x");
            assert_eq!(record.display_name, PLACEHOLDER);
            assert_eq!(record.timestamp, None);
            assert_eq!(record.kind(), kind);
        }
    }

    #[test]
    fn wrongly_typed_fields_are_tolerated() {
        let item = raw(
            "x",
            json!({ "fullName": ["not", "text"], "createdAt": true, "status": 7, "views": "many" }),
        );
        let record = normalize(&item, Kind::Application);
        assert_eq!(record.display_name, PLACEHOLDER);
        assert_eq!(record.timestamp, None);
        assert_eq!(record.status, Status::Application(None));
        assert_eq!(record.status.label(), "Pending");

        let blog = normalize(&item, Kind::BlogPost);
        assert_eq!(blog.payload, Payload::BlogPost(BlogPayload::default()));
    }

    #[test]
    fn normalization_leaves_input_untouched() {
        let item = raw("c1", json!({ "name": "Omar", "receivedAt": 1700000000000u64 }));
        let before = item.clone();
        let record = normalize(&item, Kind::ContactMessage);
        assert_eq!(item, before);
        assert_eq!(record.status, Status::Contact(ContactStatus::Unread));
        assert_eq!(record.summary(), "Inquiry");
    }

    #[test]
    fn timestamps_in_every_encoding() {
        let expected = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(instant(&json!(1_700_000_000_000u64)), Some(expected));
        assert_eq!(instant(&json!("2023-11-14T22:13:20Z")), Some(expected));
        assert_eq!(instant(&json!("2023-11-14T22:13:20")), Some(expected));
        assert_eq!(
            instant(&json!({ "seconds": 1_700_000_000, "nanoseconds": 0 })),
            Some(expected)
        );
        assert_eq!(
            instant(&json!("2023-11-14")),
            DateTime::from_timestamp(1_699_920_000, 0)
        );
        assert_eq!(instant(&json!("yesterday")), None);
        assert_eq!(instant(&Value::Null), None);
    }

    #[test]
    fn notifications_fall_back_to_id_millis() {
        let item = raw(
            "1700000000000",
            json!({ "id": 1_700_000_000_000u64, "title": "Drive", "message": "Monday" }),
        );
        let record = normalize(&item, Kind::Notification);
        assert_eq!(record.timestamp, DateTime::from_timestamp(1_700_000_000, 0));
        assert_eq!(record.status, Status::Sent);
    }

    #[test]
    fn blog_dates_sort_without_created_at() {
        let record = normalize(&raw("b", json!({ "title": "Tips", "date": "2024-01-02" })), Kind::BlogPost);
        assert_eq!(record.date_label(), "2024-01-02");
    }
}
