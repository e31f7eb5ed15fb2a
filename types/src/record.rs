//! Normalized display records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::kind::{Kind, Origin, RecordKey};
use crate::status::Status;

/// Shown wherever a source omitted a field.
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplicationPayload {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub experience: Option<String>,
    pub job_title: Option<String>,
    pub cv: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobPayload {
    pub location: Option<String>,
    pub salary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogPayload {
    pub date: Option<String>,
    pub content: Option<String>,
    pub views: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestimonialPayload {
    pub role: Option<String>,
    pub text: Option<String>,
    pub rating: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub message: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactPayload {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// Kind-specific fields, one variant per [`Kind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Payload {
    Application(ApplicationPayload),
    JobPosting(JobPayload),
    BlogPost(BlogPayload),
    Testimonial(TestimonialPayload),
    Notification(NotificationPayload),
    ContactMessage(ContactPayload),
}

impl Payload {
    pub fn kind(&self) -> Kind {
        match self {
            Payload::Application(_) => Kind::Application,
            Payload::JobPosting(_) => Kind::JobPosting,
            Payload::BlogPost(_) => Kind::BlogPost,
            Payload::Testimonial(_) => Kind::Testimonial,
            Payload::Notification(_) => Kind::Notification,
            Payload::ContactMessage(_) => Kind::ContactMessage,
        }
    }
}

/// The unit every table displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    pub display_name: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub status: Status,
    pub origin: Origin,
    pub payload: Payload,
}

impl Record {
    /// The kind always follows the payload variant.
    pub fn kind(&self) -> Kind {
        self.payload.kind()
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.kind(), self.origin, self.id.clone())
    }

    /// Contact line shown under the name: email and phone where known.
    pub fn contact_line(&self) -> String {
        let (email, phone) = match &self.payload {
            Payload::Application(p) => (p.email.as_deref(), p.phone.as_deref()),
            Payload::ContactMessage(p) => (p.email.as_deref(), p.phone.as_deref()),
            _ => (None, None),
        };
        match (email, phone) {
            (Some(email), Some(phone)) => format!("{email} / {phone}"),
            (Some(one), None) | (None, Some(one)) => one.to_string(),
            (None, None) => PLACEHOLDER.to_string(),
        }
    }

    /// Secondary column: the subject of a row in its own terms.
    pub fn summary(&self) -> String {
        let text = match &self.payload {
            Payload::Application(p) => p.job_title.clone(),
            Payload::JobPosting(p) => match (&p.location, &p.salary) {
                (Some(location), Some(salary)) => Some(format!("{location}, {salary}")),
                (Some(one), None) | (None, Some(one)) => Some(one.clone()),
                (None, None) => None,
            },
            Payload::BlogPost(p) => Some(format!("{} views", p.views)),
            Payload::Testimonial(p) => Some("\u{2605}".repeat(p.rating as usize)),
            Payload::Notification(p) => p.message.as_deref().map(|m| excerpt(m, 30)),
            Payload::ContactMessage(p) => p.subject.clone().or_else(|| Some("Inquiry".to_string())),
        };
        text.filter(|t| !t.is_empty())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// Calendar date of the timestamp, or the placeholder.
    pub fn date_label(&self) -> String {
        self.timestamp
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(email: Option<&str>, phone: Option<&str>) -> Record {
        Record {
            id: "1".to_string(),
            display_name: "Sara".to_string(),
            timestamp: None,
            status: Status::Unspecified,
            origin: Origin::Local,
            payload: Payload::ContactMessage(ContactPayload {
                email: email.map(str::to_string),
                phone: phone.map(str::to_string),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn contact_line_uses_what_is_known() {
        assert_eq!(contact(Some("a@b.c"), Some("123")).contact_line(), "a@b.c / 123");
        assert_eq!(contact(None, Some("123")).contact_line(), "123");
        assert_eq!(contact(None, None).contact_line(), PLACEHOLDER);
    }

    #[test]
    fn contact_summary_defaults_to_inquiry() {
        assert_eq!(contact(None, None).summary(), "Inquiry");
        assert_eq!(contact(None, None).date_label(), PLACEHOLDER);
    }

    #[test]
    fn excerpt_cuts_long_text() {
        assert_eq!(excerpt("short", 30), "short");
        assert_eq!(excerpt("abcdef", 3), "abc...");
    }
}
