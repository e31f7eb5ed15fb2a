//! Record kinds and the backing store a record lives in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of record kinds the console displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Application,
    JobPosting,
    BlogPost,
    Testimonial,
    Notification,
    ContactMessage,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::Application,
        Kind::JobPosting,
        Kind::BlogPost,
        Kind::Testimonial,
        Kind::Notification,
        Kind::ContactMessage,
    ];

    /// Short label shown in the kind badge of a table row.
    pub fn label(self) -> &'static str {
        match self {
            Kind::Application => "Application",
            Kind::JobPosting => "Job",
            Kind::BlogPost => "Blog",
            Kind::Testimonial => "Testimonial",
            Kind::Notification => "Notification",
            Kind::ContactMessage => "Contact",
        }
    }

    /// Fixed local-store slot holding this kind's items.
    pub fn slot_key(self) -> &'static str {
        match self {
            Kind::Application => "riziq_applications",
            Kind::JobPosting => "riziq_jobs",
            Kind::BlogPost => "riziq_blogs",
            Kind::Testimonial => "riziq_testimonials",
            Kind::Notification => "riziq_notifications",
            Kind::ContactMessage => "riziq_messages",
        }
    }

    /// Kind stored under a local slot key, if any.
    pub fn from_slot_key(key: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|kind| kind.slot_key() == key)
    }

    /// Remote collection name. Only applications and jobs have one.
    pub fn collection(self) -> Option<&'static str> {
        match self {
            Kind::Application => Some("applications"),
            Kind::JobPosting => Some("jobs"),
            _ => None,
        }
    }

    /// Parses a filter or command word such as `application` or `contact`.
    pub fn parse(word: &str) -> Option<Kind> {
        let word = word.trim().to_ascii_lowercase();
        match word.as_str() {
            "application" | "applications" => Some(Kind::Application),
            "job" | "jobs" | "jobposting" => Some(Kind::JobPosting),
            "blog" | "blogs" | "blogpost" => Some(Kind::BlogPost),
            "testimonial" | "testimonials" => Some(Kind::Testimonial),
            "notification" | "notifications" => Some(Kind::Notification),
            "contact" | "contacts" | "message" | "messages" => Some(Kind::ContactMessage),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which backing store holds a record's canonical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Remote,
    Local,
}

impl Origin {
    pub fn parse(value: &str) -> Option<Origin> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Some(Origin::Remote),
            "local" => Some(Origin::Local),
            _ => None,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Remote => f.write_str("remote"),
            Origin::Local => f.write_str("local"),
        }
    }
}

/// Addresses one record: ids are only unique within a kind and origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub kind: Kind,
    pub origin: Origin,
    pub id: String,
}

impl RecordKey {
    pub fn new(kind: Kind, origin: Origin, id: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            id: id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.id, self.origin)
    }
}
