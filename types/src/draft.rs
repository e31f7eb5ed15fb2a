//! Typed create forms.

use serde::Serialize;
use serde_json::{json, Value};

use crate::kind::Kind;
use crate::raw::Fields;
use crate::status::JobStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDraft {
    pub title: String,
    pub location: String,
    pub salary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogDraft {
    pub title: String,
    pub date: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestimonialDraft {
    pub name: String,
    pub role: String,
    pub text: String,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub category: String,
}

/// A new record as submitted by an operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    Job(JobDraft),
    Blog(BlogDraft),
    Testimonial(TestimonialDraft),
    Notification(NotificationDraft),
}

impl Draft {
    pub fn kind(&self) -> Kind {
        match self {
            Draft::Job(_) => Kind::JobPosting,
            Draft::Blog(_) => Kind::BlogPost,
            Draft::Testimonial(_) => Kind::Testimonial,
            Draft::Notification(_) => Kind::Notification,
        }
    }

    /// Stored fields, including the defaults a fresh record starts with.
    pub fn into_fields(self) -> Fields {
        let (value, defaults) = match self {
            Draft::Job(draft) => (
                serde_json::to_value(draft),
                vec![("status", json!(JobStatus::Active.label()))],
            ),
            Draft::Blog(draft) => (serde_json::to_value(draft), vec![("views", json!(0))]),
            Draft::Testimonial(mut draft) => {
                draft.rating = draft.rating.min(5);
                (serde_json::to_value(draft), Vec::new())
            }
            Draft::Notification(draft) => (serde_json::to_value(draft), Vec::new()),
        };

        // Plain structs of strings and integers always serialize to objects.
        let mut fields = match value {
            Ok(Value::Object(fields)) => fields,
            _ => Fields::new(),
        };
        for (key, default) in defaults {
            fields.insert(key.to_string(), default);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_drafts_start_active() {
        let fields = Draft::Job(JobDraft {
            title: "Welder".into(),
            location: "Dubai".into(),
            salary: "2000 AED".into(),
        })
        .into_fields();

        assert_eq!(fields["title"], "Welder");
        assert_eq!(fields["status"], "active");
    }

    #[test]
    fn notification_category_is_stored_as_type() {
        let fields = Draft::Notification(NotificationDraft {
            title: "Hiring drive".into(),
            message: "Walk-in interviews on Monday".into(),
            category: "event".into(),
        })
        .into_fields();

        assert_eq!(fields["type"], "event");
        assert!(!fields.contains_key("category"));
    }

    #[test]
    fn testimonial_rating_is_capped() {
        let fields = Draft::Testimonial(TestimonialDraft {
            name: "Ali".into(),
            role: "Driver".into(),
            text: "Great agency".into(),
            rating: 9,
        })
        .into_fields();

        assert_eq!(fields["rating"], 5);
    }

    #[test]
    fn blogs_start_with_zero_views() {
        let draft = Draft::Blog(BlogDraft {
            title: "Visa tips".into(),
            date: "2024-05-01".into(),
            content: "...".into(),
        });
        assert_eq!(draft.kind(), Kind::BlogPost);
        assert_eq!(draft.into_fields()["views"], 0);
    }
}
