//! Record model shared by the Riziq admin console crates.
//!
//! Backing stores hand out untyped [`RawItem`]s; the console normalizes them
//! into [`Record`]s whose [`Payload`] is typed per [`Kind`].

mod draft;
mod kind;
mod raw;
mod record;
mod status;

pub use draft::{BlogDraft, Draft, JobDraft, NotificationDraft, TestimonialDraft};
pub use kind::{Kind, Origin, RecordKey};
pub use raw::{id_string, Document, Fields, RawItem};
pub use record::{
    excerpt, ApplicationPayload, BlogPayload, ContactPayload, JobPayload, NotificationPayload,
    Payload, Record, TestimonialPayload, PLACEHOLDER,
};
pub use status::{ApplicationStatus, ContactStatus, JobStatus, Status};
