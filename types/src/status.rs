//! Kind-specific record statuses and their stored labels.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    New,
    Viewed,
    Shortlisted,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Order followed by the "next status" action.
    pub const CYCLE: [ApplicationStatus; 4] = [
        ApplicationStatus::New,
        ApplicationStatus::Viewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
    ];

    /// Targets an operator may pick directly.
    pub const EXPLICIT_TARGETS: [ApplicationStatus; 3] = [
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::New => "New",
            ApplicationStatus::Viewed => "Viewed",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Some(ApplicationStatus::New),
            "viewed" => Some(ApplicationStatus::Viewed),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContactStatus {
    #[default]
    Unread,
    Read,
    Replied,
}

impl ContactStatus {
    pub const CYCLE: [ContactStatus; 3] = [
        ContactStatus::Unread,
        ContactStatus::Read,
        ContactStatus::Replied,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContactStatus::Unread => "Unread",
            ContactStatus::Read => "Read",
            ContactStatus::Replied => "Replied",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unread" => Some(ContactStatus::Unread),
            "read" => Some(ContactStatus::Read),
            "replied" => Some(ContactStatus::Replied),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Active,
    Inactive,
}

impl JobStatus {
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Inactive => "inactive",
        }
    }

    /// Anything other than `active` counts as inactive.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("active") {
            JobStatus::Active
        } else {
            JobStatus::Inactive
        }
    }
}

/// Status of a record, shaped by its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// `None` means the applicant's status was never set.
    Application(Option<ApplicationStatus>),
    Contact(ContactStatus),
    Job(JobStatus),
    /// Notifications are shown as sent once stored.
    Sent,
    /// Blog posts and testimonials carry no status.
    Unspecified,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Application(Some(status)) => status.label(),
            Status::Application(None) => "Pending",
            Status::Contact(status) => status.label(),
            Status::Job(status) => status.label(),
            Status::Sent => "Sent",
            Status::Unspecified => "-",
        }
    }

    /// Whether the row should be highlighted as needing attention.
    pub fn is_fresh(&self) -> bool {
        matches!(
            self,
            Status::Application(Some(ApplicationStatus::New))
                | Status::Contact(ContactStatus::Unread)
                | Status::Job(JobStatus::Active)
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_application_status_reads_pending() {
        assert_eq!(Status::Application(None).label(), "Pending");
        assert_eq!(
            Status::Application(Some(ApplicationStatus::Shortlisted)).label(),
            "Shortlisted"
        );
    }

    #[test]
    fn labels_parse_back() {
        for status in ApplicationStatus::CYCLE {
            assert_eq!(ApplicationStatus::parse(status.label()), Some(status));
        }
        for status in ContactStatus::CYCLE {
            assert_eq!(ContactStatus::parse(status.label()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse("approved"), Some(ApplicationStatus::Approved));
        assert_eq!(ApplicationStatus::parse("pending"), None);
    }

    #[test]
    fn job_status_defaults_to_inactive() {
        assert_eq!(JobStatus::parse("Active"), JobStatus::Active);
        assert_eq!(JobStatus::parse("closed"), JobStatus::Inactive);
        assert_eq!(JobStatus::parse(""), JobStatus::Inactive);
    }
}
