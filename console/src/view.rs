//! Console screens and the record sources each one shows.

use std::fmt;

use riziq_types::{Kind, Origin};

use crate::config::Deployment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Applications,
    Jobs,
    Blogs,
    Testimonials,
    Notifications,
    /// Applications and contact messages in one table.
    Messages,
}

impl ViewKind {
    /// Screen an admin lands on after signing in.
    pub const LANDING: ViewKind = ViewKind::Applications;

    /// Sources of the view, in the order their records are concatenated.
    pub fn sources(self, deployment: &Deployment) -> Vec<(Kind, Origin)> {
        let kinds: &[Kind] = match self {
            ViewKind::Applications => &[Kind::Application],
            ViewKind::Jobs => &[Kind::JobPosting],
            ViewKind::Blogs => &[Kind::BlogPost],
            ViewKind::Testimonials => &[Kind::Testimonial],
            ViewKind::Notifications => &[Kind::Notification],
            ViewKind::Messages => &[Kind::Application, Kind::ContactMessage],
        };
        kinds
            .iter()
            .map(|kind| (*kind, deployment.origin_of(*kind)))
            .collect()
    }

    pub fn parse(name: &str) -> Option<ViewKind> {
        match name.trim().to_ascii_lowercase().as_str() {
            "applications" => Some(ViewKind::Applications),
            "jobs" => Some(ViewKind::Jobs),
            "blogs" => Some(ViewKind::Blogs),
            "testimonials" => Some(ViewKind::Testimonials),
            "notifications" => Some(ViewKind::Notifications),
            "messages" => Some(ViewKind::Messages),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::Applications => "applications",
            ViewKind::Jobs => "jobs",
            ViewKind::Blogs => "blogs",
            ViewKind::Testimonials => "testimonials",
            ViewKind::Notifications => "notifications",
            ViewKind::Messages => "messages",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Where the operator asked to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    View(ViewKind),
}
