//! Status transitions for applications and contact messages.

use riziq_types::{ApplicationStatus, ContactStatus, Kind, Status};

use crate::Error;

/// How an operator asks for a new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Step to the next status of the kind's cycle.
    Advance,
    /// Jump straight to the given application status.
    Set(ApplicationStatus),
}

/// Computes the status that `transition` leads to from `current`.
pub fn apply(kind: Kind, current: Status, transition: Transition) -> Result<Status, Error> {
    match (current, transition) {
        (Status::Application(current), Transition::Advance) => {
            Ok(Status::Application(Some(next_application(current))))
        }
        (Status::Application(_), Transition::Set(target)) => {
            if ApplicationStatus::EXPLICIT_TARGETS.contains(&target) {
                Ok(Status::Application(Some(target)))
            } else {
                Err(Error::InvalidTransition {
                    kind,
                    reason: format!("{} cannot be chosen directly", target.label()),
                })
            }
        }
        (Status::Contact(current), Transition::Advance) => Ok(Status::Contact(next_contact(current))),
        (Status::Contact(_), Transition::Set(_)) => Err(Error::InvalidTransition {
            kind,
            reason: "messages only move to the next status".to_string(),
        }),
        (other, _) => Err(Error::InvalidTransition {
            kind,
            reason: format!("status `{}` is not operator-managed", other.label()),
        }),
    }
}

/// A status outside the cycle (unset or `Approved`) restarts at `New`.
fn next_application(current: Option<ApplicationStatus>) -> ApplicationStatus {
    let cycle = &ApplicationStatus::CYCLE;
    current
        .and_then(|status| cycle.iter().position(|s| *s == status))
        .map(|index| cycle[(index + 1) % cycle.len()])
        .unwrap_or(cycle[0])
}

fn next_contact(current: ContactStatus) -> ContactStatus {
    let cycle = &ContactStatus::CYCLE;
    let index = cycle.iter().position(|s| *s == current).unwrap_or(0);
    cycle[(index + 1) % cycle.len()]
}
