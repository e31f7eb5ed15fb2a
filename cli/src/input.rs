//! Operator input lines and their translation into view commands.

use std::collections::HashMap;

use riziq_console::{Command, KindFilter};
use riziq_types::{
    ApplicationStatus, BlogDraft, Draft, JobDraft, NotificationDraft, RecordKey,
    TestimonialDraft,
};

use crate::table::Rows;
use crate::Error;

pub const HELP: &str = "\
commands:
  next N                      advance the status of row N
  approve|reject|shortlist N  set the status of application row N
  delete N                    delete row N (asks first)
  show N                      show every field of row N
  filter all|application|contact|...
  add job title=.. location=.. salary=..
  add blog title=.. date=.. content=..
  add testimonial name=.. role=.. text=.. rating=1-5
  add notification title=.. message=.. type=..
  logout | quit";

/// One parsed input line. Row numbers are as printed, starting at 1.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Next(usize),
    Set(usize, ApplicationStatus),
    Delete(usize),
    Show(usize),
    Filter(KindFilter),
    Add(Draft),
    Logout,
    Quit,
    Help,
    Blank,
}

impl Input {
    pub fn parse(line: &str) -> Result<Self, Error> {
        let words = split(line)?;
        let Some((verb, rest)) = words.split_first() else {
            return Ok(Input::Blank);
        };

        let input = match verb.to_ascii_lowercase().as_str() {
            "next" => Input::Next(row(rest)?),
            "approve" => Input::Set(row(rest)?, ApplicationStatus::Approved),
            "reject" => Input::Set(row(rest)?, ApplicationStatus::Rejected),
            "shortlist" => Input::Set(row(rest)?, ApplicationStatus::Shortlisted),
            "delete" => Input::Delete(row(rest)?),
            "show" => Input::Show(row(rest)?),
            "filter" => {
                let word = rest.first().map(String::as_str).unwrap_or("all");
                Input::Filter(
                    KindFilter::parse(word)
                        .ok_or_else(|| Error::Usage(format!("unknown filter `{word}`")))?,
                )
            }
            "add" => Input::Add(draft(rest)?),
            "logout" => Input::Logout,
            "quit" | "exit" => Input::Quit,
            "help" | "?" => Input::Help,
            other => return Err(Error::Usage(format!("unknown command `{other}`, try `help`"))),
        };
        Ok(input)
    }

    /// The view command for this input, looking row numbers up in `rows`.
    ///
    /// Deletes come back unconfirmed.
    pub fn into_command(self, rows: &Rows) -> Result<Option<Command>, Error> {
        let command = match self {
            Input::Next(n) => Command::AdvanceStatus { key: lookup(rows, n)? },
            Input::Set(n, status) => Command::SetStatus {
                key: lookup(rows, n)?,
                status,
            },
            Input::Delete(n) => Command::Delete {
                key: lookup(rows, n)?,
                confirmed: false,
            },
            Input::Show(n) => Command::Inspect(lookup(rows, n)?),
            Input::Filter(filter) => Command::SetFilter(filter),
            Input::Add(draft) => Command::Create(draft),
            Input::Logout => Command::SignOut,
            Input::Quit | Input::Help | Input::Blank => return Ok(None),
        };
        Ok(Some(command))
    }
}

fn lookup(rows: &Rows, n: usize) -> Result<RecordKey, Error> {
    let rows = rows.lock().map_err(|_| Error::NoSuchRow(n))?;
    n.checked_sub(1)
        .and_then(|i| rows.get(i).cloned())
        .ok_or(Error::NoSuchRow(n))
}

fn row(rest: &[String]) -> Result<usize, Error> {
    rest.first()
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| Error::Usage("expected a row number".to_string()))
}

fn draft(rest: &[String]) -> Result<Draft, Error> {
    let Some((kind, pairs)) = rest.split_first() else {
        return Err(Error::Usage("add what? job, blog, testimonial or notification".to_string()));
    };

    let mut values = HashMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::Usage(format!("expected key=value, got `{pair}`")))?;
        values.insert(key.to_ascii_lowercase(), value.to_string());
    }
    let mut take = |key: &str| -> Result<String, Error> {
        values
            .remove(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Usage(format!("`{key}` is required")))
    };

    let draft = match kind.to_ascii_lowercase().as_str() {
        "job" => Draft::Job(JobDraft {
            title: take("title")?,
            location: take("location")?,
            salary: take("salary")?,
        }),
        "blog" => Draft::Blog(BlogDraft {
            title: take("title")?,
            date: take("date")?,
            content: take("content")?,
        }),
        "testimonial" => Draft::Testimonial(TestimonialDraft {
            name: take("name")?,
            role: take("role")?,
            text: take("text")?,
            rating: take("rating")?
                .parse()
                .map_err(|_| Error::Usage("rating must be a number from 1 to 5".to_string()))?,
        }),
        "notification" => Draft::Notification(NotificationDraft {
            title: take("title")?,
            message: take("message")?,
            category: take("type")?,
        }),
        other => return Err(Error::Usage(format!("cannot add `{other}`"))),
    };
    Ok(draft)
}

/// Splits on whitespace, keeping double-quoted runs together.
fn split(line: &str) -> Result<Vec<String>, Error> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut quoted = false;
    let mut started = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    words.push(std::mem::take(&mut word));
                    started = false;
                }
            }
            c => {
                word.push(c);
                started = true;
            }
        }
    }
    if quoted {
        return Err(Error::Usage("unterminated quote".to_string()));
    }
    if started {
        words.push(word);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use riziq_types::{Kind, Origin};

    #[test]
    fn status_commands() {
        assert_eq!(Input::parse("next 2").unwrap(), Input::Next(2));
        assert_eq!(
            Input::parse("  Approve 1 ").unwrap(),
            Input::Set(1, ApplicationStatus::Approved)
        );
        assert!(Input::parse("reject").is_err());
        assert_eq!(Input::parse("").unwrap(), Input::Blank);
    }

    #[test]
    fn quoted_values_keep_spaces() {
        let input = Input::parse(r#"add job title="Head Chef" location=Doha salary="3000 QAR""#).unwrap();
        assert_eq!(
            input,
            Input::Add(Draft::Job(JobDraft {
                title: "Head Chef".into(),
                location: "Doha".into(),
                salary: "3000 QAR".into(),
            }))
        );
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = Input::parse("add notification title=Hi message=Welcome").unwrap_err();
        assert_eq!(err.to_string(), "`type` is required");
        assert!(Input::parse(r#"add blog title="open"#).is_err());
    }

    #[test]
    fn filter_words() {
        assert_eq!(
            Input::parse("filter contact").unwrap(),
            Input::Filter(KindFilter::only(Kind::ContactMessage))
        );
        assert_eq!(Input::parse("filter").unwrap(), Input::Filter(KindFilter::All));
        assert!(Input::parse("filter spam").is_err());
    }

    #[test]
    fn rows_are_numbered_from_one() {
        let key = RecordKey::new(Kind::BlogPost, Origin::Local, "17");
        let rows: Rows = Arc::new(Mutex::new(vec![key.clone()]));

        let command = Input::Delete(1).into_command(&rows).unwrap();
        assert!(matches!(
            command,
            Some(Command::Delete { key: k, confirmed: false }) if k == key
        ));
        assert!(matches!(
            Input::Show(0).into_command(&rows),
            Err(Error::NoSuchRow(0))
        ));
        assert!(matches!(
            Input::Next(2).into_command(&rows),
            Err(Error::NoSuchRow(2))
        ));
        assert!(Input::Quit.into_command(&rows).unwrap().is_none());
    }
}
