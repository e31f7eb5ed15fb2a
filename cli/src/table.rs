//! Plain-text rendering of a view.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use riziq_console::{Notice, Record, RenderSink, View};
use riziq_types::RecordKey;

/// Keys of the printed rows, in order; row `n` is at index `n - 1`.
pub type Rows = Arc<Mutex<Vec<RecordKey>>>;

/// Prints the table and notices to a writer, stdout by default.
pub struct TableSink<W: Write = io::Stdout> {
    out: W,
    rows: Rows,
}

impl TableSink {
    pub fn stdout(rows: Rows) -> Self {
        Self::new(io::stdout(), rows)
    }
}

impl<W: Write> TableSink<W> {
    pub fn new(out: W, rows: Rows) -> Self {
        Self { out, rows }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_table(&mut self, view: &View) -> io::Result<()> {
        match view {
            View::Empty(state) => writeln!(self.out, "  {}", state.message())?,
            View::Rows(records) => {
                writeln!(
                    self.out,
                    "{:>3}  {:<12} {:<24} {:<28} {:<28} {:<12} {}",
                    "#", "type", "name", "contact", "details", "status", "date"
                )?;
                for (i, record) in records.iter().enumerate() {
                    writeln!(
                        self.out,
                        "{:>3}  {:<12} {:<24} {:<28} {:<28} {:<12} {}",
                        i + 1,
                        record.kind().label(),
                        clip(&record.display_name, 24),
                        clip(&record.contact_line(), 28),
                        clip(&record.summary(), 28),
                        record.status.label(),
                        record.date_label(),
                    )?;
                }
            }
        }
        self.out.flush()
    }
}

impl<W: Write> RenderSink for TableSink<W> {
    fn render(&mut self, view: &View) {
        if let Ok(mut rows) = self.rows.lock() {
            *rows = view.rows().iter().map(Record::key).collect();
        }
        let _ = self.write_table(view);
    }

    fn notify(&mut self, notice: Notice) {
        let tag = match notice {
            Notice::Info(_) => "info",
            Notice::Error(_) => "error",
        };
        let _ = writeln!(self.out, "[{tag}] {}", notice.message());
        let _ = self.out.flush();
    }

    fn detail(&mut self, record: &Record) {
        let text = serde_json::to_string_pretty(record).unwrap_or_else(|e| e.to_string());
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        clipped.push('\u{2026}');
        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riziq_console::EmptyState;
    use riziq_types::{
        ApplicationPayload, ApplicationStatus, Kind, Origin, Payload, Status,
    };

    fn application(id: &str, name: &str) -> Record {
        Record {
            id: id.to_string(),
            display_name: name.to_string(),
            timestamp: None,
            status: Status::Application(Some(ApplicationStatus::Shortlisted)),
            origin: Origin::Remote,
            payload: Payload::Application(ApplicationPayload {
                email: Some("amina@example.com".into()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn render_numbers_rows_and_remembers_keys() {
        let rows: Rows = Arc::default();
        let mut sink = TableSink::new(Vec::new(), rows.clone());

        sink.render(&View::Rows(vec![application("a1", "Amina"), application("a2", "Bilal")]));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("  1  Application"));
        assert!(lines[1].contains("Shortlisted"));
        assert!(lines[2].contains("Bilal"));
        assert_eq!(
            rows.lock().unwrap()[1],
            RecordKey::new(Kind::Application, Origin::Remote, "a2")
        );
    }

    #[test]
    fn empty_views_clear_the_row_map() {
        let rows: Rows = Arc::new(Mutex::new(vec![RecordKey::new(
            Kind::Testimonial,
            Origin::Local,
            "1",
        )]));
        let mut sink = TableSink::new(Vec::new(), rows.clone());

        sink.render(&View::Empty(EmptyState::Filtered));
        sink.notify(Notice::error("Action failed"));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.contains("No items found for this filter."));
        assert!(out.contains("[error] Action failed"));
        assert!(rows.lock().unwrap().is_empty());
    }

    #[test]
    fn long_text_is_clipped() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghij", 5).chars().count(), 5);
    }
}
