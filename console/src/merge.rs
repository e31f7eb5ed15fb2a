//! Merge, sort and filter of normalized records.

use std::cmp::Ordering;

use riziq_types::{Kind, Record};

/// Which kinds a view currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Only(Vec<Kind>),
}

impl KindFilter {
    pub fn only(kind: Kind) -> Self {
        KindFilter::Only(vec![kind])
    }

    pub fn matches(&self, kind: Kind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Only(kinds) => kinds.contains(&kind),
        }
    }

    /// Parses `all` or a kind word such as `application`.
    pub fn parse(word: &str) -> Option<Self> {
        if word.trim().eq_ignore_ascii_case("all") {
            Some(KindFilter::All)
        } else {
            Kind::parse(word).map(KindFilter::only)
        }
    }
}

/// Why a view has nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The sources hold no records at all.
    NoData,
    /// Records exist but the filter excludes all of them.
    Filtered,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NoData => "No items yet",
            EmptyState::Filtered => "No items found for this filter.",
        }
    }
}

/// What the render sink receives.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Rows(Vec<Record>),
    Empty(EmptyState),
}

impl View {
    pub fn rows(&self) -> &[Record] {
        match self {
            View::Rows(rows) => rows,
            View::Empty(_) => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

/// Concatenates the sources, sorts newest first and applies the filter.
///
/// The sort is stable: records with equal (or equally missing) timestamps
/// keep their input order. Records without a timestamp go last.
pub fn merge<'a, I>(sources: I, filter: &KindFilter) -> View
where
    I: IntoIterator<Item = &'a [Record]>,
{
    let mut rows: Vec<Record> = sources.into_iter().flatten().cloned().collect();
    if rows.is_empty() {
        return View::Empty(EmptyState::NoData);
    }

    rows.sort_by(newest_first);
    rows.retain(|record| filter.matches(record.kind()));

    if rows.is_empty() {
        View::Empty(EmptyState::Filtered)
    } else {
        View::Rows(rows)
    }
}

fn newest_first(a: &Record, b: &Record) -> Ordering {
    match (a.timestamp, b.timestamp) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use riziq_types::{ContactPayload, ContactStatus, Origin, Payload, Status};

    fn ts(secs: i64) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(secs, 0)
    }

    fn record(id: &str, kind: Kind, timestamp: Option<DateTime<Utc>>) -> Record {
        let payload = match kind {
            Kind::ContactMessage => Payload::ContactMessage(ContactPayload::default()),
            _ => Payload::Application(Default::default()),
        };
        Record {
            id: id.to_string(),
            display_name: id.to_string(),
            timestamp,
            status: Status::Contact(ContactStatus::Unread),
            origin: Origin::Local,
            payload,
        }
    }

    fn ids(view: &View) -> Vec<&str> {
        view.rows().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn newest_first_across_sources() {
        let apps = vec![
            record("a1", Kind::Application, ts(100)),
            record("a2", Kind::Application, ts(300)),
        ];
        let msgs = vec![record("m1", Kind::ContactMessage, ts(200))];

        let view = merge([apps.as_slice(), msgs.as_slice()], &KindFilter::All);
        assert_eq!(ids(&view), ["a2", "m1", "a1"]);
    }

    #[test]
    fn ties_keep_input_order_and_missing_timestamps_sink() {
        let first = vec![
            record("undated-1", Kind::Application, None),
            record("t-a", Kind::Application, ts(50)),
        ];
        let second = vec![
            record("t-b", Kind::ContactMessage, ts(50)),
            record("undated-2", Kind::ContactMessage, None),
            record("t-c", Kind::ContactMessage, ts(50)),
        ];

        let view = merge([first.as_slice(), second.as_slice()], &KindFilter::All);
        assert_eq!(ids(&view), ["t-a", "t-b", "t-c", "undated-1", "undated-2"]);
    }

    #[test]
    fn output_is_non_increasing_for_shuffled_inputs() {
        let stamps = [5, 1, 9, 3, 9, 7, 0, 3, 8, 2];
        for rotation in 0..stamps.len() {
            let mut rotated = stamps.to_vec();
            rotated.rotate_left(rotation);
            let records: Vec<Record> = rotated
                .iter()
                .enumerate()
                .map(|(i, secs)| record(&format!("r{i}"), Kind::Application, ts(*secs)))
                .collect();

            let view = merge([records.as_slice()], &KindFilter::All);
            assert_eq!(view.len(), stamps.len());
            for pair in view.rows().windows(2) {
                assert!(pair[0].timestamp >= pair[1].timestamp);
                if pair[0].timestamp == pair[1].timestamp {
                    let pos = |r: &Record| records.iter().position(|x| x.id == r.id);
                    assert!(pos(&pair[0]) < pos(&pair[1]));
                }
            }
        }
    }

    #[test]
    fn merge_is_idempotent() {
        let apps = vec![
            record("a", Kind::Application, ts(2)),
            record("b", Kind::Application, None),
            record("c", Kind::Application, ts(2)),
        ];
        let filter = KindFilter::All;
        let once = merge([apps.as_slice()], &filter);
        let twice = merge([apps.as_slice()], &filter);
        assert_eq!(once, twice);

        let again = merge([once.rows()], &filter);
        assert_eq!(once, again);
    }

    #[test]
    fn filter_keeps_matching_kind() {
        let apps = vec![record("a", Kind::Application, ts(1))];
        let msgs = vec![record("m", Kind::ContactMessage, ts(2))];

        let view = merge(
            [apps.as_slice(), msgs.as_slice()],
            &KindFilter::only(Kind::ContactMessage),
        );
        assert_eq!(ids(&view), ["m"]);
    }

    #[test]
    fn empty_states_are_distinguished() {
        let none: Vec<Record> = Vec::new();
        assert_eq!(
            merge([none.as_slice()], &KindFilter::All),
            View::Empty(EmptyState::NoData)
        );

        let apps = vec![record("a", Kind::Application, ts(1))];
        assert_eq!(
            merge([apps.as_slice()], &KindFilter::only(Kind::ContactMessage)),
            View::Empty(EmptyState::Filtered)
        );
    }

    #[test]
    fn parses_filter_words() {
        assert_eq!(KindFilter::parse("ALL"), Some(KindFilter::All));
        assert_eq!(
            KindFilter::parse("contact"),
            Some(KindFilter::only(Kind::ContactMessage))
        );
        assert_eq!(KindFilter::parse("bogus"), None);
    }
}
