//! Fuzzy join of enacted-law records to roll-call vote events.
//!
//! Each vote event is scored against every law: normalised-title Jaro-Winkler
//! plus a small bonus when the dates are close. The event goes to the single
//! best law if that score clears the threshold.
//!
//! # Assignment policy
//!
//! - Greedy and event-local: events are visited in input order and each picks
//!   its own best law. There is no global bipartite optimisation, so a law
//!   with a near-duplicate title earlier in the list can take events from a
//!   better-suited later one.
//! - Ties keep the first law seen (strictly-greater comparison).
//! - An event lands in at most one bucket.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{LinkerConfig, PipelineConfig, SimilarityConfig};
use crate::dates::within_days;
use crate::model::{LawRecord, VoteEvent};
use crate::normalize::{normalize_party, normalize_title};
use crate::similarity::similarity_with;

/// Counts describing one linking run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub laws_in: usize,
    pub laws_kept: usize,
    pub untitled_dropped: usize,
    pub duplicates_dropped: usize,
    pub events_in: usize,
    pub matched: usize,
    pub unmatched: usize,
}

/// Vote events assigned to one law title, in encounter order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LawBucket {
    pub title: String,
    pub events: Vec<VoteEvent>,
}

/// Result of [`RecordLinker::link`]: law title → matched vote events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkedMap {
    /// Deduplicated laws in input order.
    pub laws: Vec<LawRecord>,
    /// One bucket per distinct law title, in law order. Unmatched laws keep an
    /// empty bucket.
    pub buckets: Vec<LawBucket>,
    /// Every matched event in encounter order.
    pub matched: Vec<VoteEvent>,
    pub report: LinkReport,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LinkedMap {
    /// Events linked to the law with this title. Unknown titles yield `&[]`.
    pub fn events_for(&self, title: &str) -> &[VoteEvent] {
        self.index
            .get(title)
            .map(|&i| self.buckets[i].events.as_slice())
            .unwrap_or(&[])
    }

    /// Laws whose end date falls in `[from, to]`, newest first.
    ///
    /// Open bounds default to 1900-01-01 and 9999-12-31. A law without an end
    /// date is placed at 1970-01-01.
    pub fn laws_in_range(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Vec<&LawRecord> {
        let from = from.unwrap_or(ymd(1900, 1, 1));
        let to = to.unwrap_or(ymd(9999, 12, 31));
        let mut laws: Vec<&LawRecord> = self
            .laws
            .iter()
            .filter(|law| {
                let end = effective_end(law);
                end >= from && end <= to
            })
            .collect();
        laws.sort_by(|a, b| effective_end(b).cmp(&effective_end(a)));
        laws
    }

    /// Case-insensitive title substring search over [`Self::laws_in_range`].
    pub fn search(
        &self,
        query: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<&LawRecord> {
        let q = query.to_lowercase();
        self.laws_in_range(from, to)
            .into_iter()
            .filter(|law| law.title.to_lowercase().contains(&q))
            .collect()
    }

    /// Events for `title` with each event's votes narrowed by `filter`.
    pub fn filtered_events(&self, title: &str, filter: &VoteFilter) -> Vec<VoteEvent> {
        self.events_for(title)
            .iter()
            .map(|ev| filter.apply(ev))
            .collect()
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn effective_end(law: &LawRecord) -> NaiveDate {
    law.end_date.unwrap_or_default()
}

/// Narrows an event's vote rows to selected parties and voters. An empty
/// selection keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteFilter {
    /// Normalised party labels.
    pub parties: Vec<String>,
    pub voters: Vec<String>,
}

impl VoteFilter {
    pub fn is_empty(&self) -> bool {
        self.parties.is_empty() && self.voters.is_empty()
    }

    pub fn apply(&self, event: &VoteEvent) -> VoteEvent {
        let votes = event
            .votes
            .iter()
            .filter(|v| {
                let ok_party =
                    self.parties.is_empty() || self.parties.contains(&normalize_party(&v.voter_party));
                let ok_voter = self.voters.is_empty() || self.voters.contains(&v.voter_name);
                ok_party && ok_voter
            })
            .cloned()
            .collect();
        VoteEvent {
            votes,
            ..event.clone()
        }
    }
}

/// Drop untitled laws and later duplicates of `(normalised title, end date)`.
///
/// Kept titles are trimmed. Returns the kept laws plus the untitled and
/// duplicate counts.
pub fn dedupe_laws(laws: &[LawRecord]) -> (Vec<LawRecord>, usize, usize) {
    let mut seen: HashSet<(String, Option<NaiveDate>)> = HashSet::new();
    let mut kept = Vec::with_capacity(laws.len());
    let mut untitled = 0;
    let mut duplicates = 0;

    for law in laws {
        let title = law.title.trim();
        if title.is_empty() {
            untitled += 1;
            continue;
        }
        let key = (normalize_title(title), law.end_date);
        if !seen.insert(key) {
            duplicates += 1;
            continue;
        }
        kept.push(LawRecord {
            title: title.to_string(),
            ..law.clone()
        });
    }
    (kept, untitled, duplicates)
}

/// Scores vote events against law records and assigns each event to its best law.
#[derive(Debug, Clone, Default)]
pub struct RecordLinker {
    linker: LinkerConfig,
    similarity: SimilarityConfig,
}

impl RecordLinker {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            linker: config.linker.clone(),
            similarity: config.similarity.clone(),
        }
    }

    /// Composite score of one law against one event. Both titles must already
    /// be normalised.
    fn score(&self, law: &LawRecord, law_title: &str, event: &VoteEvent, event_title: &str) -> f64 {
        let sim = if law_title.is_empty() || event_title.is_empty() {
            0.0
        } else {
            similarity_with(law_title, event_title, &self.similarity)
        };
        let slack = self.linker.date_slack_days;
        if within_days(law.end_date, event.end_date, slack)
            || within_days(law.start_date, event.end_date, slack)
        {
            sim + self.linker.date_bonus
        } else {
            sim
        }
    }

    pub fn link(&self, laws: &[LawRecord], events: &[VoteEvent]) -> LinkedMap {
        let (laws, untitled, duplicates) = dedupe_laws(laws);
        let law_titles: Vec<String> = laws.iter().map(|l| normalize_title(&l.title)).collect();

        let mut buckets: Vec<LawBucket> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for law in &laws {
            index.entry(law.title.clone()).or_insert_with(|| {
                buckets.push(LawBucket {
                    title: law.title.clone(),
                    events: Vec::new(),
                });
                buckets.len() - 1
            });
        }

        let mut matched = Vec::new();
        for event in events {
            let event_title = normalize_title(&event.title);
            let mut best: Option<usize> = None;
            let mut best_score = 0.0;
            for (i, law) in laws.iter().enumerate() {
                let score = self.score(law, &law_titles[i], event, &event_title);
                if score > best_score {
                    best_score = score;
                    best = Some(i);
                }
            }

            match best {
                Some(i) if best_score >= self.linker.threshold => {
                    let bucket = index[&laws[i].title];
                    buckets[bucket].events.push(event.clone());
                    matched.push(event.clone());
                }
                _ => debug!(event_id = %event.id, best_score, "vote event left unmatched"),
            }
        }

        let report = LinkReport {
            laws_in: laws.len() + untitled + duplicates,
            laws_kept: laws.len(),
            untitled_dropped: untitled,
            duplicates_dropped: duplicates,
            events_in: events.len(),
            matched: matched.len(),
            unmatched: events.len() - matched.len(),
        };
        info!(
            laws = report.laws_kept,
            events = report.events_in,
            matched = report.matched,
            "linked vote events to laws"
        );

        LinkedMap {
            laws,
            buckets,
            matched,
            report,
            index,
        }
    }
}

/// Link with the default configuration.
pub fn link(laws: &[LawRecord], events: &[VoteEvent]) -> LinkedMap {
    RecordLinker::default().link(laws, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VoteRow;

    fn d(y: i32, m: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, day)
    }

    fn law(title: &str, end: Option<NaiveDate>) -> LawRecord {
        LawRecord {
            title: title.into(),
            start_date: None,
            end_date: end,
        }
    }

    fn event(id: &str, title: &str, end: Option<NaiveDate>) -> VoteEvent {
        VoteEvent {
            id: id.into(),
            title: title.into(),
            start_date: None,
            end_date: end,
            votes: vec![],
        }
    }

    #[test]
    fn links_only_the_matching_event() {
        let laws = vec![law("พ.ร.บ. งบประมาณ", d(2024, 1, 20))];
        let events = vec![
            event("e1", "ร่างงบประมาณ", d(2024, 1, 15)),
            event("e2", "ญัตติอื่น", d(2023, 6, 1)),
        ];
        let map = link(&laws, &events);
        let linked = map.events_for("พ.ร.บ. งบประมาณ");
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, "e1");
        assert_eq!(map.report.matched, 1);
        assert_eq!(map.report.unmatched, 1);
    }

    #[test]
    fn empty_laws_leave_everything_unmatched() {
        let events = vec![event("e1", "ร่างงบประมาณ", None)];
        let map = link(&[], &events);
        assert!(map.buckets.is_empty());
        assert!(map.matched.is_empty());
        assert_eq!(map.report.unmatched, 1);
    }

    #[test]
    fn unmatched_law_keeps_empty_bucket() {
        let laws = vec![law("พ.ร.บ. ภาษีสรรพสามิต", None)];
        let events = vec![event("e1", "ญัตติอื่น", None)];
        let map = link(&laws, &events);
        assert_eq!(map.buckets.len(), 1);
        assert!(map.events_for("พ.ร.บ. ภาษีสรรพสามิต").is_empty());
    }

    #[test]
    fn date_bonus_lifts_a_borderline_title() {
        let linker = RecordLinker::default();
        let l = law("abcdefghij", d(2024, 1, 20));
        let lt = normalize_title(&l.title);
        let near = event("e1", "abcdefgxyz", d(2024, 1, 18));
        let far = event("e2", "abcdefgxyz", d(2020, 1, 1));
        let et = normalize_title(&near.title);
        let with_bonus = linker.score(&l, &lt, &near, &et);
        let without = linker.score(&l, &lt, &far, &et);
        assert!((with_bonus - without - 0.03).abs() < 1e-12);
    }

    #[test]
    fn start_date_also_earns_the_bonus() {
        let linker = RecordLinker::default();
        let l = LawRecord {
            title: "x".into(),
            start_date: d(2024, 3, 1),
            end_date: d(2025, 1, 1),
        };
        let e = event("e1", "y", d(2024, 3, 5));
        assert!((linker.score(&l, "x", &e, "y") - 0.03).abs() < 1e-12);
    }

    #[test]
    fn ties_go_to_the_first_law() {
        let laws = vec![
            law("พ.ร.บ. งบประมาณ", d(2024, 1, 1)),
            law("พระราชบัญญัติงบประมาณ", d(2024, 2, 1)),
        ];
        let events = vec![event("e1", "งบประมาณ", None)];
        let map = link(&laws, &events);
        assert_eq!(map.events_for("พ.ร.บ. งบประมาณ").len(), 1);
        assert!(map.events_for("พระราชบัญญัติงบประมาณ").is_empty());
    }

    #[test]
    fn each_event_lands_in_one_bucket() {
        let laws = vec![law("พ.ร.บ. งบประมาณ", None), law("พ.ร.บ. งบประมาณรายจ่าย", None)];
        let events = vec![
            event("e1", "งบประมาณ", None),
            event("e2", "งบประมาณรายจ่าย", None),
        ];
        let map = link(&laws, &events);
        let total: usize = map.buckets.iter().map(|b| b.events.len()).sum();
        assert_eq!(total, 2);
        assert_eq!(map.events_for("พ.ร.บ. งบประมาณ")[0].id, "e1");
        assert_eq!(map.events_for("พ.ร.บ. งบประมาณรายจ่าย")[0].id, "e2");
    }

    #[test]
    fn dedupes_by_normalised_title_and_end_date() {
        let laws = vec![
            law("พ.ร.บ. งบประมาณ", d(2024, 1, 1)),
            law("พระราชบัญญัติงบประมาณ", d(2024, 1, 1)),
            law("พ.ร.บ. งบประมาณ", d(2025, 1, 1)),
            law("   ", None),
        ];
        let (kept, untitled, duplicates) = dedupe_laws(&laws);
        assert_eq!(kept.len(), 2);
        assert_eq!(untitled, 1);
        assert_eq!(duplicates, 1);
        assert_eq!(kept[1].end_date, d(2025, 1, 1));
    }

    #[test]
    fn same_title_different_dates_share_a_bucket() {
        let laws = vec![
            law("พ.ร.บ. งบประมาณ", d(2024, 1, 1)),
            law("พ.ร.บ. งบประมาณ", d(2025, 1, 1)),
        ];
        let events = vec![event("e1", "งบประมาณ", d(2025, 1, 2))];
        let map = link(&laws, &events);
        assert_eq!(map.laws.len(), 2);
        assert_eq!(map.buckets.len(), 1);
        assert_eq!(map.events_for("พ.ร.บ. งบประมาณ").len(), 1);
    }

    #[test]
    fn relinking_is_deterministic() {
        let laws = vec![law("พ.ร.บ. งบประมาณ", d(2024, 1, 20))];
        let events = vec![
            event("e1", "ร่างงบประมาณ", d(2024, 1, 15)),
            event("e2", "งบประมาณ วาระที่ 3", None),
        ];
        let a = serde_json::to_string(&link(&laws, &events)).unwrap();
        let b = serde_json::to_string(&link(&laws, &events)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn range_filter_and_search() {
        let laws = vec![
            law("พ.ร.บ. งบประมาณ", d(2024, 1, 20)),
            law("พ.ร.บ. ภาษี", d(2023, 5, 1)),
            law("Budget Act", d(2024, 6, 1)),
            law("ไม่มีวันที่", None),
        ];
        let map = link(&laws, &[]);

        let in_2024: Vec<&str> = map
            .laws_in_range(d(2024, 1, 1), None)
            .iter()
            .map(|l| l.title.as_str())
            .collect();
        assert_eq!(in_2024, vec!["Budget Act", "พ.ร.บ. งบประมาณ"]);

        let all = map.laws_in_range(None, None);
        assert_eq!(all.len(), 4);
        assert_eq!(all[3].title, "ไม่มีวันที่");

        let hits = map.search("budget", None, None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Budget Act");
    }

    #[test]
    fn vote_filter_narrows_rows() {
        let ev = VoteEvent {
            votes: vec![
                VoteRow {
                    option: "เห็นด้วย".into(),
                    voter_name: "สมชาย ใจดี".into(),
                    voter_party: "พรรคก".into(),
                },
                VoteRow {
                    option: "ไม่เห็นด้วย".into(),
                    voter_name: "สมหญิง รักดี".into(),
                    voter_party: " พรรคข ".into(),
                },
            ],
            ..event("e1", "x", None)
        };
        let by_party = VoteFilter {
            parties: vec!["พรรคข".into()],
            voters: vec![],
        };
        assert_eq!(by_party.apply(&ev).votes.len(), 1);
        assert_eq!(by_party.apply(&ev).votes[0].voter_name, "สมหญิง รักดี");

        assert!(VoteFilter::default().is_empty());
        assert_eq!(VoteFilter::default().apply(&ev).votes.len(), 2);
    }
}
