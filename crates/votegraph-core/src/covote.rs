//! Pairwise co-voting: how often the focal actor chose the same option as
//! every other actor.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::dates::round1;
use crate::model::{CompareEvent, SideVote, VoteEvent, join_name};
use crate::normalize::keyify;
use crate::vote::is_valid_name;

/// Rendered in place of a percentage when no events were considered.
pub const NO_DATA: &str = "—";

/// Agreement count between two actors across the supplied events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairwiseRow {
    pub a_name: String,
    pub b_name: String,
    pub sum_flag: u32,
}

impl PairwiseRow {
    fn swapped(&self) -> Self {
        Self {
            a_name: self.b_name.clone(),
            b_name: self.a_name.clone(),
            sum_flag: self.sum_flag,
        }
    }
}

/// Sorted pairwise rows plus the event count percentages are relative to.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PairwiseTable {
    /// `sum_flag` descending, then `a_name`, then `b_name` ascending.
    pub rows: Vec<PairwiseRow>,
    pub total_events: usize,
}

impl PairwiseTable {
    /// `sum_flag / total_events * 100` to one decimal, `None` without events.
    pub fn percent(&self, row: &PairwiseRow) -> Option<f64> {
        percent_of(row.sum_flag, self.total_events)
    }

    /// Rows with `name` on the A side. When `name` only appears on the B side
    /// the matching rows are returned with A and B swapped. Names match after
    /// [`keyify`], like [`split_for_focal`].
    pub fn focus(&self, name: &str) -> Vec<PairwiseRow> {
        let key = keyify(name);
        let as_a: Vec<PairwiseRow> = self
            .rows
            .iter()
            .filter(|r| keyify(&r.a_name) == key)
            .cloned()
            .collect();
        if !as_a.is_empty() {
            return as_a;
        }
        self.rows
            .iter()
            .filter(|r| keyify(&r.b_name) == key)
            .map(PairwiseRow::swapped)
            .collect()
    }

    /// Top allies among `rows` (normally from [`Self::focus`]).
    pub fn top_allies(&self, rows: &[PairwiseRow], limit: usize) -> Vec<Ally> {
        top_allies(rows, self.total_events, limit)
    }
}

pub fn percent_of(sum_flag: u32, total_events: usize) -> Option<f64> {
    if total_events == 0 {
        return None;
    }
    Some(round1(sum_flag as f64 / total_events as f64 * 100.0))
}

/// `"50.0%"`, or [`NO_DATA`].
pub fn format_percent(percent: Option<f64>) -> String {
    match percent {
        Some(p) => format!("{p:.1}%"),
        None => NO_DATA.to_string(),
    }
}

/// Build the pairwise agreement table.
///
/// Every event contributes one row per (focal, other) pair; the flag is 1 when
/// both chose the same non-empty option. Events without a focal vote, and
/// voters with invalid names, contribute no rows but still count towards
/// `total_events`.
pub fn aggregate(events: &[CompareEvent]) -> PairwiseTable {
    let mut sums: HashMap<(&str, &str), u32> = HashMap::new();

    for ev in events {
        let Some(a) = ev.focal.as_ref().filter(|a| is_valid_name(&a.name)) else {
            continue;
        };
        for b in ev.others.iter().filter(|b| is_valid_name(&b.name)) {
            let flag = u32::from(!a.option.is_empty() && a.option == b.option);
            *sums.entry((a.name.as_str(), b.name.as_str())).or_insert(0) += flag;
        }
    }

    let mut rows: Vec<PairwiseRow> = sums
        .into_iter()
        .map(|((a, b), sum_flag)| PairwiseRow {
            a_name: a.to_string(),
            b_name: b.to_string(),
            sum_flag,
        })
        .collect();
    rows.sort_by(|x, y| {
        y.sum_flag
            .cmp(&x.sum_flag)
            .then_with(|| x.a_name.cmp(&y.a_name))
            .then_with(|| x.b_name.cmp(&y.b_name))
    });

    info!(events = events.len(), pairs = rows.len(), "aggregated co-voting pairs");
    PairwiseTable {
        rows,
        total_events: events.len(),
    }
}

/// One entry of a focal actor's top-allies list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ally {
    pub name: String,
    pub sum_flag: u32,
    pub percent: Option<f64>,
    pub percent_label: String,
}

/// Deduplicate by B name (first row wins), drop blank names, sort by percent
/// descending (stable) and keep the first `limit`.
pub fn top_allies(rows: &[PairwiseRow], total_events: usize, limit: usize) -> Vec<Ally> {
    let mut seen: Vec<&str> = Vec::new();
    let mut allies: Vec<Ally> = Vec::new();
    for row in rows {
        let name = row.b_name.trim();
        if name.is_empty() || seen.contains(&name) {
            continue;
        }
        seen.push(name);
        let percent = percent_of(row.sum_flag, total_events);
        allies.push(Ally {
            name: row.b_name.clone(),
            sum_flag: row.sum_flag,
            percent,
            percent_label: format_percent(percent),
        });
    }
    allies.sort_by(|a, b| b.percent.unwrap_or(0.0).total_cmp(&a.percent.unwrap_or(0.0)));
    allies.truncate(limit);
    allies
}

/// Split raw vote events into focal/other sides for `focal`.
///
/// Keeps only events where the focal actor voted, in input order. The focal
/// side is the focal actor's first row; every row by someone else goes to the
/// other side. Names match after [`keyify`] and are stored with whitespace
/// collapsed. Raw vote rows carry no portraits, so every `image` is empty and
/// an [`ImageIndex`] built from the result is empty too.
pub fn split_for_focal(events: &[VoteEvent], focal: &str) -> Vec<CompareEvent> {
    let key = keyify(focal);
    events
        .iter()
        .filter_map(|ev| {
            let mut focal_vote = None;
            let mut others = Vec::new();
            for v in &ev.votes {
                let side = SideVote {
                    name: join_name(&v.voter_name, ""),
                    option: v.option.clone(),
                    party: v.voter_party.clone(),
                    image: String::new(),
                };
                if keyify(&v.voter_name) == key {
                    focal_vote.get_or_insert(side);
                } else {
                    others.push(side);
                }
            }
            focal_vote.map(|focal| CompareEvent {
                id: ev.id.clone(),
                title: ev.title.clone(),
                start_date: ev.start_date,
                focal: Some(focal),
                others,
            })
        })
        .collect()
}

/// First non-empty image URL per trimmed actor name, across both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageIndex {
    images: HashMap<String, String>,
}

impl ImageIndex {
    pub fn build(events: &[CompareEvent]) -> Self {
        let mut images: HashMap<String, String> = HashMap::new();
        for ev in events {
            for side in ev.focal.iter().chain(ev.others.iter()) {
                let name = side.name.trim();
                let image = side.image.trim();
                if !name.is_empty() && !image.is_empty() && !images.contains_key(name) {
                    images.insert(name.to_string(), image.to_string());
                }
            }
        }
        Self { images }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.images.get(name.trim()).map(String::as_str)
    }
}
