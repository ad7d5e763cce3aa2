//! Same-party peer comparison: agreement percentages banded by mean ± sd.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::covote::{PairwiseRow, percent_of};
use crate::timeline::ProfileIndex;

/// Mean and population standard deviation of a set of percentages, with the
/// `[mean - sd, mean + sd]` band clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeerBand {
    pub mean: f64,
    pub sd: f64,
    pub lower: f64,
    pub upper: f64,
}

impl PeerBand {
    /// All zeros for an empty slice: that means "no peers", not an error.
    pub fn band(percentages: &[f64]) -> Self {
        if percentages.is_empty() {
            return Self::default();
        }
        let n = percentages.len() as f64;
        let mean = percentages.iter().sum::<f64>() / n;
        let variance = percentages.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        let sd = variance.sqrt();
        Self {
            mean,
            sd,
            lower: (mean - sd).max(0.0),
            upper: (mean + sd).min(100.0),
        }
    }

    pub fn contains(&self, percent: f64) -> bool {
        percent >= self.lower && percent <= self.upper
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peer {
    pub name: String,
    /// Agreement with the focal actor, 0 when there were no events.
    pub percent: f64,
    pub image: String,
    /// Tenure in the shared party.
    pub years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerReport {
    pub selected: String,
    pub party: String,
    /// Percent descending; equal percents keep row order.
    pub peers: Vec<Peer>,
    pub band: PeerBand,
    pub max_years: f64,
}

impl PeerReport {
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Compare `selected` against the B-side actors of `rows` who share its
/// current party.
///
/// `rows` are the focal actor's pairwise rows (see
/// [`PairwiseTable::focus`](crate::PairwiseTable::focus)) and `total_events`
/// the count their percentages are relative to. Returns `None` when the
/// selected actor has no known current party.
pub fn peer_report(
    selected: &str,
    rows: &[PairwiseRow],
    total_events: usize,
    profiles: &ProfileIndex,
    today: NaiveDate,
) -> Option<PeerReport> {
    let party = profiles.current_party(selected).trim().to_string();
    if party.is_empty() {
        debug!(selected, "no current party for peer report");
        return None;
    }

    let mut seen = HashSet::new();
    let mut peers: Vec<Peer> = Vec::new();
    for row in rows {
        let name = row.b_name.trim();
        if name.is_empty() || profiles.current_party(name).trim() != party {
            continue;
        }
        if !seen.insert(row.b_name.clone()) {
            continue;
        }
        let profile = profiles.get(name);
        peers.push(Peer {
            name: row.b_name.clone(),
            percent: percent_of(row.sum_flag, total_events).unwrap_or(0.0),
            image: profile.map(|p| p.image.clone()).unwrap_or_default(),
            years: profile.map(|p| p.tenure_years(&party, today)).unwrap_or(0.0),
        });
    }
    peers.sort_by(|a, b| b.percent.total_cmp(&a.percent));

    let percents: Vec<f64> = peers.iter().map(|p| p.percent).collect();
    let band = PeerBand::band(&percents);
    let max_years = peers.iter().map(|p| p.years).fold(0.0, f64::max);
    debug!(selected, party = %party, peers = peers.len(), "built peer report");

    Some(PeerReport {
        selected: selected.to_string(),
        party,
        peers,
        band,
        max_years,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Membership, Organization, Person, Post};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn band_of_three() {
        let b = PeerBand::band(&[10.0, 20.0, 30.0]);
        assert!(approx(b.mean, 20.0));
        assert!(approx(b.sd, 8.165));
        assert!(approx(b.lower, 11.835));
        assert!(approx(b.upper, 28.165));
        assert!(b.contains(20.0));
        assert!(!b.contains(30.0));
    }

    #[test]
    fn band_is_clamped() {
        let b = PeerBand::band(&[0.0, 100.0]);
        assert!(approx(b.mean, 50.0));
        assert!(approx(b.sd, 50.0));
        assert_eq!(b.lower, 0.0);
        assert_eq!(b.upper, 100.0);

        let b = PeerBand::band(&[0.0, 0.0, 90.0]);
        assert_eq!(b.lower, 0.0);
    }

    #[test]
    fn empty_band_is_zero() {
        assert_eq!(PeerBand::band(&[]), PeerBand::default());
    }

    #[test]
    fn single_value_has_zero_sd() {
        let b = PeerBand::band(&[42.0]);
        assert_eq!(b.sd, 0.0);
        assert_eq!((b.lower, b.upper), (42.0, 42.0));
    }

    fn member(first: &str, last: &str, party: &str, start: NaiveDate) -> Person {
        Person {
            firstname: first.into(),
            lastname: last.into(),
            image: format!("{first}.png"),
            memberships: vec![Membership {
                start_date: Some(start),
                posts: vec![Post {
                    organizations: vec![Organization {
                        name: party.into(),
                        classification: "POLITICAL_PARTY".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn row(a: &str, b: &str, sum_flag: u32) -> PairwiseRow {
        PairwiseRow {
            a_name: a.into(),
            b_name: b.into(),
            sum_flag,
        }
    }

    fn index() -> ProfileIndex {
        ProfileIndex::build(&[
            member("สมชาย", "ใจดี", "พรรคก", d(2020, 1, 1)),
            member("สมหญิง", "รักดี", "พรรคก", d(2022, 1, 1)),
            member("สมศรี", "มีสุข", "พรรคก", d(2023, 7, 1)),
            member("สมปอง", "ดีมาก", "พรรคข", d(2019, 1, 1)),
        ])
    }

    #[test]
    fn report_for_same_party_peers() {
        let rows = vec![
            row("ผู้นำ", "สมหญิง รักดี", 1),
            row("ผู้นำ", "สมศรี มีสุข", 3),
            row("ผู้นำ", "สมปอง ดีมาก", 4),
            row("ผู้นำ", "สมหญิง รักดี", 2),
            row("ผู้นำ", "", 4),
        ];
        let report = peer_report("สมชาย ใจดี", &rows, 4, &index(), d(2024, 1, 1)).unwrap();
        assert_eq!(report.party, "พรรคก");
        let names: Vec<&str> = report.peers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["สมศรี มีสุข", "สมหญิง รักดี"]);
        assert_eq!(report.peers[0].percent, 75.0);
        assert_eq!(report.peers[1].percent, 25.0);
        assert_eq!(report.peers[0].image, "สมศรี.png");
        assert_eq!(report.peers[0].years, 0.5);
        assert_eq!(report.max_years, 2.0);
        assert!(approx(report.band.mean, 50.0));
        assert!(approx(report.band.sd, 25.0));
    }

    #[test]
    fn unknown_party_gives_none() {
        assert!(peer_report("ไม่มี ใคร", &[], 0, &index(), d(2024, 1, 1)).is_none());
    }

    #[test]
    fn no_peers_gives_zero_band() {
        let rows = vec![row("ผู้นำ", "สมปอง ดีมาก", 1)];
        let report = peer_report("สมชาย ใจดี", &rows, 1, &index(), d(2024, 1, 1)).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.band, PeerBand::default());
        assert_eq!(report.max_years, 0.0);
    }
}
