//! Party-affiliation timelines, current party and tenure from membership records.
//!
//! Only organisations classified as political parties produce intervals.
//! Overlapping intervals are kept as-is: tenure sums them independently, so
//! overlapping memberships in the same party are counted twice.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{diff_year_month, round1};
use crate::model::{Membership, Person, join_name};
use crate::normalize::keyify;

/// One party affiliation, from a membership's dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipInterval {
    pub party_th: String,
    pub party_en: String,
    pub start: Option<NaiveDate>,
    /// `None` when the membership is ongoing.
    pub end: Option<NaiveDate>,
}

impl MembershipInterval {
    /// Thai name, falling back to the English name.
    pub fn label(&self) -> &str {
        if self.party_th.is_empty() {
            &self.party_en
        } else {
            &self.party_th
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

/// Party intervals of `person`, sorted by start (missing starts first, stable).
pub fn timeline(person: &Person) -> Vec<MembershipInterval> {
    let mut out: Vec<MembershipInterval> = person
        .memberships
        .iter()
        .flat_map(|m| {
            m.posts
                .iter()
                .flat_map(|post| post.organizations.iter())
                .filter(|o| o.is_party())
                .map(move |o| MembershipInterval {
                    party_th: o.name.clone(),
                    party_en: o.name_en.clone(),
                    start: m.start_date,
                    end: m.end_date,
                })
        })
        .collect();
    out.sort_by_key(|i| i.start);
    out
}

/// Party of the last open interval, else of the chronologically last interval.
/// Empty when the person has no party intervals.
pub fn current_party(person: &Person) -> String {
    let tl = timeline(person);
    tl.iter()
        .rev()
        .find(|i| i.is_open())
        .or_else(|| tl.last())
        .map(|i| i.label().to_string())
        .unwrap_or_default()
}

/// Every distinct party label the person has held, first-seen order.
pub fn all_parties(person: &Person) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for o in person
        .memberships
        .iter()
        .flat_map(|m| m.posts.iter())
        .flat_map(|p| p.organizations.iter())
        .filter(|o| o.is_party())
    {
        let label = if o.name.is_empty() { &o.name_en } else { &o.name };
        let label = label.trim().to_string();
        if !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

/// Years spent in `party` (Thai or English name), to one decimal.
///
/// Each membership with a start date contributes `end - start` (or
/// `today - start` when open) in whole months, once per post listing the
/// party. Memberships without a start date contribute nothing.
pub fn tenure_years(person: &Person, party: &str, today: NaiveDate) -> f64 {
    let target = party.trim();
    if target.is_empty() {
        return 0.0;
    }
    let mut total_months = 0i64;
    for m in &person.memberships {
        let Some(start) = m.start_date else {
            continue;
        };
        let end = m.end_date.unwrap_or(today);
        for post in &m.posts {
            let holds_party = post.organizations.iter().any(|o| {
                o.is_party() && (o.name.trim() == target || o.name_en.trim() == target)
            });
            if holds_party {
                total_months += i64::from(diff_year_month(start, end).total_months());
            }
        }
    }
    round1(total_months as f64 / 12.0)
}

/// `"1 ปี 5 เดือน"`. Zero years are omitted; months are shown when non-zero or
/// when nothing else would be.
pub fn format_duration(years: i32, months: i32) -> String {
    let mut parts = Vec::new();
    if years > 0 {
        parts.push(format!("{years} ปี"));
    }
    if months > 0 || parts.is_empty() {
        parts.push(format!("{months} เดือน"));
    }
    parts.join(" ")
}

// ── Profiles ──

/// Display-ready view of one person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub firstname: String,
    pub lastname: String,
    pub image: String,
    pub parties: Vec<String>,
    pub province: String,
    pub latest_role: String,
    pub current_party: String,
    pub current_membership_id: String,
    pub current_membership_name: String,
    pub timeline: Vec<MembershipInterval>,
    #[serde(skip)]
    pub person: Person,
}

impl ProfileSummary {
    pub fn from_person(person: &Person) -> Self {
        let latest = latest_membership(&person.memberships);
        let current = current_membership(&person.memberships);
        Self {
            name: person.display_name(),
            firstname: person.firstname.clone(),
            lastname: person.lastname.clone(),
            image: person.image.clone(),
            parties: all_parties(person),
            province: latest.map(|m| m.province.clone()).unwrap_or_default(),
            latest_role: latest
                .and_then(|m| m.posts.first())
                .map(|p| if p.role.is_empty() { p.label.clone() } else { p.role.clone() })
                .unwrap_or_default(),
            current_party: current_party(person),
            current_membership_id: current.map(|m| m.id.clone()).unwrap_or_default(),
            current_membership_name: current
                .and_then(|m| {
                    m.posts
                        .iter()
                        .flat_map(|p| p.organizations.iter())
                        .find(|o| !o.name.is_empty())
                })
                .map(|o| o.name.clone())
                .unwrap_or_default(),
            timeline: timeline(person),
            person: person.clone(),
        }
    }

    pub fn tenure_years(&self, party: &str, today: NaiveDate) -> f64 {
        tenure_years(&self.person, party, today)
    }
}

/// Membership with the latest end (open counts as latest), then latest start.
pub fn latest_membership(memberships: &[Membership]) -> Option<&Membership> {
    memberships
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| {
            let rank = |m: &Membership| (m.end_date.unwrap_or(NaiveDate::MAX), m.start_date.unwrap_or_default());
            // Reverse index so the earlier membership wins equal ranks.
            rank(a).cmp(&rank(b)).then(ib.cmp(ia))
        })
        .map(|(_, m)| m)
}

/// First open membership, otherwise [`latest_membership`].
pub fn current_membership(memberships: &[Membership]) -> Option<&Membership> {
    memberships
        .iter()
        .find(|m| m.end_date.is_none())
        .or_else(|| latest_membership(memberships))
}

/// Profiles looked up by [`keyify`]d display name or `firstname lastname`.
/// The first profile registered under a key keeps it.
#[derive(Debug, Clone, Default)]
pub struct ProfileIndex {
    profiles: Vec<ProfileSummary>,
    by_key: HashMap<String, usize>,
}

impl ProfileIndex {
    pub fn build(people: &[Person]) -> Self {
        let profiles: Vec<ProfileSummary> = people.iter().map(ProfileSummary::from_person).collect();
        let mut by_key = HashMap::new();
        for (i, p) in profiles.iter().enumerate() {
            for key in [keyify(&p.name), keyify(&join_name(&p.firstname, &p.lastname))] {
                if !key.is_empty() {
                    by_key.entry(key).or_insert(i);
                }
            }
        }
        Self { profiles, by_key }
    }

    pub fn get(&self, name: &str) -> Option<&ProfileSummary> {
        self.by_key.get(&keyify(name)).map(|&i| &self.profiles[i])
    }

    /// Current party of `name`, empty when unknown.
    pub fn current_party(&self, name: &str) -> &str {
        self.get(name).map(|p| p.current_party.as_str()).unwrap_or("")
    }

    pub fn profiles(&self) -> &[ProfileSummary] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
