//! Typed records produced by the ingestion boundary.
//!
//! Raw snapshots are loosely structured; [`crate::ingest`] validates them into
//! these types, so every field here is either guaranteed present or an explicit
//! `Option`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Organisation classification that marks a political party.
pub const PARTY_CLASSIFICATION: &str = "POLITICAL_PARTY";

/// An enacted-law event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawRecord {
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A roll-call vote event with its embedded vote rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEvent {
    pub id: String,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub votes: Vec<VoteRow>,
}

/// One voter's choice on a vote event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRow {
    /// Free-text choice label, e.g. "เห็นด้วย".
    pub option: String,
    pub voter_name: String,
    pub voter_party: String,
}

/// Coarse class of a vote option. See [`crate::vote::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteClass {
    Yes,
    No,
    Other,
}

impl VoteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Other => "other",
        }
    }
}

/// One side of a comparison vote: who voted, how, and under which party label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideVote {
    pub name: String,
    pub option: String,
    pub party: String,
    pub image: String,
}

/// A vote event split into the focal actor's sampled vote and everyone else's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareEvent {
    pub id: String,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    /// The single sampled focal-side vote, if the focal actor voted.
    pub focal: Option<SideVote>,
    pub others: Vec<SideVote>,
}

// ── Person profiles ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub name_en: String,
    pub classification: String,
    pub image: String,
}

impl Organization {
    /// Whether this organisation is classified as a political party.
    pub fn is_party(&self) -> bool {
        self.classification.to_uppercase() == PARTY_CLASSIFICATION
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub role: String,
    pub label: String,
    pub organizations: Vec<Organization>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: String,
    pub province: String,
    pub start_date: Option<NaiveDate>,
    /// `None` means the membership is ongoing.
    pub end_date: Option<NaiveDate>,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub name: String,
    pub image: String,
    pub memberships: Vec<Membership>,
}

impl Person {
    /// `name` when present, otherwise `firstname lastname` with whitespace collapsed.
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        join_name(&self.firstname, &self.lastname)
    }
}

/// Join first and last name with a single space, collapsing stray whitespace.
pub fn join_name(firstname: &str, lastname: &str) -> String {
    format!("{firstname} {lastname}")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
