//! Canonical party per voter and per-event party tallies.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::model::{VoteClass, VoteEvent};
use crate::normalize::normalize_party;
use crate::vote::{classify, is_abstention, is_valid_name};

/// Voter name → most frequently declared party across a set of vote events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalPartyMap {
    parties: BTreeMap<String, String>,
}

impl CanonicalPartyMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parties.get(name.trim()).map(String::as_str)
    }

    /// Canonical party for `name` if known, otherwise the normalised raw label.
    pub fn resolve(&self, name: &str, raw_party: &str) -> String {
        if is_valid_name(name)
            && let Some(p) = self.get(name)
        {
            return p.to_string();
        }
        normalize_party(raw_party)
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    /// `(name, party)` pairs sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Tally declared party labels per valid voter name and keep the most frequent.
///
/// Ties go to the label seen first, so callers must pass events in a stable
/// order (the linker's encounter order).
pub fn canonicalize<'a>(events: impl IntoIterator<Item = &'a VoteEvent>) -> CanonicalPartyMap {
    // name → (party, count) in first-seen order.
    let mut counter: HashMap<String, Vec<(String, usize)>> = HashMap::new();

    for event in events {
        for vote in &event.votes {
            if !is_valid_name(&vote.voter_name) {
                continue;
            }
            let party = normalize_party(&vote.voter_party);
            let tallies = counter.entry(vote.voter_name.trim().to_string()).or_default();
            match tallies.iter_mut().find(|(p, _)| *p == party) {
                Some((_, count)) => *count += 1,
                None => tallies.push((party, 1)),
            }
        }
    }

    let parties: BTreeMap<String, String> = counter
        .into_iter()
        .filter_map(|(name, tallies)| {
            let mut best: Option<(String, usize)> = None;
            for (party, count) in tallies {
                if best.as_ref().is_none_or(|(_, c)| count > *c) {
                    best = Some((party, count));
                }
            }
            best.map(|(party, _)| (name, party))
        })
        .collect();

    debug!(voters = parties.len(), "resolved canonical parties");
    CanonicalPartyMap { parties }
}

/// Per-party vote counts for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartyTally {
    pub party: String,
    pub yes: usize,
    pub no: usize,
    pub other: usize,
    /// Subset of `other` that explicitly abstained or was absent.
    pub abstained: usize,
    pub total: usize,
    /// Valid voter names, first-seen order, no duplicates.
    pub members: Vec<String>,
}

/// Count every vote row of `event` by normalised declared party, in
/// first-seen party order. Invalid names are counted but not listed.
pub fn party_tally(event: &VoteEvent) -> Vec<PartyTally> {
    let mut tallies: Vec<PartyTally> = Vec::new();
    let mut seen_members: HashMap<String, HashSet<String>> = HashMap::new();

    for vote in &event.votes {
        let party = normalize_party(&vote.voter_party);
        let idx = match tallies.iter().position(|t| t.party == party) {
            Some(i) => i,
            None => {
                tallies.push(PartyTally {
                    party: party.clone(),
                    ..Default::default()
                });
                tallies.len() - 1
            }
        };
        let t = &mut tallies[idx];
        match classify(&vote.option) {
            VoteClass::Yes => t.yes += 1,
            VoteClass::No => t.no += 1,
            VoteClass::Other => {
                t.other += 1;
                if is_abstention(&vote.option) {
                    t.abstained += 1;
                }
            }
        }
        t.total += 1;
        if is_valid_name(&vote.voter_name)
            && seen_members
                .entry(party)
                .or_default()
                .insert(vote.voter_name.clone())
        {
            t.members.push(vote.voter_name.clone());
        }
    }
    tallies
}

/// One valid voter's resolved party and vote class on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberVote {
    pub name: String,
    pub party: String,
    pub class: VoteClass,
}

/// Valid voters of `event` with canonical parties, grouped by party then by
/// vote class (yes, no, other).
pub fn member_votes(event: &VoteEvent, canon: &CanonicalPartyMap) -> Vec<MemberVote> {
    let mut members: Vec<MemberVote> = event
        .votes
        .iter()
        .filter(|v| is_valid_name(&v.voter_name))
        .map(|v| MemberVote {
            name: v.voter_name.clone(),
            party: canon.resolve(&v.voter_name, &v.voter_party),
            class: classify(&v.option),
        })
        .collect();
    members.sort_by(|a, b| a.party.cmp(&b.party).then(a.class.cmp(&b.class)));
    members
}
