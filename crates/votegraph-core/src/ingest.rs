//! JSON snapshot ingestion into typed domain records.
//!
//! Snapshots come from a GraphQL-style API, either wrapped in `{"data": …}` or
//! bare. Every raw field is optional; records missing what the pipeline needs
//! are skipped and counted in an [`IngestReport`], never raised as errors.
//! Only a missing top-level collection is an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::CoreError;
use crate::dates::parse_date;
use crate::model::{
    CompareEvent, LawRecord, Membership, Organization, Person, Post, SideVote, VoteEvent,
    VoteRow, join_name,
};

// ── Raw schema ──

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCombined {
    vote_events: Option<Vec<RawVoteEvent>>,
    bill_enforce_events: Option<Vec<RawLaw>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLaw {
    title: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVoteEvent {
    id: Option<String>,
    title: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    votes: Option<Vec<RawVote>>,
}

/// A vote row either carries `voter_name` directly or a `voters` list.
#[derive(Debug, Default, Deserialize)]
struct RawVote {
    option: Option<String>,
    voter_name: Option<String>,
    voter_party: Option<String>,
    voters: Option<Vec<RawVoter>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVoter {
    firstname: Option<String>,
    lastname: Option<String>,
    name: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCompare {
    #[serde(alias = "voteEvents")]
    events: Option<Vec<RawCompareEvent>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCompareEvent {
    id: Option<String>,
    title: Option<String>,
    start_date: Option<String>,
    #[serde(rename = "A")]
    a: Option<Vec<RawVote>>,
    #[serde(rename = "B")]
    b: Option<Vec<RawVote>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfiles {
    people: Option<Vec<RawPerson>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPerson {
    id: Option<String>,
    firstname: Option<String>,
    lastname: Option<String>,
    name: Option<String>,
    image: Option<String>,
    memberships: Option<Vec<RawMembership>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMembership {
    id: Option<String>,
    province: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    posts: Option<Vec<RawPost>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPost {
    role: Option<String>,
    label: Option<String>,
    organizations: Option<Vec<RawOrganization>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOrganization {
    id: Option<String>,
    name: Option<String>,
    name_en: Option<String>,
    classification: Option<String>,
    image: Option<String>,
}

// ── Reports ──

/// Counts of records kept and skipped during one ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub laws: usize,
    pub laws_skipped: usize,
    pub events: usize,
    pub events_skipped: usize,
    pub votes: usize,
}

/// Laws and vote events from one combined snapshot, in source order.
#[derive(Debug, Clone, Default)]
pub struct CombinedSnapshot {
    pub laws: Vec<LawRecord>,
    pub events: Vec<VoteEvent>,
    pub report: IngestReport,
}

// ── Entry points ──

/// Parse a combined snapshot carrying `voteEvents` and `billEnforceEvents`.
/// Either collection may be absent, but not both.
pub fn parse_combined(json: &str) -> Result<CombinedSnapshot, CoreError> {
    let raw: RawCombined = unwrap_data(json)?;
    if raw.vote_events.is_none() && raw.bill_enforce_events.is_none() {
        return Err(CoreError::MissingCollection("voteEvents"));
    }

    let mut report = IngestReport::default();
    let mut laws = Vec::new();
    for law in raw.bill_enforce_events.unwrap_or_default() {
        match convert_law(law) {
            Some(l) => laws.push(l),
            None => report.laws_skipped += 1,
        }
    }
    let mut events = Vec::new();
    for ev in raw.vote_events.unwrap_or_default() {
        match convert_event(ev) {
            Some(e) => {
                report.votes += e.votes.len();
                events.push(e);
            }
            None => report.events_skipped += 1,
        }
    }
    report.laws = laws.len();
    report.events = events.len();
    info!(
        laws = report.laws,
        events = report.events,
        votes = report.votes,
        skipped = report.laws_skipped + report.events_skipped,
        "ingested combined snapshot"
    );
    Ok(CombinedSnapshot {
        laws,
        events,
        report,
    })
}

/// Parse pre-split compare events. The first `A` vote and its first voter
/// become the focal side; every `B` vote becomes one other-side vote.
pub fn parse_compare(json: &str) -> Result<Vec<CompareEvent>, CoreError> {
    let raw: RawCompare = unwrap_data(json)?;
    let events = raw.events.ok_or(CoreError::MissingCollection("events"))?;

    let out: Vec<CompareEvent> = events
        .into_iter()
        .enumerate()
        .map(|(i, ev)| CompareEvent {
            id: ev.id.unwrap_or_else(|| format!("#{i}")),
            title: ev.title.unwrap_or_default(),
            start_date: ev.start_date.as_deref().and_then(parse_date),
            focal: ev.a.unwrap_or_default().into_iter().next().map(side_vote),
            others: ev.b.unwrap_or_default().into_iter().map(side_vote).collect(),
        })
        .collect();
    let without_focal = out.iter().filter(|e| e.focal.is_none()).count();
    info!(events = out.len(), without_focal, "ingested compare events");
    Ok(out)
}

/// Parse person profiles. People with no name at all are skipped.
pub fn parse_profiles(json: &str) -> Result<Vec<Person>, CoreError> {
    let raw: RawProfiles = unwrap_data(json)?;
    let people = raw.people.ok_or(CoreError::MissingCollection("people"))?;

    let total = people.len();
    let out: Vec<Person> = people.into_iter().filter_map(convert_person).collect();
    info!(people = out.len(), skipped = total - out.len(), "ingested profiles");
    Ok(out)
}

// ── Conversion ──

fn unwrap_data<T: for<'de> Deserialize<'de>>(json: &str) -> Result<T, CoreError> {
    let mut value: Value = serde_json::from_str(json)?;
    if let Some(data) = value.get_mut("data")
        && data.is_object()
    {
        value = data.take();
    }
    Ok(serde_json::from_value(value)?)
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn convert_law(raw: RawLaw) -> Option<LawRecord> {
    let Some(title) = non_empty(raw.title) else {
        debug!("skipping law record without title");
        return None;
    };
    Some(LawRecord {
        title,
        start_date: raw.start_date.as_deref().and_then(parse_date),
        end_date: raw.end_date.as_deref().and_then(parse_date),
    })
}

fn convert_event(raw: RawVoteEvent) -> Option<VoteEvent> {
    let (Some(id), Some(title)) = (non_empty(raw.id), non_empty(raw.title)) else {
        debug!("skipping vote event without id or title");
        return None;
    };
    let votes = raw
        .votes
        .unwrap_or_default()
        .into_iter()
        .map(|v| {
            let voter_name = match v.voter_name {
                Some(name) => name,
                None => v
                    .voters
                    .as_deref()
                    .and_then(|vs| vs.first())
                    .map(voter_full_name)
                    .unwrap_or_default(),
            };
            VoteRow {
                option: v.option.unwrap_or_default(),
                voter_name,
                voter_party: v.voter_party.unwrap_or_default(),
            }
        })
        .collect();
    Some(VoteEvent {
        id,
        title,
        start_date: raw.start_date.as_deref().and_then(parse_date),
        end_date: raw.end_date.as_deref().and_then(parse_date),
        votes,
    })
}

/// `firstname lastname`, falling back to `name`.
fn voter_full_name(v: &RawVoter) -> String {
    let joined = join_name(
        v.firstname.as_deref().unwrap_or(""),
        v.lastname.as_deref().unwrap_or(""),
    );
    if joined.is_empty() {
        join_name(v.name.as_deref().unwrap_or(""), "")
    } else {
        joined
    }
}

fn side_vote(raw: RawVote) -> SideVote {
    let voter = raw.voters.as_deref().and_then(|vs| vs.first());
    SideVote {
        name: match (&raw.voter_name, voter) {
            (Some(name), _) => join_name(name, ""),
            (None, Some(v)) => voter_full_name(v),
            (None, None) => String::new(),
        },
        option: raw.option.unwrap_or_default(),
        party: raw.voter_party.unwrap_or_default(),
        image: voter.and_then(|v| v.image.clone()).unwrap_or_default(),
    }
}

fn convert_person(raw: RawPerson) -> Option<Person> {
    let person = Person {
        id: raw.id.unwrap_or_default(),
        firstname: raw.firstname.unwrap_or_default(),
        lastname: raw.lastname.unwrap_or_default(),
        name: raw.name.unwrap_or_default(),
        image: raw.image.unwrap_or_default(),
        memberships: raw
            .memberships
            .unwrap_or_default()
            .into_iter()
            .map(convert_membership)
            .collect(),
    };
    if person.display_name().trim().is_empty() {
        debug!(id = %person.id, "skipping person without a name");
        return None;
    }
    Some(person)
}

fn convert_membership(raw: RawMembership) -> Membership {
    Membership {
        id: raw.id.unwrap_or_default(),
        province: raw.province.unwrap_or_default(),
        start_date: raw.start_date.as_deref().and_then(parse_date),
        end_date: raw.end_date.as_deref().and_then(parse_date),
        posts: raw
            .posts
            .unwrap_or_default()
            .into_iter()
            .map(|p| Post {
                role: p.role.unwrap_or_default(),
                label: p.label.unwrap_or_default(),
                organizations: p
                    .organizations
                    .unwrap_or_default()
                    .into_iter()
                    .map(|o| Organization {
                        id: o.id.unwrap_or_default(),
                        name: o.name.unwrap_or_default(),
                        name_en: o.name_en.unwrap_or_default(),
                        classification: o.classification.unwrap_or_default(),
                        image: o.image.unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const COMBINED: &str = r#"{
      "data": {
        "voteEvents": [
          {
            "id": "ve-1",
            "title": "ร่างงบประมาณ",
            "start_date": "2024-01-15",
            "end_date": "2024-01-15T10:00:00",
            "votes": [
              {"option": "เห็นด้วย", "voter_name": "สมชาย ใจดี", "voter_party": "พรรคก"},
              {"option": "ไม่เห็นด้วย", "voters": [{"firstname": "สมหญิง", "lastname": "รักดี"}]},
              {"option": null, "voter_name": null, "voter_party": null}
            ]
          },
          {"id": "ve-2", "title": null, "votes": []},
          {"title": "ไม่มีไอดี"}
        ],
        "billEnforceEvents": [
          {"title": "พ.ร.บ. งบประมาณ", "end_date": "2024-01-20T00:00:00Z"},
          {"title": "   "},
          {"start_date": "2024-01-01"}
        ]
      }
    }"#;

    #[test]
    fn combined_snapshot_skips_incomplete_records() {
        let snap = parse_combined(COMBINED).unwrap();
        assert_eq!(snap.laws.len(), 1);
        assert_eq!(snap.laws[0].end_date, Some(d(2024, 1, 20)));
        assert_eq!(snap.events.len(), 1);

        let ev = &snap.events[0];
        assert_eq!(ev.end_date, Some(d(2024, 1, 15)));
        assert_eq!(ev.votes.len(), 3);
        assert_eq!(ev.votes[1].voter_name, "สมหญิง รักดี");
        assert_eq!(ev.votes[2], VoteRow {
            option: String::new(),
            voter_name: String::new(),
            voter_party: String::new(),
        });

        assert_eq!(snap.report, IngestReport {
            laws: 1,
            laws_skipped: 2,
            events: 1,
            events_skipped: 2,
            votes: 3,
        });
    }

    #[test]
    fn bare_snapshot_is_accepted() {
        let snap = parse_combined(r#"{"billEnforceEvents": [{"title": "ก ข ค"}]}"#).unwrap();
        assert_eq!(snap.laws.len(), 1);
        assert!(snap.events.is_empty());
    }

    #[test]
    fn missing_collections_are_errors() {
        assert!(matches!(
            parse_combined(r#"{"data": {}}"#),
            Err(CoreError::MissingCollection("voteEvents"))
        ));
        assert!(matches!(
            parse_compare("{}"),
            Err(CoreError::MissingCollection("events"))
        ));
        assert!(matches!(
            parse_profiles(r#"{"data": {"people": null}}"#),
            Err(CoreError::MissingCollection("people"))
        ));
        assert!(matches!(parse_profiles("not json"), Err(CoreError::Json(_))));
    }

    #[test]
    fn compare_events_take_first_focal_vote() {
        let json = r#"{"data": {"events": [
          {
            "id": "e1", "title": "t1", "start_date": "2024-02-01",
            "A": [
              {"option": "เห็นด้วย", "voter_party": "พรรคก",
               "voters": [{"firstname": "สมชาย", "lastname": " ใจดี", "image": "a.png"}]},
              {"option": "ไม่เห็นด้วย", "voters": [{"firstname": "ซ้ำ", "lastname": "ซ้อน"}]}
            ],
            "B": [
              {"option": "เห็นด้วย", "voters": [{"firstname": "สมหญิง", "lastname": "รักดี"}]},
              {"option": "เห็นด้วย", "voters": []}
            ]
          },
          {"A": [], "B": null}
        ]}}"#;
        let events = parse_compare(json).unwrap();
        assert_eq!(events.len(), 2);

        let focal = events[0].focal.as_ref().unwrap();
        assert_eq!(focal.name, "สมชาย ใจดี");
        assert_eq!(focal.party, "พรรคก");
        assert_eq!(focal.image, "a.png");
        assert_eq!(events[0].start_date, Some(d(2024, 2, 1)));
        assert_eq!(events[0].others.len(), 2);
        assert_eq!(events[0].others[0].name, "สมหญิง รักดี");
        assert_eq!(events[0].others[1].name, "");

        assert_eq!(events[1].id, "#1");
        assert!(events[1].focal.is_none());
        assert!(events[1].others.is_empty());
    }

    #[test]
    fn profiles_convert_memberships() {
        let json = r#"{"data": {"people": [
          {
            "id": "p1", "firstname": "สมชาย", "lastname": "ใจดี",
            "memberships": [{
              "id": "m1", "province": "เชียงใหม่", "start_date": "2021-07-01", "end_date": null,
              "posts": [{"role": "สส.", "organizations": [
                {"name": "พรรคก", "name_en": "Party A", "classification": "POLITICAL_PARTY"}
              ]}]
            }]
          },
          {"id": "p2"}
        ]}}"#;
        let people = parse_profiles(json).unwrap();
        assert_eq!(people.len(), 1);
        let m = &people[0].memberships[0];
        assert_eq!(m.start_date, Some(d(2021, 7, 1)));
        assert!(m.end_date.is_none());
        assert!(m.posts[0].organizations[0].is_party());
        assert_eq!(people[0].display_name(), "สมชาย ใจดี");
    }
}
