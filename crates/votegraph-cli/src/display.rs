//! Vertical card display for linked laws, party tallies, co-voting and profiles.
//!
//! Every card follows the same layout: a `=== name ===` header, then labelled
//! sections of `key  value` lines. Long lists are cut at [`MAX_LIST_ITEMS`].

use chrono::NaiveDate;
use votegraph_core::covote::format_percent;
use votegraph_core::dates::diff_year_month;
use votegraph_core::party::{CanonicalPartyMap, member_votes, party_tally};
use votegraph_core::timeline::{ProfileSummary, format_duration};
use votegraph_core::{Ally, ImageIndex, LawRecord, LinkedMap, PairwiseTable, PeerReport, VoteEvent};

const MAX_LIST_ITEMS: usize = 10;
const MAX_TITLE_CHARS: usize = 60;

// ── Public API ──

/// Linked laws with their matched events, plus the linking summary.
pub fn print_link_report(linked: &LinkedMap, laws: &[&LawRecord]) {
    let r = &linked.report;
    println!("=== Linked laws ===");
    println!();
    println!("Summary");
    print_field("laws", r.laws_kept);
    print_field("untitled dropped", r.untitled_dropped);
    print_field("duplicates dropped", r.duplicates_dropped);
    print_field("vote events", r.events_in);
    print_field("matched", r.matched);
    print_field("unmatched", r.unmatched);
    println!();

    if laws.is_empty() {
        println!("No laws in range.");
        return;
    }
    println!("Laws ({}):", laws.len());
    for law in laws.iter().take(MAX_LIST_ITEMS) {
        let end = law.end_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        println!("  {:<12} {}", end, truncate(&law.title, MAX_TITLE_CHARS));
        let events = linked.events_for(&law.title);
        for ev in events.iter().take(MAX_LIST_ITEMS) {
            println!("      {:<16} {}", ev.id, truncate(&ev.title, MAX_TITLE_CHARS));
        }
        more(events.len(), "      ");
    }
    more(laws.len(), "  ");
}

pub fn print_parties(canon: &CanonicalPartyMap) {
    println!("=== Canonical parties ===");
    println!();
    if canon.is_empty() {
        println!("No valid voters in the linked events.");
        return;
    }
    println!("Voters ({}):", canon.len());
    for (name, party) in canon.iter() {
        println!("  {:<30} {}", name, party);
    }
}

/// One section per event: party counts, then each party's members by vote.
pub fn print_tally(title: &str, events: &[VoteEvent], canon: &CanonicalPartyMap) {
    println!("=== {} ===", truncate(title, MAX_TITLE_CHARS));
    println!();
    if events.is_empty() {
        println!("No vote events linked to this law.");
        return;
    }

    for ev in events {
        println!("{} ({})", truncate(&ev.title, MAX_TITLE_CHARS), ev.id);
        println!("  {:<26} {:>5} {:>5} {:>5} {:>5}", "party", "yes", "no", "other", "total");
        for t in party_tally(ev) {
            println!(
                "  {:<26} {:>5} {:>5} {:>5} {:>5}",
                t.party, t.yes, t.no, t.other, t.total
            );
        }

        let members = member_votes(ev, canon);
        if !members.is_empty() {
            println!("  members ({}):", members.len());
            for m in members.iter().take(MAX_LIST_ITEMS) {
                println!("    {:<30} {:<20} {}", m.name, m.party, m.class.as_str());
            }
            more(members.len(), "    ");
        }
        println!();
    }
}

/// Top allies of `focal`, then the same-party peer band when available.
pub fn print_compare(
    focal: &str,
    table: &PairwiseTable,
    allies: &[Ally],
    images: &ImageIndex,
    peers: Option<&PeerReport>,
) {
    println!("=== {} ===", focal);
    if let Some(img) = images.get(focal) {
        println!("{img}");
    }
    println!();

    println!("Co-voting");
    print_field("events", table.total_events);
    print_field("pairs", table.rows.len());
    println!();

    if allies.is_empty() {
        println!("No allies found.");
    } else {
        println!("Top allies ({}):", allies.len());
        for a in allies.iter().take(MAX_LIST_ITEMS) {
            print!("  {:<30} {:>7}  ({} same)", a.name, a.percent_label, a.sum_flag);
            if let Some(img) = images.get(&a.name) {
                print!("  {img}");
            }
            println!();
        }
    }
    println!();

    let Some(report) = peers else {
        return;
    };
    println!("Peers in {}", report.party);
    if report.is_empty() {
        println!("  No same-party peers of {}.", report.selected);
        println!();
        return;
    }
    print_field("selected", &report.selected);
    print_field("peers", report.peers.len());
    print_field("mean", format!("{:.1}%", report.band.mean));
    print_field("sd", format!("{:.1}", report.band.sd));
    print_field(
        "band",
        format!("{:.1}% to {:.1}%", report.band.lower, report.band.upper),
    );
    print_field("longest tenure", format!("{:.1} years", report.max_years));
    for p in report.peers.iter().take(MAX_LIST_ITEMS) {
        let marker = if report.band.contains(p.percent) { " " } else { "*" };
        println!(
            "  {marker} {:<28} {:>7}  {:.1} years",
            p.name,
            format_percent(Some(p.percent)),
            p.years
        );
    }
    more(report.peers.len(), "  ");
    println!();
}

pub fn print_profile(profile: &ProfileSummary, today: NaiveDate) {
    println!("=== {} ===", profile.name);
    if !profile.image.is_empty() {
        println!("{}", profile.image);
    }
    println!();

    println!("Current");
    print_opt("party", &profile.current_party);
    print_opt("membership", &profile.current_membership_name);
    print_opt("province", &profile.province);
    print_opt("role", &profile.latest_role);
    println!();

    if !profile.timeline.is_empty() {
        println!("Timeline ({}):", profile.timeline.len());
        for i in profile.timeline.iter().take(MAX_LIST_ITEMS) {
            let start = i.start.map(|d| d.to_string()).unwrap_or_else(|| "?".into());
            let end = i.end.map(|d| d.to_string()).unwrap_or_else(|| "now".into());
            let span = i
                .start
                .map(|s| {
                    let ym = diff_year_month(s, i.end.unwrap_or(today));
                    format_duration(ym.years, ym.months)
                })
                .unwrap_or_default();
            println!("  {start} → {end:<10}  {:<26} {span}", i.label());
        }
        more(profile.timeline.len(), "  ");
        println!();
    }

    if !profile.parties.is_empty() {
        println!("Tenure");
        for party in &profile.parties {
            print_field(party, format!("{:.1} years", profile.tenure_years(party, today)));
        }
        println!();
    }
}

// ── Helpers ──

fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<26} {}", label, value);
}

fn print_opt(label: &str, value: &str) {
    if !value.is_empty() {
        print_field(label, value);
    }
}

fn more(len: usize, indent: &str) {
    if len > MAX_LIST_ITEMS {
        println!("{indent}... and {} more", len - MAX_LIST_ITEMS);
    }
}

/// Cut to `max` characters, ending in `...` when shortened.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}
