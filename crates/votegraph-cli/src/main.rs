mod display;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use votegraph_core::config::load_config;
use votegraph_core::covote::{aggregate, split_for_focal};
use votegraph_core::dates::parse_date;
use votegraph_core::ingest::{CombinedSnapshot, parse_combined, parse_compare, parse_profiles};
use votegraph_core::linker::VoteFilter;
use votegraph_core::party::{canonicalize, member_votes, party_tally};
use votegraph_core::peers::peer_report;
use votegraph_core::timeline::ProfileSummary;
use votegraph_core::{
    Ally, CompareCache, CompareEvent, ImageIndex, LinkedMap, PairwiseTable, PeerReport,
    PipelineConfig, ProfileIndex, RecordLinker, SnapshotId,
};

#[derive(Debug, Parser)]
#[command(name = "votegraph", version, about = "Legislative vote analytics")]
struct Cli {
    /// Pipeline config (TOML). Missing file means defaults.
    #[arg(long, global = true, env = "VOTEGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Override the linker's match threshold.
    #[arg(long, global = true, env = "VOTEGRAPH_THRESHOLD")]
    threshold: Option<f64>,

    /// Emit JSON instead of cards.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Link enacted laws to vote events and list the matches.
    Link {
        /// Combined snapshot with `voteEvents` and `billEnforceEvents`.
        snapshot: PathBuf,
        /// Only laws whose title contains this text.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_parser = parse_day)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_day)]
        to: Option<NaiveDate>,
    },
    /// Canonical party of every voter across the linked events.
    Parties {
        snapshot: PathBuf,
    },
    /// Per-party vote counts for the events linked to one law.
    Tally {
        snapshot: PathBuf,
        /// Law title or part of it; the newest match is used.
        law: String,
        /// Keep only these parties.
        #[arg(long = "party")]
        parties: Vec<String>,
        /// Keep only these voters.
        #[arg(long = "voter")]
        voters: Vec<String>,
    },
    /// How often each actor voted the same way as the focal actor.
    Compare {
        /// Combined snapshot; events are linked and split per focal actor.
        #[arg(long, conflicts_with = "events", required_unless_present = "events")]
        combined: Option<PathBuf>,
        /// Pre-split compare events (`A`/`B` sides).
        #[arg(long)]
        events: Option<PathBuf>,
        /// Focal actor; repeat for several.
        #[arg(long = "focal", required = true)]
        focal: Vec<String>,
        /// Person profiles, enables the same-party peer report.
        #[arg(long)]
        profiles: Option<PathBuf>,
        /// Actor whose party defines the peer group. Defaults to the focal actor.
        #[arg(long, requires = "profiles")]
        peer: Option<String>,
        /// Number of allies to list. Defaults to the config's `display.top_allies`.
        #[arg(long)]
        top: Option<usize>,
        #[arg(long, value_parser = parse_day)]
        today: Option<NaiveDate>,
    },
    /// Party timeline and tenure of one person.
    Timeline {
        profiles: PathBuf,
        name: String,
        #[arg(long, value_parser = parse_day)]
        today: Option<NaiveDate>,
    },
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("invalid date `{raw}`, expected YYYY-MM-DD"))
}

/// Used when `RUST_LOG` is unset or unparseable.
const DEFAULT_LOG_FILTER: &str = "info";

fn log_filter(rust_log: Option<String>) -> EnvFilter {
    rust_log
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("votegraph v{}", env!("CARGO_PKG_VERSION"));
    run(cli)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli.config.as_deref(), cli.threshold)?;
    let json = cli.json;

    match cli.command {
        Command::Link {
            snapshot,
            search,
            from,
            to,
        } => cmd_link(&config, &snapshot, search.as_deref(), from, to, json),
        Command::Parties { snapshot } => cmd_parties(&config, &snapshot, json),
        Command::Tally {
            snapshot,
            law,
            parties,
            voters,
        } => cmd_tally(&config, &snapshot, &law, VoteFilter { parties, voters }, json),
        Command::Compare {
            combined,
            events,
            focal,
            profiles,
            peer,
            top,
            today,
        } => {
            let source = match (combined, events) {
                (Some(path), _) => CompareSource::Combined(path),
                (None, Some(path)) => CompareSource::Events(path),
                (None, None) => bail!("one of --combined or --events is required"),
            };
            let opts = CompareOpts {
                focal,
                profiles,
                peer,
                top: top.unwrap_or(config.display.top_allies),
                today: today.unwrap_or_else(today_local),
            };
            cmd_compare(&config, &source, &opts, json)
        }
        Command::Timeline {
            profiles,
            name,
            today,
        } => cmd_timeline(&profiles, &name, today.unwrap_or_else(today_local), json),
    }
}

fn resolve_config(path: Option<&Path>, threshold: Option<f64>) -> anyhow::Result<PipelineConfig> {
    let mut config = match path {
        Some(p) => load_config(p).with_context(|| format!("loading config {}", p.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(t) = threshold {
        config.linker.threshold = t;
        config.validate().context("applying --threshold")?;
    }
    Ok(config)
}

fn today_local() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_combined(path: &Path) -> anyhow::Result<(CombinedSnapshot, SnapshotId)> {
    let raw = read(path)?;
    let snapshot = parse_combined(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok((snapshot, SnapshotId::from_content(raw.as_bytes())))
}

fn link_snapshot(config: &PipelineConfig, path: &Path) -> anyhow::Result<(LinkedMap, SnapshotId)> {
    let (snapshot, id) = load_combined(path)?;
    let linked = RecordLinker::new(config).link(&snapshot.laws, &snapshot.events);
    Ok((linked, id))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── link ──

fn cmd_link(
    config: &PipelineConfig,
    path: &Path,
    search: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let (linked, _) = link_snapshot(config, path)?;
    let laws = match search {
        Some(q) => linked.search(q, from, to),
        None => linked.laws_in_range(from, to),
    };

    if json {
        #[derive(Serialize)]
        struct LawMatches<'a> {
            title: &'a str,
            end_date: Option<NaiveDate>,
            events: Vec<&'a str>,
        }
        let out: Vec<LawMatches> = laws
            .iter()
            .map(|law| LawMatches {
                title: &law.title,
                end_date: law.end_date,
                events: linked.events_for(&law.title).iter().map(|e| e.id.as_str()).collect(),
            })
            .collect();
        return print_json(&out);
    }
    display::print_link_report(&linked, &laws);
    Ok(())
}

// ── parties ──

fn cmd_parties(config: &PipelineConfig, path: &Path, json: bool) -> anyhow::Result<()> {
    let (linked, _) = link_snapshot(config, path)?;
    let canon = canonicalize(&linked.matched);
    if json {
        return print_json(&canon);
    }
    display::print_parties(&canon);
    Ok(())
}

// ── tally ──

fn cmd_tally(
    config: &PipelineConfig,
    path: &Path,
    query: &str,
    filter: VoteFilter,
    json: bool,
) -> anyhow::Result<()> {
    let (linked, _) = link_snapshot(config, path)?;
    let Some(law) = linked.search(query, None, None).into_iter().next() else {
        bail!("no law title contains `{query}`");
    };
    let canon = canonicalize(&linked.matched);
    let events = linked.filtered_events(&law.title, &filter);

    if json {
        #[derive(Serialize)]
        struct EventTally {
            id: String,
            title: String,
            parties: Vec<votegraph_core::party::PartyTally>,
            members: Vec<votegraph_core::party::MemberVote>,
        }
        let out: Vec<EventTally> = events
            .iter()
            .map(|ev| EventTally {
                id: ev.id.clone(),
                title: ev.title.clone(),
                parties: party_tally(ev),
                members: member_votes(ev, &canon),
            })
            .collect();
        return print_json(&out);
    }
    display::print_tally(&law.title, &events, &canon);
    Ok(())
}

// ── compare ──

enum CompareSource {
    Combined(PathBuf),
    Events(PathBuf),
}

struct CompareOpts {
    focal: Vec<String>,
    profiles: Option<PathBuf>,
    peer: Option<String>,
    top: usize,
    today: NaiveDate,
}

#[derive(Debug, Serialize)]
struct CompareOutput {
    focal: String,
    total_events: usize,
    allies: Vec<Ally>,
    peers: Option<PeerReport>,
}

fn cmd_compare(
    config: &PipelineConfig,
    source: &CompareSource,
    opts: &CompareOpts,
    json: bool,
) -> anyhow::Result<()> {
    // Either linked raw events (split per focal) or one pre-split table.
    let (raw_events, compare_events, snapshot) = match source {
        CompareSource::Combined(path) => {
            let (linked, id) = link_snapshot(config, path)?;
            (linked.matched, Vec::new(), id)
        }
        CompareSource::Events(path) => {
            let raw = read(path)?;
            let events: Vec<CompareEvent> =
                parse_compare(&raw).with_context(|| format!("parsing {}", path.display()))?;
            (Vec::new(), events, SnapshotId::from_content(raw.as_bytes()))
        }
    };

    let profiles = match &opts.profiles {
        Some(path) => {
            let people = parse_profiles(&read(path)?)
                .with_context(|| format!("parsing {}", path.display()))?;
            Some(ProfileIndex::build(&people))
        }
        None => None,
    };

    let mut cache: CompareCache<(PairwiseTable, ImageIndex)> = CompareCache::new();
    let mut outputs = Vec::with_capacity(opts.focal.len());
    for focal in &opts.focal {
        let (table, images) = cache.get_or_compute(snapshot, focal, || {
            let events = match source {
                CompareSource::Combined(_) => split_for_focal(&raw_events, focal),
                CompareSource::Events(_) => compare_events.clone(),
            };
            (aggregate(&events), ImageIndex::build(&events))
        });
        let rows = table.focus(focal);
        if rows.is_empty() {
            tracing::warn!(focal = %focal, "no pairwise rows for focal actor");
        }
        let allies = table.top_allies(&rows, opts.top);
        let peers = profiles.as_ref().and_then(|index| {
            let selected = opts.peer.as_deref().unwrap_or(focal.as_str());
            peer_report(selected, &rows, table.total_events, index, opts.today)
        });

        if json {
            outputs.push(CompareOutput {
                focal: focal.clone(),
                total_events: table.total_events,
                allies,
                peers,
            });
        } else {
            display::print_compare(focal, table, &allies, images, peers.as_ref());
        }
    }
    if json {
        print_json(&outputs)?;
    }
    let (hits, misses) = cache.stats();
    tracing::debug!(hits, misses, "compare cache");
    Ok(())
}

// ── timeline ──

fn cmd_timeline(path: &Path, name: &str, today: NaiveDate, json: bool) -> anyhow::Result<()> {
    let people = parse_profiles(&read(path)?).with_context(|| format!("parsing {}", path.display()))?;
    let index = ProfileIndex::build(&people);
    let Some(profile) = index.get(name) else {
        bail!("no profile named `{name}`");
    };

    if json {
        #[derive(Serialize)]
        struct TimelineOutput<'a> {
            profile: &'a ProfileSummary,
            tenure: Vec<(&'a str, f64)>,
        }
        let tenure = profile
            .parties
            .iter()
            .map(|p| (p.as_str(), profile.tenure_years(p, today)))
            .collect();
        return print_json(&TimelineOutput { profile, tenure });
    }
    display::print_profile(profile, today);
    Ok(())
}
