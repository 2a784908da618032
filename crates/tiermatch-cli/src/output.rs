//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use tiermatch_domain::{
    AlignmentBand, CellStrength, ConflictSeverity, DomainKind, IdeaComparison, IdeaMatches, Item, LockedIdeas,
    MatchOutcome, MatrixRow, PeerAlignment, RankingDomain, Rating, Tier, TierBoundaries,
};
use tiermatch_sheet::MatrixStatus;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the tier board of one ranking.
    pub fn tier_board(&self, kind: DomainKind, domain: &RankingDomain, locked: &LockedIdeas) -> Result<String> {
        let bounds = domain.bounds();
        match self.format {
            OutputFormat::Json => {
                let tiers: Vec<Value> = Tier::ALL
                    .iter()
                    .map(|tier| {
                        let items: Vec<Value> = domain
                            .tier_items(*tier)
                            .into_iter()
                            .map(|(item, rating)| {
                                json!({
                                    "id": item.id.as_str(),
                                    "name": item.name,
                                    "rating": rating.value(),
                                    "overridden": domain.overrides().get(&item.id).is_some(),
                                })
                            })
                            .collect();
                        json!({
                            "tier": tier.as_str(),
                            "label": tier.label(),
                            "range": bounds.range_label(*tier),
                            "items": items,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "domain": kind.as_str(),
                    "bounds": bounds_json(bounds),
                    "tiers": tiers,
                }))?)
            }
            OutputFormat::Quiet => Ok(Tier::ALL
                .iter()
                .map(|tier| {
                    let ids: Vec<&str> = domain.assignment().tier(*tier).iter().map(|id| id.as_str()).collect();
                    format!("{}: {}", tier.as_str(), ids.join(" "))
                })
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut sections = Vec::new();
                for tier in Tier::ALL {
                    let heading = format!(
                        "Tier {} - {} ({})",
                        tier.rank(),
                        tier.label(),
                        bounds.range_label(tier)
                    );
                    sections.push(self.colorize(&heading, tier_color(tier)));

                    let items = domain.tier_items(tier);
                    if items.is_empty() {
                        sections.push("  (empty)".to_string());
                        continue;
                    }

                    let mut builder = Builder::default();
                    builder.push_record(["#", "Name", "Rating", "Id"]);
                    for (position, (item, rating)) in items.into_iter().enumerate() {
                        let mut name = item.name.clone();
                        if kind == DomainKind::Ideas {
                            if let Some(lock) = locked.get(&item.name) {
                                name = format!("{} [{}]", name, lock.owner);
                            }
                        }
                        let rating = if domain.overrides().get(&item.id).is_some() {
                            format!("{}*", rating)
                        } else {
                            rating.to_string()
                        };
                        builder.push_record([
                            (position + 1).to_string(),
                            name,
                            rating,
                            item.id.to_string(),
                        ]);
                    }
                    sections.push(self.table(builder));
                }
                Ok(sections.join("\n"))
            }
        }
    }

    /// Format boundaries of one ranking.
    pub fn bounds(&self, kind: DomainKind, bounds: &TierBoundaries) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "domain": kind.as_str(),
                "bounds": bounds_json(bounds),
            }))?),
            OutputFormat::Quiet => Ok(format!("{} {}", bounds.tier1_min(), bounds.tier2_min())),
            OutputFormat::Table => Ok(Tier::ALL
                .iter()
                .map(|tier| format!("{}: {}", tier.as_str(), bounds.range_label(*tier)))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format the current identity and the names to choose from.
    pub fn identity(&self, user: Option<&str>, candidates: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "identity": user,
                "candidates": candidates,
            }))?),
            OutputFormat::Quiet => Ok(user.unwrap_or_default().to_string()),
            OutputFormat::Table => Ok(match user {
                Some(user) => self.info(&format!("You are {}", user)),
                None => format!(
                    "{}\nChoose one of: {}",
                    self.warning("No identity selected"),
                    candidates.join(", ")
                ),
            }),
        }
    }

    /// Format the peer alignment report.
    pub fn peer_report(
        &self,
        peers: &[PeerAlignment],
        idea_names: &[String],
        top_ideas: &[(&Item, Rating)],
    ) -> Result<String> {
        let idea = |c: &IdeaComparison| idea_names.get(c.column).map(String::as_str).unwrap_or("?");

        match self.format {
            OutputFormat::Json => {
                let comparisons = |list: &[IdeaComparison]| -> Vec<Value> {
                    list.iter()
                        .map(|c| json!({ "idea": idea(c), "mine": c.mine, "theirs": c.theirs, "diff": c.diff, "min": c.min }))
                        .collect()
                };
                let peers: Vec<Value> = peers
                    .iter()
                    .map(|p| {
                        json!({
                            "id": p.id.as_str(),
                            "name": p.name,
                            "tier": p.tier.rank(),
                            "rating": p.rating.value(),
                            "alignment": p.alignment,
                            "band": band_name(p.band()),
                            "severity": severity_name(p.severity()),
                            "shared": comparisons(&p.shared),
                            "conflicts": comparisons(&p.conflicts),
                            "bestJoint": comparisons(&p.best_joint),
                        })
                    })
                    .collect();
                let top: Vec<Value> = top_ideas
                    .iter()
                    .map(|(item, rating)| json!({ "idea": item.name, "rating": rating.value() }))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({ "topIdeas": top, "peers": peers }))?)
            }
            OutputFormat::Quiet => Ok(peers
                .iter()
                .map(|p| format!("{} {}", p.id, p.alignment))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut out = Vec::new();
                if !top_ideas.is_empty() {
                    let names: Vec<String> = top_ideas
                        .iter()
                        .map(|(item, rating)| format!("{} ({})", item.name, rating))
                        .collect();
                    out.push(self.info(&format!("Your top ideas: {}", names.join(", "))));
                }
                if peers.is_empty() {
                    out.push(self.colorize("No peers found.", "yellow"));
                    return Ok(out.join("\n"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Peer", "Tier", "Rating", "Align", "Shared", "Conflicts", "Best joint"]);
                for p in peers {
                    let alignment = self.colorize(&format!("{}%", p.alignment), band_color(p.band()));
                    let list = |items: &[IdeaComparison]| -> String {
                        items.iter().map(|c| idea(c).to_string()).collect::<Vec<_>>().join(", ")
                    };
                    let conflicts = match p.severity() {
                        ConflictSeverity::Severe => self.colorize(&format!("!! {}", list(&p.conflicts)), "red"),
                        ConflictSeverity::Elevated => {
                            self.colorize(&format!("! {}", list(&p.conflicts)), "yellow")
                        }
                        ConflictSeverity::None => list(&p.conflicts),
                    };
                    let best: Vec<String> = p
                        .best_joint
                        .iter()
                        .map(|c| format!("{} ({}/{})", idea(c), c.mine, c.theirs))
                        .collect();
                    builder.push_record([
                        p.name.clone(),
                        self.colorize(&p.tier.rank().to_string(), tier_color(p.tier)),
                        p.rating.to_string(),
                        alignment,
                        list(&p.shared),
                        conflicts,
                        best.join(", "),
                    ]);
                }
                out.push(self.table(builder));
                Ok(out.join("\n"))
            }
        }
    }

    /// Format the matches-by-idea view.
    pub fn idea_matches(&self, ideas: &[IdeaMatches]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let ideas: Vec<Value> = ideas
                    .iter()
                    .map(|m| {
                        let peers: Vec<Value> = m
                            .matches()
                            .into_iter()
                            .map(|p| {
                                json!({
                                    "id": p.id.as_str(),
                                    "name": p.name,
                                    "tier": p.tier.rank(),
                                    "peerRating": p.peer_rating.value(),
                                    "ideaRating": p.idea_rating,
                                    "perfect": m.is_perfect(&p.id),
                                })
                            })
                            .collect();
                        let locked = match &m.outcome {
                            MatchOutcome::Locked { owner, note, .. } => json!({ "owner": owner, "note": note }),
                            MatchOutcome::Open { .. } => Value::Null,
                        };
                        json!({
                            "idea": m.idea,
                            "myRating": m.my_rating,
                            "locked": locked,
                            "matches": peers,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&ideas)?)
            }
            OutputFormat::Quiet => Ok(ideas
                .iter()
                .map(|m| {
                    let ids: Vec<&str> = m.matches().into_iter().map(|p| p.id.as_str()).collect();
                    format!("{}: {}", m.idea, ids.join(" "))
                })
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if ideas.is_empty() {
                    return Ok(self.colorize("No ideas at that rating.", "yellow"));
                }
                let mut sections = Vec::new();
                for m in ideas {
                    sections.push(self.colorize(&format!("{} (you: {})", m.idea, m.my_rating), "cyan"));
                    if let MatchOutcome::Locked { note, .. } = &m.outcome {
                        sections.push(format!("  {}", self.colorize(note, "magenta")));
                    }
                    let peers = m.matches();
                    if peers.is_empty() {
                        sections.push("  No matching peers".to_string());
                        continue;
                    }
                    let mut builder = Builder::default();
                    builder.push_record(["Peer", "Tier", "Your rating", "Their rating", ""]);
                    for p in peers {
                        let marker = if m.is_perfect(&p.id) {
                            self.colorize("perfect", "green")
                        } else {
                            String::new()
                        };
                        builder.push_record([
                            p.name.clone(),
                            self.colorize(&p.tier.rank().to_string(), tier_color(p.tier)),
                            p.peer_rating.to_string(),
                            p.idea_rating.to_string(),
                            marker,
                        ]);
                    }
                    sections.push(self.table(builder));
                }
                Ok(sections.join("\n"))
            }
        }
    }

    /// Format the peer x idea grid.
    pub fn idea_matrix(&self, idea_names: &[String], mine: &[u8], rows: &[MatrixRow]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<Value> = rows
                    .iter()
                    .map(|row| {
                        let cells: Vec<Value> = row
                            .cells
                            .iter()
                            .map(|(rating, strength)| json!({ "rating": rating, "strength": strength_name(*strength) }))
                            .collect();
                        json!({
                            "id": row.id.as_str(),
                            "name": row.name,
                            "tier": row.tier.rank(),
                            "rating": row.rating.value(),
                            "cells": cells,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "ideas": idea_names,
                    "mine": mine,
                    "rows": rows,
                }))?)
            }
            OutputFormat::Quiet => Ok(rows
                .iter()
                .map(|row| {
                    let cells: Vec<String> = row.cells.iter().map(|(r, _)| r.to_string()).collect();
                    format!("{} {}", row.id, cells.join(" "))
                })
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                let mut header = vec!["Peer".to_string(), "Tier".to_string()];
                header.extend((1..=idea_names.len()).map(|n| n.to_string()));
                builder.push_record(header);

                let mut you = vec!["You".to_string(), String::new()];
                you.extend(mine.iter().map(|r| r.to_string()));
                builder.push_record(you);

                for row in rows {
                    let mut record = vec![row.name.clone(), row.tier.rank().to_string()];
                    record.extend(
                        row.cells
                            .iter()
                            .map(|(rating, strength)| self.colorize(&rating.to_string(), strength_color(*strength))),
                    );
                    builder.push_record(record);
                }

                let legend: Vec<String> = idea_names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| format!("{} {}", i + 1, name))
                    .collect();
                Ok(format!("{}\n{}", self.table(builder), legend.join(" | ")))
            }
        }
    }

    /// Describe where the matrix came from.
    pub fn matrix_status(&self, status: MatrixStatus) -> String {
        let message = format!("Using {}", status);
        if status.is_fallback() {
            self.warning(&message)
        } else {
            self.info(&message)
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            "strong" => text.green().bold().to_string(),
            "dim" => text.dimmed().to_string(),
            _ => text.to_string(),
        }
    }
}

fn bounds_json(bounds: &TierBoundaries) -> Value {
    json!({ "tier1Min": bounds.tier1_min(), "tier2Min": bounds.tier2_min() })
}

fn tier_color(tier: Tier) -> &'static str {
    match tier {
        Tier::Tier1 => "green",
        Tier::Tier2 => "yellow",
        Tier::Tier3 => "red",
    }
}

fn band_color(band: AlignmentBand) -> &'static str {
    match band {
        AlignmentBand::High => "green",
        AlignmentBand::Medium => "yellow",
        AlignmentBand::Low => "red",
    }
}

fn band_name(band: AlignmentBand) -> &'static str {
    match band {
        AlignmentBand::High => "high",
        AlignmentBand::Medium => "medium",
        AlignmentBand::Low => "low",
    }
}

fn severity_name(severity: ConflictSeverity) -> &'static str {
    match severity {
        ConflictSeverity::Severe => "severe",
        ConflictSeverity::Elevated => "elevated",
        ConflictSeverity::None => "none",
    }
}

fn strength_color(strength: CellStrength) -> &'static str {
    match strength {
        CellStrength::Strong => "strong",
        CellStrength::Shared => "green",
        CellStrength::Mild => "yellow",
        CellStrength::None => "dim",
    }
}

fn strength_name(strength: CellStrength) -> &'static str {
    match strength {
        CellStrength::Strong => "strong",
        CellStrength::Shared => "shared",
        CellStrength::Mild => "mild",
        CellStrength::None => "none",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiermatch_domain::{Catalog, ItemId, LockedIdea};

    fn ideas() -> RankingDomain {
        let catalog = Catalog::new([
            Item::new("Safe Start", Rating::from_baseline(7)),
            Item::new("WASH", Rating::from_baseline(4)),
        ]);
        RankingDomain::fresh(catalog, TierBoundaries::default())
    }

    fn locked() -> LockedIdeas {
        LockedIdeas::new(vec![LockedIdea {
            idea: "Safe Start".into(),
            owner: "Elisa".into(),
            note: String::new(),
        }])
    }

    #[test]
    fn test_tier_board_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.tier_board(DomainKind::Ideas, &ideas(), &locked()).unwrap();
        assert!(output.contains("Tier 1 - Clearly above my bar (6-7)"));
        assert!(output.contains("Safe Start [Elisa]"));
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_tier_board_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.tier_board(DomainKind::Ideas, &ideas(), &locked()).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["tiers"][0]["items"][0]["id"], "safe-start");
        assert_eq!(value["tiers"][1]["range"], "3-5");
        assert_eq!(value["bounds"]["tier1Min"], 6);
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.tier_board(DomainKind::Ideas, &ideas(), &locked()).unwrap();
        assert_eq!(output, "tier1: safe-start\ntier2: wash\ntier3: ");
    }

    #[test]
    fn test_peer_report_marks_conflicts() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let comparisons = vec![
            IdeaComparison::new(0, 7, 1),
            IdeaComparison::new(1, 7, 1),
            IdeaComparison::new(2, 1, 7),
        ];
        let peer = PeerAlignment::summarize(
            ItemId::from_raw("paul"),
            "Paul".into(),
            Rating::new(6).unwrap(),
            Tier::Tier1,
            comparisons,
        );
        let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let output = formatter.peer_report(&[peer], &names, &[]).unwrap();
        assert!(output.contains("!! A, B, C"));
        assert!(output.contains("Paul"));
    }

    #[test]
    fn test_empty_idea_matches() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.idea_matches(&[]).unwrap();
        assert!(output.contains("No ideas"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
