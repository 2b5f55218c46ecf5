//! Terminal formatting for trace, result, validation and analytics views.

use std::fmt::Write;

use owo_colors::OwoColorize;

use super::view::{Emphasis, FactState, RuleView, Tone, TraceView};
use crate::model::{
    Answer, ConsultationOutcome, ConsultationStats, HistoryEntry, QuestionPaths, Severity,
    ValidationReport, ViewSlot,
};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Turns tones into terminal styling. Plain when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    colored: bool,
}

impl Palette {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn plain() -> Self {
        Self { colored: false }
    }

    pub fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.colored {
            return text.to_string();
        }
        match tone {
            Tone::Muted => text.dimmed().to_string(),
            Tone::Positive => text.green().bold().to_string(),
            Tone::Negative => text.red().bold().to_string(),
            Tone::Derived => text.magenta().bold().to_string(),
            Tone::Highlight => text.blue().bold().to_string(),
            Tone::Warning => text.yellow().bold().to_string(),
        }
    }

    fn dim(&self, text: &str) -> String {
        self.paint(text, Tone::Muted)
    }

    /// Severity label whose weight grows with severity.
    pub fn severity(&self, severity: Severity) -> String {
        let label = match Emphasis::from(severity) {
            Emphasis::Strong => "[!!! HIGH]",
            Emphasis::Normal => "[!! MEDIUM]",
            Emphasis::Subtle => "[! LOW]",
        };
        if !self.colored {
            return label.to_string();
        }
        match severity {
            Severity::High => label.bright_red().bold().to_string(),
            Severity::Medium => label.yellow().to_string(),
            Severity::Low => label.blue().dimmed().to_string(),
        }
    }
}

fn fact_marker(state: FactState) -> &'static str {
    match state {
        FactState::ConfirmedTrue => "[yes]",
        FactState::ConfirmedFalse => "[no]",
        FactState::DerivedTrue => "[derived]",
        FactState::DerivedFalse => "[refuted]",
        FactState::Unconfirmed => "[?]",
    }
}

/// Render the live trace panel.
pub fn render_trace(view: &TraceView, palette: &Palette) -> String {
    let mut out = String::new();

    if let Some(reason) = &view.catalog_unavailable {
        let _ = writeln!(out, "Rules unavailable: {}", reason);
    }
    if let Some(reason) = &view.memory_unavailable {
        let _ = writeln!(out, "Working memory unavailable: {}", reason);
    }

    if view.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            palette.dim("Rules related to your answers will appear here.")
        );
    }

    for group in &view.groups {
        let _ = writeln!(out, "\n{} rules", group.category);
        let _ = writeln!(out, "{}", palette.dim(SEPARATOR));
        for rule in &group.rules {
            render_rule(&mut out, rule, palette);
        }
    }

    if let Some(summary) = view.summary {
        let _ = writeln!(out, "\nWorking memory");
        let _ = writeln!(out, "  confirmed facts:   {}", summary.findings);
        let _ = writeln!(out, "  derived hypotheses: {}", summary.hypotheses);
        let _ = writeln!(out, "  fired rules:       {}", summary.fired_rules);
    }

    out
}

fn render_rule(out: &mut String, rule: &RuleView, palette: &Palette) {
    let header = format!("Rule #{} {}", rule.id, rule.name);
    let dimmed = rule.badge.map_or(false, |b| b.dimmed);
    let header = if dimmed { palette.dim(&header) } else { header };

    match rule.badge {
        Some(badge) => {
            let _ = writeln!(out, "{}  {}", header, palette.paint(badge.label, badge.tone));
        }
        None => {
            let _ = writeln!(out, "{}", header);
        }
    }

    let _ = writeln!(out, "  IF");
    for cond in &rule.conditions {
        let _ = writeln!(
            out,
            "    {} {} {}",
            cond.joiner.symbol(),
            palette.paint(&cond.fact, cond.state.tone()),
            palette.dim(fact_marker(cond.state))
        );
    }

    let _ = writeln!(out, "  THEN");
    for action in &rule.actions {
        let line = format!("⇒ {}", action.fact);
        let tone = if action.derived {
            Tone::Highlight
        } else {
            Tone::Muted
        };
        let _ = writeln!(out, "    {}", palette.paint(&line, tone));
    }
}

fn answer_tone(answer: Answer) -> Tone {
    match answer {
        Answer::Yes => Tone::Positive,
        Answer::No => Tone::Negative,
        Answer::Unknown => Tone::Warning,
    }
}

/// Render the answer history, numbered from 1.
pub fn render_history(history: &[HistoryEntry], palette: &Palette) -> String {
    let mut out = String::new();
    for (idx, entry) in history.iter().enumerate() {
        let _ = writeln!(
            out,
            "Q{}: {} → {}",
            idx + 1,
            entry.question,
            palette.paint(entry.answer.as_str(), answer_tone(entry.answer))
        );
    }
    out
}

/// Render the final result with the answer summary.
pub fn render_outcome(
    outcome: &ConsultationOutcome,
    history: &[HistoryEntry],
    palette: &Palette,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Consultation result");
    let _ = writeln!(out, "{}", palette.dim(SEPARATOR));

    if outcome.has_applicable() {
        let _ = writeln!(out, "Applicable ({}):", outcome.applicable_visas.len());
        for visa in &outcome.applicable_visas {
            let _ = writeln!(out, "  {} {}", palette.paint("✓", Tone::Positive), visa);
        }
    } else {
        let _ = writeln!(
            out,
            "{}",
            palette.paint("No applicable goal was reached with these answers.", Tone::Negative)
        );
    }

    if !outcome.all_goals.is_empty() {
        let _ = writeln!(out, "\nAll goals:");
        for (goal, achieved) in &outcome.all_goals {
            let verdict = if *achieved {
                palette.paint("possible", Tone::Positive)
            } else {
                palette.dim("not possible")
            };
            let _ = writeln!(out, "  {:<32} {}", goal, verdict);
        }
    }

    let _ = writeln!(out, "\nAnswers ({}):", history.len());
    out.push_str(&render_history(history, palette));

    out
}

/// Render a validation report. Issues keep the engine's order.
pub fn render_validation(report: &ViewSlot<ValidationReport>, palette: &Palette) -> String {
    let report = match report {
        ViewSlot::Ready(report) => report,
        ViewSlot::Unavailable { reason } => return format!("Validation unavailable: {}\n", reason),
        ViewSlot::NotLoaded => return "Validation not run yet.\n".to_string(),
    };

    let mut out = String::new();
    let results = &report.results;

    if report.is_valid {
        let _ = writeln!(out, "{}", palette.paint("✓ Rule base check passed", Tone::Positive));
    } else {
        let total = report.total_issues.unwrap_or_else(|| report.issue_count());
        let _ = writeln!(
            out,
            "{}",
            palette.paint(&format!("✗ Rule base check found {} issue(s)", total), Tone::Negative)
        );
    }

    if !results.contradictions.is_empty() {
        let _ = writeln!(out, "\nContradictions ({})", results.contradictions.len());
        for issue in &results.contradictions {
            let _ = writeln!(out, "  {} fact: {}", palette.severity(issue.severity), issue.fact);
            let _ = writeln!(out, "    rules: {}", join_ids(&issue.rule_ids));
            write_message(&mut out, issue.message.as_deref(), palette);
        }
    }

    if !results.unreachable_rules.is_empty() {
        let _ = writeln!(out, "\nUnreachable rules ({})", results.unreachable_rules.len());
        for issue in &results.unreachable_rules {
            let _ = writeln!(
                out,
                "  {} Rule #{} {}",
                palette.severity(issue.severity),
                issue.rule_id,
                issue.rule_name
            );
            let _ = writeln!(
                out,
                "    unsatisfiable: {}",
                issue.impossible_conditions.join(", ")
            );
            write_message(&mut out, issue.message.as_deref(), palette);
        }
    }

    if !results.circular_references.is_empty() {
        let _ = writeln!(out, "\nCircular references ({})", results.circular_references.len());
        for issue in &results.circular_references {
            let _ = writeln!(out, "  {} {}", palette.severity(issue.severity), issue.path());
            let _ = writeln!(out, "    rules: {}", join_ids(&issue.involved_rules));
            write_message(&mut out, issue.message.as_deref(), palette);
        }
    }

    if !results.orphaned_facts.is_empty() {
        let _ = writeln!(out, "\nOrphaned facts ({})", results.orphaned_facts.len());
        for issue in &results.orphaned_facts {
            let _ = writeln!(out, "  {} {}", palette.severity(issue.severity), issue.fact);
            let _ = writeln!(out, "    derived by: {}", join_ids(&issue.deriving_rules));
            write_message(&mut out, issue.message.as_deref(), palette);
        }
    }

    out
}

fn write_message(out: &mut String, message: Option<&str>, palette: &Palette) {
    if let Some(message) = message {
        let _ = writeln!(out, "    {}", palette.dim(message));
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render consultation statistics and question usage.
pub fn render_analytics(
    stats: &ViewSlot<ConsultationStats>,
    paths: &ViewSlot<QuestionPaths>,
    palette: &Palette,
) -> String {
    let mut out = String::new();

    match stats {
        ViewSlot::Ready(stats) => {
            let _ = writeln!(out, "Consultations");
            let _ = writeln!(out, "  total:      {}", stats.total_consultations);
            let _ = writeln!(out, "  completed:  {}", stats.completed_consultations);
            let _ = writeln!(out, "  completion: {}%", stats.completion_rate());
            let _ = writeln!(out, "  avg questions: {:.1}", stats.average_questions);
            if !stats.visa_type_stats.is_empty() {
                let _ = writeln!(out, "\nBy category");
                for (category, count) in &stats.visa_type_stats {
                    let _ = writeln!(
                        out,
                        "  {:<8} {:>4}  ({:.0}%)",
                        category,
                        count,
                        stats.category_share(category)
                    );
                }
            }
        }
        ViewSlot::Unavailable { reason } => {
            let _ = writeln!(out, "Statistics unavailable: {}", reason);
        }
        ViewSlot::NotLoaded => {}
    }

    match paths {
        ViewSlot::Ready(paths) => {
            let _ = writeln!(out, "\nMost asked questions");
            for (idx, usage) in paths.most_common_questions.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", idx + 1, usage.fact);
                let _ = writeln!(
                    out,
                    "     {}",
                    palette.dim(&format!(
                        "asked {} time(s), average position {:.1}",
                        usage.usage_count, usage.average_order
                    ))
                );
            }
        }
        ViewSlot::Unavailable { reason } => {
            let _ = writeln!(out, "\nQuestion paths unavailable: {}", reason);
        }
        ViewSlot::NotLoaded => {}
    }

    out
}
