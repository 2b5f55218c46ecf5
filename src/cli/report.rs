//! Read-only admin commands: rule base validation and analytics.

use tracing::{info, warn};

use super::CliResult;
use crate::engine::EngineClient;
use crate::model::ViewSlot;
use crate::trace::text::{render_analytics, render_validation, Palette};

/// Fetch and render the rule base validation report.
///
/// Exits non-zero only when the report could not be fetched; a report that
/// lists issues is still a successful run.
pub async fn execute_validate(client: &EngineClient, palette: &Palette) -> CliResult {
    let report = ViewSlot::from_result(client.validation_report().await);

    match &report {
        ViewSlot::Ready(r) => info!(
            is_valid = r.is_valid,
            issues = r.issue_count(),
            "Validation report loaded"
        ),
        ViewSlot::Unavailable { reason } => warn!(reason = %reason, "Validation report unavailable"),
        ViewSlot::NotLoaded => {}
    }

    let message = render_validation(&report, palette);
    if report.is_unavailable() {
        CliResult::error(message)
    } else {
        CliResult::success(message)
    }
}

/// Fetch consultation statistics and question usage together.
///
/// Either half may fail on its own; the other is still shown.
pub async fn execute_stats(client: &EngineClient, limit: u32, palette: &Palette) -> CliResult {
    let (stats, paths) = tokio::join!(client.consultation_stats(), client.question_paths(limit));
    let stats = ViewSlot::from_result(stats);
    let paths = ViewSlot::from_result(paths);

    let message = render_analytics(&stats, &paths, palette);
    if stats.is_unavailable() && paths.is_unavailable() {
        CliResult::error(message)
    } else {
        CliResult::success(message)
    }
}
