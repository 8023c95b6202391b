use crate::colors::{ColorAssignment, assign_colors};
use crate::error::PipelineError;
use crate::map::{MapDocument, compose_map};
use crate::report::render_legend;
use crate::state::AppState;
use drivetime_router::{IsochroneRetriever, IsochroneSource, RetrievalStats};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::info;

/// Result of one full render pass.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub map: MapDocument,
    pub colors: ColorAssignment,
    pub legend_html: String,
    /// Provider activity during this pass only.
    pub stats: RetrievalStats,
}

/// Rebuilds the whole map from the current state.
pub async fn render_pass<S: IsochroneSource>(
    state: &AppState,
    retriever: &mut IsochroneRetriever<S>,
    show_progress: bool,
) -> Result<RenderOutput, PipelineError> {
    let before = retriever.stats();
    let colors = assign_colors(state.companies());

    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Calculating drive-time radius...");
        Some(pb)
    } else {
        None
    };

    let report = |position: usize, total: usize, label: &str| {
        if let Some(ref pb) = spinner {
            pb.set_message(format!(
                "Calculating drive-time radius... [{}/{}] {}",
                position, total, label
            ));
        }
    };

    let composed = compose_map(state, &colors, retriever, Some(&report)).await;

    if let Some(ref pb) = spinner {
        pb.finish_and_clear();
    }
    let map = composed?;

    let after = retriever.stats();
    let stats = RetrievalStats {
        hits: after.hits - before.hits,
        calls: after.calls - before.calls,
        failures: after.failures - before.failures,
    };
    info!(
        "Rendered {} layers ({} provider calls, {} cache hits)",
        map.layers.len(),
        stats.calls,
        stats.hits
    );

    Ok(RenderOutput {
        legend_html: render_legend(&colors),
        map,
        colors,
        stats,
    })
}
