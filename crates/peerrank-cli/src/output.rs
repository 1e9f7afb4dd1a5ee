//! Plain-text rendering of a competition ranking.

use std::fmt::Write;

use peerrank_core::{CompetitionRanking, DimensionRanking, ScoreResult};

const NAME_WIDTH: usize = 28;

pub fn render_text(ranking: &CompetitionRanking) -> String {
    let mut out = String::new();

    for dimension in ranking.dimensions.values() {
        render_dimension(&mut out, dimension);
        out.push('\n');
    }

    let preferred: Vec<_> = ranking.preferred().collect();
    let _ = writeln!(out, "Preferred entries ({}):", preferred.len());
    if preferred.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for pref in preferred {
        let _ = writeln!(
            out,
            "  {} - top in {}/{} ranked dimensions: {}",
            pref.entry_id,
            pref.top_dimensions.len(),
            pref.ranked_dimensions,
            pref.top_dimensions.join(", ")
        );
    }
    out
}

fn render_dimension(out: &mut String, dimension: &DimensionRanking) {
    let baseline = &dimension.baseline;
    let _ = writeln!(
        out,
        "[{}] baseline {:.2}{}",
        dimension.dimension,
        baseline.value,
        if baseline.defaulted { " (default)" } else { "" }
    );
    let _ = writeln!(
        out,
        "  {:<8} {:<width$} {:>7} {:>7} {:>6}  note",
        "rank",
        "entry",
        "final",
        "mean",
        "weight",
        width = NAME_WIDTH
    );

    for result in &dimension.results {
        let _ = writeln!(out, "  {}", row(result));
    }
}

fn row(result: &ScoreResult) -> String {
    let final_score = result
        .final_score()
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "-".to_string());
    let note = result
        .eligibility
        .reason()
        .map(|r| r.code().to_string())
        .unwrap_or_default();

    format!(
        "{:<8} {:<width$} {:>7} {:>7.2} {:>6}  {}",
        result.placement.display(),
        truncate(&result.entry_name, NAME_WIDTH),
        final_score,
        result.raw_mean,
        result.weighted_count,
        note,
        width = NAME_WIDTH
    )
    .trim_end()
    .to_string()
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let head: String = name.chars().take(width - 1).collect();
        format!("{}~", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_names() {
        assert_eq!(truncate("Star Explorer", 28), "Star Explorer");
        assert_eq!(truncate("abcdef", 4), "abc~");
    }
}
