//! Human-readable score breakdowns.
//!
//! Rendering only: every figure comes straight from the `ScoreResult` the
//! pipeline produced, so what is shown always matches what was ranked.

use std::fmt::Write;

use crate::aggregate::TrimMethod;
use crate::types::{Placement, ScoreResult};

/// Qualitative size of the baseline's pull on the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Influence {
    Low,
    Medium,
    High,
}

impl Influence {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.1 {
            Influence::Low
        } else if ratio < 0.3 {
            Influence::Medium
        } else {
            Influence::High
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Influence::Low => "low: plenty of ratings, smoothing barely moves the score",
            Influence::Medium => "medium: a moderate number of ratings, smoothing adjusts the score slightly",
            Influence::High => "high: few ratings, the score is pulled toward the baseline",
        }
    }
}

/// Render the breakdown for one entry in one dimension.
pub fn explain(result: &ScoreResult, dimension: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Entry \"{}\" in [{}]:", result.entry_name, dimension);

    let Some(smoothing) = result.smoothing.as_ref().filter(|_| result.placement.is_ranked()) else {
        if let Some(reason) = result.eligibility.reason() {
            let _ = writeln!(out, "- Not ranked: {} [{}]", reason, reason.code());
        }
        let _ = writeln!(out, "- {}", sample_line(result));
        let _ = writeln!(
            out,
            "- Displayed mean: {:.2} (for reference, not ranked)",
            result.raw_mean
        );
        return out;
    };

    let _ = writeln!(out, "\nBasic calculation:");
    let _ = writeln!(out, "- {}", sample_line(result));

    let robust = &result.robust;
    match robust.method {
        TrimMethod::Trimmed => {
            let _ = writeln!(
                out,
                "- Dropped the highest {} and lowest {} ratings",
                robust.trimmed_per_tail, robust.trimmed_per_tail
            );
            let _ = writeln!(
                out,
                "- Mean of the remaining {} ratings: {:.2}",
                robust.remaining_count, robust.value
            );
        }
        TrimMethod::ArithmeticMean => {
            let _ = writeln!(
                out,
                "- Too few ratings to trim, plain mean: {:.2}",
                robust.value
            );
        }
    }

    let _ = writeln!(out, "\nBayesian smoothing:");
    let _ = writeln!(out, "- Dimension baseline: {:.2}", smoothing.baseline);
    let _ = writeln!(
        out,
        "- Smoothing influence {}",
        Influence::from_ratio(smoothing.baseline_influence).describe()
    );
    let _ = writeln!(out, "- Final score: {:.2}", smoothing.final_score);

    let _ = write!(out, "\nRank: {}", result.placement);
    if let Placement::Ranked { tied: true, .. } = result.placement {
        let _ = write!(out, " (tied)");
    }
    out.push('\n');
    out
}

fn sample_line(result: &ScoreResult) -> String {
    let mut line = format!(
        "{} valid ratings ({} from the jury",
        result.rating_count, result.jury_count
    );
    if result.flagged_count > 0 {
        let _ = write!(line, ", {} flagged for review", result.flagged_count);
    }
    line.push(')');
    line
}
