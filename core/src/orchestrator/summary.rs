//! End-of-run report

use std::fmt::Write;

use crate::stats::StatsSnapshot;

const RULE: &str = "==========================================";

/// Render the final statistics block for a finished run
///
/// Pure function of the snapshot; totals are derived from the per-kind
/// counters so they always add up.
pub fn final_summary(stats: &StatsSnapshot) -> String {
    let mut out = String::new();

    // writes to a String cannot fail
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "           Final Statistics");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Runtime: {:.1} seconds\n", stats.elapsed.as_secs_f64());

    let _ = writeln!(out, "Messages Sent:");
    for k in &stats.kinds {
        let label = format!("{}:", k.kind.label());
        let _ = writeln!(out, "  {label:<15}{:>8} (errors: {})", k.sent, k.errors);
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Total: {} messages (errors: {})",
        stats.total_sent(),
        stats.total_errors()
    );
    let _ = writeln!(out, "Average Rate: {:.2} msg/s", stats.rate());
    let _ = write!(out, "{RULE}");

    out
}
