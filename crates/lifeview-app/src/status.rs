//! One-line status text for a rendered frame.

use std::fmt::Write as _;

use lifeview_types::FrameInfo;

/// Format the status bar shown after each frame.
///
/// Only occupied tiers are listed, each as icon, label and group count.
pub fn status_line(info: &FrameInfo, evolution_speed_ms: u64) -> String {
    let mut line = format!(
        "#{frame} [{mode}] gen {generation} | live {live} | species {species} | t {t}s | {evolution_speed_ms} ms | size {size}px | seed {count} ({pct}%)",
        frame = info.frame,
        mode = info.mode,
        generation = info.generation,
        live = info.live_cells,
        species = info.species_count,
        t = info.evolution_time_seconds,
        size = info.cell_size,
        count = info.cell_count,
        pct = info.density_percent(),
    );
    let mut tiers = info.stages.occupied().peekable();
    if tiers.peek().is_some() {
        line.push_str(" |");
        for (tier, count) in tiers {
            let _ = write!(line, " {} {} {}", tier.icon(), tier.label(), count);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use lifeview_types::{RunMode, Stage, StageDistribution};

    use super::*;

    fn info(stages: StageDistribution) -> FrameInfo {
        FrameInfo {
            frame: 12,
            generation: 340,
            live_cells: 812,
            species_count: 3,
            stages,
            evolution_time_seconds: 340,
            mode: RunMode::Running,
            cell_size: 4,
            cell_count: 8000,
            density: 0.2,
            rendered_at: Utc::now(),
        }
    }

    #[test]
    fn counters_and_mode_are_listed() {
        let line = status_line(&info(StageDistribution::default()), 1000);
        assert_eq!(
            line,
            "#12 [running] gen 340 | live 812 | species 3 | t 340s | 1000 ms | size 4px | seed 8000 (20%)"
        );
    }

    #[test]
    fn only_occupied_tiers_are_shown() {
        let stages = StageDistribution::from_stages([Stage(1), Stage(1), Stage(4)]);
        let line = status_line(&info(stages), 500);
        let first = Stage(1).tier();
        let fourth = Stage(4).tier();
        let expected = format!(
            " | {} {} 2 {} {} 1",
            first.icon(),
            first.label(),
            fourth.icon(),
            fourth.label()
        );
        assert!(line.ends_with(&expected), "{line}");
        assert!(!line.contains(Stage(5).tier().icon()));
    }
}
