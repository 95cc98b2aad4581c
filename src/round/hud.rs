//! Notifications the controller hands to its host.

use serde::Serialize;

use super::Mode;

/// Percentage of shots that hit, rounded half away from zero. 0 when nothing was fired.
pub fn accuracy(hits: u32, shots: u32) -> u32 {
    if shots == 0 {
        return 0;
    }
    let (hits, shots) = (u64::from(hits.min(shots)), u64::from(shots));
    ((200 * hits + shots) / (2 * shots)) as u32
}

/// Live readout shown during a round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudUpdate {
    pub time_remaining: f64,
    pub score: i64,
    pub hits: u32,
    pub misses: u32,
    pub accuracy: u32,
}

impl HudUpdate {
    /// Seconds left with one decimal, as the timer label shows it.
    pub fn time_label(&self) -> String {
        format!("{:.1}", self.time_remaining)
    }
}

/// Final numbers for a finished round.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub score: i64,
    pub hits: u32,
    pub misses: u32,
    pub shots: u32,
    pub accuracy: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_reaction_ms: Option<f64>,
    pub mode: Mode,
}

impl RoundSummary {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Average reaction rounded to whole milliseconds, or a dash when none was recorded.
    pub fn reaction_label(&self) -> String {
        match self.avg_reaction_ms {
            Some(ms) => format!("{}ms", ms.round() as i64),
            None => "-".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RoundEvent {
    Hud(HudUpdate),
    Summary(RoundSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_zero_without_shots() {
        assert_eq!(accuracy(0, 0), 0);
    }

    #[test]
    fn accuracy_rounds_half_up() {
        assert_eq!(accuracy(3, 4), 75);
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(2, 3), 67);
        // 12.5 and 87.5
        assert_eq!(accuracy(1, 8), 13);
        assert_eq!(accuracy(7, 8), 88);
        assert_eq!(accuracy(5, 5), 100);
        assert_eq!(accuracy(0, 9), 0);
    }

    #[test]
    fn accuracy_bounded() {
        for shots in 1..=60u32 {
            for hits in 0..=shots {
                let a = accuracy(hits, shots);
                assert!(a <= 100);
                let expected = (100.0 * hits as f64 / shots as f64).round() as u32;
                assert_eq!(a, expected, "hits {hits} shots {shots}");
            }
        }
    }

    #[test]
    fn time_label_one_decimal() {
        let hud = HudUpdate { time_remaining: 29.96, score: 0, hits: 0, misses: 0, accuracy: 0 };
        assert_eq!(hud.time_label(), "30.0");
        let hud = HudUpdate { time_remaining: 0.0, ..hud };
        assert_eq!(hud.time_label(), "0.0");
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = RoundSummary {
            score: 28,
            hits: 3,
            misses: 1,
            shots: 4,
            accuracy: 75,
            avg_reaction_ms: Some(412.5),
            mode: Mode::Standard,
        };
        let json = summary.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"score":28,"hits":3,"misses":1,"shots":4,"accuracy":75,"avgReactionMs":412.5,"mode":"standard"}"#
        );
        assert_eq!(summary.reaction_label(), "413ms");

        let untracked = RoundSummary { avg_reaction_ms: None, mode: Mode::Practice, ..summary };
        assert!(!untracked.to_json().unwrap().contains("avgReactionMs"));
        assert_eq!(untracked.reaction_label(), "-");
    }
}
