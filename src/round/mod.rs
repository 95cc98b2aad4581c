//! Round controller: timing, target sizing/placement, scoring and hit/miss
//! accounting for one timed aim round.
//!
//! The controller never touches the page. Hosts feed it timestamps and
//! classified clicks, then drain [`RoundEvent`]s and read the target
//! geometry back to render it. All timestamps are monotonic milliseconds
//! (e.g. `performance.now()`).

pub mod hud;
pub mod placement;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::RoundConfig;
use hud::{HudUpdate, RoundEvent, RoundSummary, accuracy};
use placement::{Point, Surface, lerp, place_target};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Ended,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Standard,
    Practice,
}

/// Mutable per-round record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoundState {
    pub time_remaining: f64,
    pub score: i64,
    pub hits: u32,
    pub misses: u32,
    pub shots: u32,
    pub target_size: f64,
    pub target_position: Point,
    pub running: bool,
    pub last_spawn_ms: f64,
}

pub struct RoundController<S, R> {
    config: RoundConfig,
    surface: S,
    rng: R,
    state: RoundState,
    phase: Phase,
    mode: Mode,
    started_at: f64,
    ends_at: f64,
    reaction_samples: Vec<f64>,
    events: Vec<RoundEvent>,
}

impl<S: Surface, R: Rng> RoundController<S, R> {
    pub fn new(config: RoundConfig, surface: S, rng: R) -> Self {
        let state = RoundState {
            time_remaining: config.duration_secs,
            target_size: config.size_start,
            ..RoundState::default()
        };
        Self {
            config,
            surface,
            rng,
            state,
            phase: Phase::Idle,
            mode: Mode::Standard,
            started_at: 0.0,
            ends_at: 0.0,
            reaction_samples: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Begin a fresh round at `now`. Always a full reset, whatever the current phase.
    pub fn start_round(&mut self, mode: Mode, now: f64) {
        self.reset();
        self.mode = mode;
        self.phase = Phase::Running;
        self.started_at = now;
        self.ends_at = now + self.config.duration_ms();
        self.state.running = true;
        self.state.last_spawn_ms = now;
        self.state.target_position = self.place_target(self.state.target_size);
        debug!(?mode, ends_at = self.ends_at, "round started");
        self.emit_hud();
    }

    /// Bring time and target size up to `now`. Returns whether the round is still running.
    pub fn advance_time(&mut self, now: f64) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let duration_ms = self.config.duration_ms();
        let elapsed = (now - self.started_at).max(0.0);
        let p = (elapsed / duration_ms).clamp(0.0, 1.0);

        let size = lerp(self.config.size_start, self.config.size_end, p);
        self.state.target_size = self.state.target_size.min(size);
        let remaining = if now >= self.ends_at {
            0.0
        } else {
            ((duration_ms - elapsed) / 1000.0).clamp(0.0, self.config.duration_secs)
        };
        self.state.time_remaining = self.state.time_remaining.min(remaining);
        self.emit_hud();

        if self.state.time_remaining <= 0.0 {
            self.end_round();
            return false;
        }
        true
    }

    /// Count a click on the target. Ignored unless a round is running.
    pub fn register_hit(&mut self, now: f64) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.state.hits += 1;
        self.state.shots += 1;
        self.state.score += self.config.hit_score;
        if self.config.track_reaction {
            self.reaction_samples.push((now - self.state.last_spawn_ms).max(0.0));
        }
        self.state.target_position = self.place_target(self.state.target_size);
        self.state.last_spawn_ms = now;
        trace!(hits = self.state.hits, score = self.state.score, "hit");
        self.emit_hud();
        true
    }

    /// Count a click on the background. The target stays where it is.
    pub fn register_miss(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.state.misses += 1;
        self.state.shots += 1;
        self.state.score += self.config.miss_score;
        trace!(misses = self.state.misses, score = self.state.score, "miss");
        self.emit_hud();
        true
    }

    /// Finish the running round and queue its summary. No-op in any other phase.
    pub fn end_round(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::Ended;
        self.state.running = false;
        let summary = self.summary();
        info!(
            score = summary.score,
            hits = summary.hits,
            misses = summary.misses,
            accuracy = summary.accuracy,
            mode = ?summary.mode,
            "round ended"
        );
        self.events.push(RoundEvent::Summary(summary));
    }

    /// Random position for a target of `size` on the current surface.
    pub fn place_target(&mut self, size: f64) -> Point {
        place_target(
            &mut self.rng,
            self.surface.size(),
            size,
            self.config.margin,
            self.config.spawn,
        )
    }

    /// Drop any round in progress and return to Idle. Queued events are discarded.
    pub fn reset(&mut self) {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "round reset");
        }
        self.phase = Phase::Idle;
        self.state = RoundState {
            time_remaining: self.config.duration_secs,
            target_size: self.config.size_start,
            ..RoundState::default()
        };
        self.reaction_samples.clear();
        self.events.clear();
        self.started_at = 0.0;
        self.ends_at = 0.0;
    }

    pub fn hud(&self) -> HudUpdate {
        HudUpdate {
            time_remaining: self.state.time_remaining,
            score: self.state.score,
            hits: self.state.hits,
            misses: self.state.misses,
            accuracy: accuracy(self.state.hits, self.state.shots),
        }
    }

    fn summary(&self) -> RoundSummary {
        let avg_reaction_ms = if self.config.track_reaction && !self.reaction_samples.is_empty() {
            Some(self.reaction_samples.iter().sum::<f64>() / self.reaction_samples.len() as f64)
        } else {
            None
        };
        RoundSummary {
            score: self.state.score,
            hits: self.state.hits,
            misses: self.state.misses,
            shots: self.state.shots,
            accuracy: accuracy(self.state.hits, self.state.shots),
            avg_reaction_ms,
            mode: self.mode,
        }
    }

    fn emit_hud(&mut self) {
        let hud = self.hud();
        self.events.push(RoundEvent::Hud(hud));
    }

    /// Take every notification queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn target_visible(&self) -> bool {
        self.state.running
    }
}
