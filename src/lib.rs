//! Aim Trainer core crate.
//!
//! A timed round where the player clicks a shrinking, relocating target for
//! points. [`round::RoundController`] holds all game rules and runs natively;
//! the `web` module mounts it onto a page when built for wasm.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod round;
mod web;

pub use config::{RoundConfig, TickSource};
pub use error::{ConfigError, HostError};
pub use round::hud::{HudUpdate, RoundEvent, RoundSummary, accuracy};
pub use round::placement::{FixedSurface, Point, SpawnPattern, Surface};
pub use round::{Mode, Phase, RoundController, RoundState};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Mount the game onto the current page. `config_json` is an optional, possibly
/// partial `RoundConfig` object; omitted keys keep the standard benchmark values.
#[wasm_bindgen]
pub fn start_aim_trainer(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(json) => RoundConfig::from_json(json).map_err(HostError::from)?,
        None => RoundConfig::default(),
    };
    web::mount(config)?;
    Ok(())
}
