//! Browser host: binds the round controller to the page.
//!
//! Expected markup (ids): screens `loading` (optional), `title`, `game`,
//! `result`; the play area `stage` containing `target`; buttons `startBtn`,
//! `retryBtn`, `backBtn` and optionally `practiceBtn`; HUD fields `time`,
//! `score`, `acc`, `hits`, `misses`; result fields `rScore`, `rAcc`, `rHits`,
//! `rMisses` and optionally `rReaction`. Screens are switched by toggling the
//! `active` class.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, MouseEvent, Window, window};

use crate::config::{RoundConfig, TickSource};
use crate::error::HostError;
use crate::round::hud::{HudUpdate, RoundEvent, RoundSummary};
use crate::round::placement::Surface;
use crate::round::{Mode, RoundController, RoundState};

const LOADING_DELAY_MS: i32 = 1000;
const HIT_PULSE_MS: f64 = 80.0;
const HIT_PULSE_SCALE: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Loading,
    Title,
    Game,
    Result,
}

impl Screen {
    const ALL: [Screen; 4] = [Screen::Loading, Screen::Title, Screen::Game, Screen::Result];

    fn id(self) -> &'static str {
        match self {
            Screen::Loading => "loading",
            Screen::Title => "title",
            Screen::Game => "game",
            Screen::Result => "result",
        }
    }
}

fn show(doc: &Document, screen: Screen) {
    for s in Screen::ALL {
        if let Some(el) = doc.get_element_by_id(s.id()) {
            if let Err(err) = el.class_list().remove_1("active") {
                debug!(?err, screen = s.id(), "could not deactivate screen");
            }
        }
    }
    if let Some(el) = doc.get_element_by_id(screen.id()) {
        if let Err(err) = el.class_list().add_1("active") {
            debug!(?err, screen = screen.id(), "could not activate screen");
        }
    }
}

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn element(doc: &Document, id: &'static str) -> Result<HtmlElement, HostError> {
    doc.get_element_by_id(id)
        .ok_or(HostError::MissingElement(id))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| HostError::NotHtmlElement(id))
}

fn optional_element(doc: &Document, id: &'static str) -> Option<HtmlElement> {
    doc.get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Playable area measured from the stage's bounding box on every query.
struct StageSurface {
    stage: HtmlElement,
}

impl Surface for StageSurface {
    fn size(&self) -> (f64, f64) {
        let rect = self.stage.get_bounding_client_rect();
        (rect.width(), rect.height())
    }
}

struct HudView {
    time: HtmlElement,
    score: HtmlElement,
    accuracy: HtmlElement,
    hits: HtmlElement,
    misses: HtmlElement,
}

impl HudView {
    fn lookup(doc: &Document) -> Result<Self, HostError> {
        Ok(Self {
            time: element(doc, "time")?,
            score: element(doc, "score")?,
            accuracy: element(doc, "acc")?,
            hits: element(doc, "hits")?,
            misses: element(doc, "misses")?,
        })
    }

    fn render(&self, hud: &HudUpdate) {
        self.time.set_text_content(Some(&hud.time_label()));
        self.score.set_text_content(Some(&hud.score.to_string()));
        self.accuracy.set_text_content(Some(&hud.accuracy.to_string()));
        self.hits.set_text_content(Some(&hud.hits.to_string()));
        self.misses.set_text_content(Some(&hud.misses.to_string()));
    }
}

struct ResultView {
    score: HtmlElement,
    accuracy: HtmlElement,
    hits: HtmlElement,
    misses: HtmlElement,
    reaction: Option<HtmlElement>,
}

impl ResultView {
    fn lookup(doc: &Document) -> Result<Self, HostError> {
        Ok(Self {
            score: element(doc, "rScore")?,
            accuracy: element(doc, "rAcc")?,
            hits: element(doc, "rHits")?,
            misses: element(doc, "rMisses")?,
            reaction: optional_element(doc, "rReaction"),
        })
    }

    fn render(&self, summary: &RoundSummary) {
        self.score.set_text_content(Some(&summary.score.to_string()));
        self.accuracy.set_text_content(Some(&summary.accuracy.to_string()));
        self.hits.set_text_content(Some(&summary.hits.to_string()));
        self.misses.set_text_content(Some(&summary.misses.to_string()));
        if let Some(el) = &self.reaction {
            el.set_text_content(Some(&summary.reaction_label()));
        }
    }
}

/// Inline style for the target element.
fn target_style(state: &RoundState, pulsing: bool) -> String {
    if !state.running {
        return "display:none;".to_string();
    }
    let scale = if pulsing { HIT_PULSE_SCALE } else { 1.0 };
    format!(
        "display:block;width:{s}px;height:{s}px;left:{x}px;top:{y}px;transform:scale({scale});",
        s = state.target_size,
        x = state.target_position.x,
        y = state.target_position.y,
    )
}

fn set_target_style(target: &HtmlElement, style: &str) {
    if let Err(err) = target.set_attribute("style", style) {
        debug!(?err, "could not style target");
    }
}

/// Only standard rounds are reported, and only when the config allows it.
fn should_broadcast(config: &RoundConfig, summary: &RoundSummary) -> bool {
    config.broadcast_summary && summary.mode != Mode::Practice
}

/// Post the summary to the embedding frame. Best effort: failures are only
/// logged. Returns whether a message was posted.
fn broadcast(win: &Window, summary: &RoundSummary) -> bool {
    let payload = match summary.to_json() {
        Ok(json) => json,
        Err(err) => {
            debug!(%err, "summary not serializable");
            return false;
        }
    };
    let parent = match win.parent() {
        Ok(Some(parent)) => parent,
        Ok(None) => return false,
        Err(err) => {
            debug!(?err, "no parent frame");
            return false;
        }
    };
    // top-level page: parent is the window itself
    if AsRef::<JsValue>::as_ref(&parent) == AsRef::<JsValue>::as_ref(win) {
        return false;
    }
    match parent.post_message(&JsValue::from_str(&payload), "*") {
        Ok(()) => true,
        Err(err) => {
            debug!(?err, "summary broadcast failed");
            false
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Drives `advance_time`. Callbacks are created once and live for the page's lifetime.
enum Ticker {
    Frame {
        callback: FrameCallback,
        armed: bool,
    },
    Interval {
        ms: u32,
        callback: Closure<dyn FnMut()>,
        handle: Option<i32>,
    },
}

impl Ticker {
    fn new(source: TickSource) -> Self {
        match source {
            TickSource::AnimationFrame => {
                let f: FrameCallback = Rc::new(RefCell::new(None));
                let g = f.clone();
                *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
                    // re-arm only while the round runs; that is the loop's only exit
                    let rearm = with_app(|app| app.on_frame(ts)).unwrap_or(false);
                    if rearm {
                        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
                            if let Err(err) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                                debug!(?err, "requestAnimationFrame failed");
                            }
                        }
                    }
                }) as Box<dyn FnMut(f64)>));
                Ticker::Frame {
                    callback: g,
                    armed: false,
                }
            }
            TickSource::Interval { ms } => {
                let callback = Closure::wrap(Box::new(move || {
                    with_app(|app| app.on_interval());
                }) as Box<dyn FnMut()>);
                Ticker::Interval {
                    ms,
                    callback,
                    handle: None,
                }
            }
        }
    }

    fn start(&mut self, win: &Window) {
        match self {
            Ticker::Frame { callback, armed } => {
                if *armed {
                    return;
                }
                if let Some(cb) = callback.borrow().as_ref() {
                    match win.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        Ok(_) => *armed = true,
                        Err(err) => debug!(?err, "requestAnimationFrame failed"),
                    }
                }
            }
            Ticker::Interval {
                ms,
                callback,
                handle,
            } => {
                if handle.is_some() {
                    return;
                }
                // validated config keeps ms within i32; saturate rather than wrap
                let timeout = i32::try_from(*ms).unwrap_or(i32::MAX);
                match win.set_interval_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    timeout,
                ) {
                    Ok(h) => *handle = Some(h),
                    Err(err) => debug!(?err, "setInterval failed"),
                }
            }
        }
    }

    fn stop(&mut self, win: &Window) {
        // a pending animation frame sees a stopped controller and does not re-arm
        if let Ticker::Interval { handle, .. } = self {
            if let Some(h) = handle.take() {
                win.clear_interval_with_handle(h);
            }
        }
    }
}

struct App {
    win: Window,
    doc: Document,
    controller: RoundController<StageSurface, SmallRng>,
    target: HtmlElement,
    hud: HudView,
    result: ResultView,
    ticker: Ticker,
    last_mode: Mode,
    pulse_until: f64,
}

impl App {
    fn start(&mut self, mode: Mode) {
        self.ticker.stop(&self.win);
        self.last_mode = mode;
        self.pulse_until = 0.0;
        // the stage must be laid out before the first placement measures it
        show(&self.doc, Screen::Game);
        let now = performance_now();
        self.controller.start_round(mode, now);
        self.flush(now);
        self.ticker.start(&self.win);
    }

    fn back_to_title(&mut self) {
        self.ticker.stop(&self.win);
        self.controller.reset();
        self.flush(performance_now());
        show(&self.doc, Screen::Title);
    }

    fn hit(&mut self) {
        let now = performance_now();
        if self.controller.register_hit(now) {
            self.pulse_until = now + HIT_PULSE_MS;
        }
        self.flush(now);
    }

    fn miss(&mut self) {
        self.controller.register_miss();
        self.flush(performance_now());
    }

    fn on_frame(&mut self, ts: f64) -> bool {
        let running = self.controller.advance_time(ts);
        self.flush(ts);
        if let Ticker::Frame { armed, .. } = &mut self.ticker {
            *armed = running;
        }
        running
    }

    fn on_interval(&mut self) {
        let now = performance_now();
        self.controller.advance_time(now);
        self.flush(now);
    }

    /// Render everything the controller queued, then the target.
    fn flush(&mut self, now: f64) {
        for event in self.controller.drain_events() {
            match event {
                RoundEvent::Hud(hud) => self.hud.render(&hud),
                RoundEvent::Summary(summary) => self.finish(&summary),
            }
        }
        let style = target_style(self.controller.state(), now < self.pulse_until);
        set_target_style(&self.target, &style);
    }

    fn finish(&mut self, summary: &RoundSummary) {
        self.ticker.stop(&self.win);
        self.result.render(summary);
        show(&self.doc, Screen::Result);
        if should_broadcast(self.controller.config(), summary) {
            broadcast(&self.win, summary);
        }
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn with_app<T>(f: impl FnOnce(&mut App) -> T) -> Option<T> {
    APP.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn on_click(
    el: &HtmlElement,
    mut handler: impl FnMut(&MouseEvent) + 'static,
) -> Result<(), HostError> {
    let closure = Closure::wrap(Box::new(move |evt: MouseEvent| handler(&evt)) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Look up the page, install listeners and show the title (after the loading screen).
pub(crate) fn mount(config: RoundConfig) -> Result<(), HostError> {
    if APP.with(|cell| cell.borrow().is_some()) {
        debug!("aim trainer already mounted");
        return Ok(());
    }
    let win = window().ok_or(HostError::NoWindow)?;
    let doc = win.document().ok_or(HostError::NoDocument)?;

    // resolve all required elements before touching anything
    for screen in [Screen::Title, Screen::Game, Screen::Result] {
        element(&doc, screen.id())?;
    }
    let stage = element(&doc, "stage")?;
    let target = element(&doc, "target")?;
    let start_btn = element(&doc, "startBtn")?;
    let retry_btn = element(&doc, "retryBtn")?;
    let back_btn = element(&doc, "backBtn")?;
    let practice_btn = optional_element(&doc, "practiceBtn");
    let hud = HudView::lookup(&doc)?;
    let result = ResultView::lookup(&doc)?;

    let ticker = Ticker::new(config.tick);
    let controller = RoundController::new(
        config,
        StageSurface {
            stage: stage.clone(),
        },
        SmallRng::from_entropy(),
    );
    let app = App {
        win: win.clone(),
        doc: doc.clone(),
        controller,
        target: target.clone(),
        hud,
        result,
        ticker,
        last_mode: Mode::Standard,
        pulse_until: 0.0,
    };
    set_target_style(&target, &target_style(app.controller.state(), false));
    APP.with(|cell| cell.replace(Some(app)));

    on_click(&target, |evt| {
        // a hit must never reach the stage's miss handler
        evt.stop_propagation();
        with_app(App::hit);
    })?;
    on_click(&stage, |_| {
        with_app(App::miss);
    })?;
    on_click(&start_btn, |_| {
        with_app(|app| app.start(Mode::Standard));
    })?;
    on_click(&retry_btn, |_| {
        with_app(|app| app.start(app.last_mode));
    })?;
    on_click(&back_btn, |_| {
        with_app(App::back_to_title);
    })?;
    if let Some(btn) = practice_btn {
        on_click(&btn, |_| {
            with_app(|app| app.start(Mode::Practice));
        })?;
    }

    if doc.get_element_by_id(Screen::Loading.id()).is_some() {
        show(&doc, Screen::Loading);
        let to_title = Closure::once_into_js(move || {
            with_app(|app| show(&app.doc, Screen::Title));
        });
        win.set_timeout_with_callback_and_timeout_and_arguments_0(
            to_title.unchecked_ref(),
            LOADING_DELAY_MS,
        )?;
    } else {
        show(&doc, Screen::Title);
    }
    debug!("aim trainer mounted");
    Ok(())
}
