//! Dino Dodge entry point
//!
//! Browser builds drive the simulation from `requestAnimationFrame` and hand
//! snapshots to the page's JS renderer. Native builds run a headless session
//! with the autopilot at the controls.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::KeyboardEvent;

    use dino_dodge::consts::*;
    use dino_dodge::sim::{GameEvent, GameState, TickInput, tick};
    use dino_dodge::{HighScores, Tuning};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        high_scores: HighScores,
        /// GameOver scene reached and the run recorded
        finished: bool,
    }

    impl Game {
        fn new(seed: u64) -> Result<Self, JsValue> {
            Ok(Self {
                state: new_state(seed)?,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                high_scores: HighScores::load(),
                finished: false,
            })
        }

        fn restart(&mut self, seed: u64) -> Result<(), JsValue> {
            self.state = new_state(seed)?;
            self.accumulator = 0.0;
            self.finished = false;
            log::info!("Game restarted with seed: {}", seed);
            Ok(())
        }

        /// Run simulation ticks, returning the events they produced
        fn update(&mut self, dt: f32) -> Vec<GameEvent> {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut events = Vec::new();
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
                events.extend(self.state.drain_events());
            }

            let reached_game_over = events
                .iter()
                .any(|e| matches!(e, GameEvent::SceneTransition { .. }));
            if reached_game_over && !self.finished {
                self.finished = true;
                if let Some(rank) = self.high_scores.record(&self.state, js_sys::Date::now()) {
                    log::info!("Ranked #{} on the leaderboard", rank);
                }
                self.high_scores.save();
            }

            events
        }

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&format!("Score: {}", self.state.score)));
            }
            if let Some(el) = document.get_element_by_id("best") {
                let best = self.high_scores.top_score().unwrap_or(0);
                el.set_text_content(Some(&format!("Best: {}", best)));
            }
        }

        /// Hand the frame to `window.dinoRender(snapshot, events)` if the page defines it
        fn render(&self, events: &[GameEvent]) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let Ok(render) = js_sys::Reflect::get(&window, &JsValue::from_str("dinoRender")) else {
                return;
            };
            let Some(render) = render.dyn_ref::<js_sys::Function>() else {
                return;
            };

            let snapshot = serde_json::to_string(&self.state.snapshot());
            let events = serde_json::to_string(events);
            match (snapshot, events) {
                (Ok(snapshot), Ok(events)) => {
                    if let Err(e) = render.call2(
                        &JsValue::NULL,
                        &JsValue::from_str(&snapshot),
                        &JsValue::from_str(&events),
                    ) {
                        log::warn!("Render error: {:?}", e);
                    }
                }
                (Err(e), _) | (_, Err(e)) => log::error!("Snapshot encoding failed: {}", e),
            }
        }
    }

    fn new_state(seed: u64) -> Result<GameState, JsValue> {
        GameState::new(seed, Tuning::default()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Dino Dodge starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)?));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone())?;
        request_animation_frame(game);

        log::info!("Dino Dodge running!");
        Ok(())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => g.input.left = true,
                    "ArrowRight" => g.input.right = true,
                    "i" | "I" => {
                        g.input.autopilot = !g.input.autopilot;
                        log::info!("Autopilot: {}", g.input.autopilot);
                    }
                    " " | "Enter" if g.finished => {
                        if let Err(e) = g.restart(js_sys::Date::now() as u64) {
                            log::error!("Restart failed: {:?}", e);
                        }
                    }
                    _ => return,
                }
                event.prevent_default();
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => g.input.left = false,
                    "ArrowRight" => g.input.right = false,
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            let events = g.update(dt);
            g.render(&events);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result};
    use clap::Parser;

    use dino_dodge::consts::SIM_DT;
    use dino_dodge::sim::{GameEvent, GameState, TickInput, tick};
    use dino_dodge::{HighScores, Tuning};

    #[derive(Parser)]
    #[command(name = "dino-dodge")]
    #[command(about = "Play a headless Dino Dodge session with the autopilot")]
    struct Cli {
        /// Run seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// JSON tuning file
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Stop after this many simulated seconds
        #[arg(long, default_value_t = 120.0)]
        seconds: f32,
        /// Leaderboard file
        #[arg(long, default_value = "highscores.json")]
        scores: PathBuf,
        /// Print every game event as JSON
        #[arg(long)]
        events: bool,
    }

    fn now_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let cli = Cli::parse();

        log::info!("Dino Dodge (native) starting...");

        let tuning = match &cli.tuning {
            Some(path) => Tuning::load(path)
                .with_context(|| format!("Failed to load tuning from {}", path.display()))?,
            None => Tuning::default(),
        };
        let seed = cli.seed.unwrap_or_else(|| now_ms() as u64);
        let mut state = GameState::new(seed, tuning).context("Invalid tuning")?;
        log::info!("Game initialized with seed: {}", seed);

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let max_ticks = (cli.seconds / SIM_DT).ceil() as u64;

        'run: for _ in 0..max_ticks {
            tick(&mut state, &input, SIM_DT);
            for event in state.drain_events() {
                if cli.events {
                    println!("{}", serde_json::to_string(&event)?);
                }
                if matches!(event, GameEvent::SceneTransition { .. }) {
                    break 'run;
                }
            }
        }

        let survived = state.died_at_ms.unwrap_or(state.time_ms) / 1000.0;
        if state.is_game_over() {
            println!("Game over: score {} after {:.1}s", state.score, survived);
        } else {
            println!("Still alive: score {} after {:.1}s", state.score, survived);
        }

        let mut scores = HighScores::load_from(&cli.scores);
        if let Some(rank) = scores.record(&state, now_ms()) {
            println!("New high score! Rank #{}", rank);
            scores
                .save_to(&cli.scores)
                .with_context(|| format!("Failed to save {}", cli.scores.display()))?;
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}
