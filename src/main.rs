//! Eyes Off entry point
//!
//! Web: wires DOM pointer/keyboard events into the game and runs the
//! animation-frame loop. Native: plays one scripted match headless.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use eyes_off::Game;
    use eyes_off::consts::*;
    use eyes_off::platform::{LocalStorage, SystemClock};
    use eyes_off::runtime::{InputEvent, KeyInput};

    /// Longest frame step fed to the game (ticks); longer gaps are clamped
    const MAX_FRAME_TICKS: f32 = 6.0;

    struct App {
        game: Game,
        canvas: HtmlCanvasElement,
        last_time: f64,
    }

    impl App {
        /// Canvas-relative pixels to game coordinates
        fn to_game(&self, event: &MouseEvent) -> (f32, f32) {
            let w = self.canvas.client_width().max(1) as f32;
            let h = self.canvas.client_height().max(1) as f32;
            (
                event.offset_x() as f32 * WIDTH / w,
                event.offset_y() as f32 * HEIGHT / h,
            )
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) as f32 / MS_PER_TICK).min(MAX_FRAME_TICKS)
            } else {
                1.0
            };
            self.last_time = time;
            self.game.tick(dt);
        }
    }

    fn key_input(event: &KeyboardEvent) -> Option<KeyInput> {
        match event.key().as_str() {
            "Enter" => Some(KeyInput::Enter),
            "Backspace" => Some(KeyInput::Backspace),
            key => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(KeyInput::Char(c)),
                    _ => None,
                }
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {}", e).into());
        }

        log::info!("Eyes Off starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let mut game = Game::new(Rc::new(SystemClock::new()), Rc::new(LocalStorage));
        game.start();
        let app = Rc::new(RefCell::new(App {
            game,
            canvas: canvas.clone(),
            last_time: 0.0,
        }));

        setup_pointer_handlers(&canvas, app.clone());
        setup_keyboard_handler(&document, app.clone());

        request_animation_frame(app);

        log::info!("Eyes Off running!");
        Ok(())
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse move - absolute canvas position scaled to game space
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let (x, y) = a.to_game(&event);
                a.game.handle_input(InputEvent::PointerMove { x, y });
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                app.borrow_mut().game.handle_input(InputEvent::PointerDown {
                    button: event.button(),
                });
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().game.handle_input(InputEvent::PointerUp);
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse leave
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().game.handle_input(InputEvent::PointerLeave);
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard_handler(document: &web_sys::Document, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(key) = key_input(&event) {
                // Keep Backspace from navigating back
                if key == KeyInput::Backspace {
                    event.prevent_default();
                }
                app.borrow_mut().game.handle_input(InputEvent::Key(key));
            }
        });
        let _ =
            document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            log::error!("no window for animation frame");
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Eyes Off (native) starting...");
    log::info!("Native mode plays a scripted match - run with `trunk serve` for the web version");

    headless::run(std::env::args().nth(1));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::rc::Rc;

    use eyes_off::consts::{HEIGHT, MS_PER_TICK, WIDTH};
    use eyes_off::levels::{LevelKind, ScriptedContent};
    use eyes_off::platform::{FileStorage, ManualClock, MemoryStorage, Storage};
    use eyes_off::runtime::{GameMode, InputEvent, KeyInput};
    use eyes_off::{Game, format_time};

    /// Give up if the match has not finished after this many ticks
    const MAX_TICKS: u32 = 60 * 60 * 10;

    /// Ticks of scripted play per level, plus one violation on levels with a
    /// penalty
    fn script(kind: LevelKind) -> ScriptedContent {
        let length = 300.0 + kind.number() as f32 * 120.0;
        let violations = if kind.penalty().is_some() {
            vec![length / 2.0]
        } else {
            Vec::new()
        };
        ScriptedContent::new(length, violations)
    }

    fn click_at(game: &mut Game, x: f32, y: f32) {
        game.handle_input(InputEvent::PointerMove { x, y });
        game.handle_input(InputEvent::PointerDown { button: 0 });
        game.handle_input(InputEvent::PointerUp);
    }

    /// Play one scripted match. `data_dir` keeps the leaderboard between runs.
    pub fn run(data_dir: Option<String>) {
        let storage: Rc<dyn Storage> = match data_dir {
            Some(dir) => {
                log::info!("Storing data under {}", dir);
                Rc::new(FileStorage::new(dir))
            }
            None => Rc::new(MemoryStorage::new()),
        };
        let clock = ManualClock::new();
        let mut game = Game::with_level_content(Rc::new(clock.clone()), storage, |kind| {
            Box::new(script(kind))
        });
        game.start();

        click_at(&mut game, WIDTH / 2.0, HEIGHT / 2.0);
        for c in "Headless Crew".chars() {
            game.handle_input(InputEvent::Key(KeyInput::Char(c)));
        }
        game.handle_input(InputEvent::Key(KeyInput::Enter));
        // Tutorial ready button
        click_at(&mut game, WIDTH / 2.0, 850.0);

        let mut ticks = 0;
        while game.mode() != GameMode::Results && ticks < MAX_TICKS {
            clock.advance(MS_PER_TICK as f64);
            game.tick(1.0);
            ticks += 1;
        }

        if game.mode() != GameMode::Results {
            log::error!("Match did not finish in {} ticks (mode {:?})", ticks, game.mode());
            return;
        }

        let data = game.match_data();
        println!("\nTeam: {}", data.team_name);
        for level in &data.level_times {
            println!("  {} {:<16} {}", level.level, level.name, format_time(level.time));
        }
        println!(
            "Total: {} (penalties {})",
            format_time(data.total_time),
            format_time(game.timer().penalties())
        );
        println!("\nLeaderboard:");
        for (i, entry) in game.leaderboard().top_entries(5).iter().enumerate() {
            println!(
                "  {}. {:<20} {}",
                i + 1,
                entry.team_name,
                format_time(entry.total_time)
            );
        }
    }
}
