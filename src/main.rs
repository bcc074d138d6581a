//! Ball Sort entry point
//!
//! The browser build drives the session from DOM clicks; the native build
//! plays the same session on the terminal.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element};

    use ball_sort::GameConfig;
    use ball_sort::audio::AudioManager;
    use ball_sort::sim::{GameEvent, LossReason, Session, TapOutcome};

    /// Game instance holding all state
    struct Game {
        session: Session,
        audio: AudioManager,
        /// Bumped to invalidate a scheduled outcome
        generation: u32,
    }

    impl Game {
        fn new(session: Session) -> Self {
            Self {
                session,
                audio: AudioManager::new(),
                generation: 0,
            }
        }

        /// Apply queued session events to the page
        fn flush_events(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let Some(document) = window.document() else {
                return;
            };

            for event in self.session.drain_events() {
                match event {
                    GameEvent::BoardChanged | GameEvent::SelectionChanged(_) => {
                        self.render(&document)
                    }
                    GameEvent::ScoreChanged(score) => update_score(&document, score),
                    GameEvent::LevelChanged(level) => {
                        log::info!("Level: {} tubes x {}", level.tube_count, level.capacity)
                    }
                    GameEvent::PlaySound(cue) => self.audio.play(cue),
                    GameEvent::ShowWinMessage => {
                        let _ = window.alert_with_message("Congratulations! Level complete!");
                    }
                    GameEvent::ShowLossMessage(reason) => {
                        let text = match reason {
                            LossReason::NoLegalMoves => "Game Over! No moves left.",
                            LossReason::Repetition => "Game Over! You repeated the same moves.",
                        };
                        let _ = window.alert_with_message(text);
                    }
                }
            }
        }

        /// Rebuild the tube elements from the session snapshot
        fn render(&self, document: &Document) {
            let Some(container) = document.query_selector(".game-container").ok().flatten()
            else {
                log::warn!("No .game-container element");
                return;
            };
            container.set_inner_html("");

            let view = self.session.view();
            for (i, tube) in view.tubes.iter().enumerate() {
                let Ok(tube_el) = document.create_element("div") else {
                    continue;
                };
                let mut class = String::from("tubo");
                if tube.locked {
                    class.push_str(" completo inalteravel");
                    let _ = tube_el
                        .set_attribute("style", "border-color: #4caf50; background: #222b;");
                }
                if tube.selected {
                    class.push_str(" selected");
                }
                tube_el.set_class_name(&class);
                let _ = tube_el.set_attribute("data-index", &i.to_string());

                for ball in &tube.balls {
                    let Ok(ball_el) = document.create_element("div") else {
                        continue;
                    };
                    ball_el.set_class_name("bola");
                    let style =
                        format!("background: {}; border-color: {};", ball.fill, ball.border);
                    let _ = ball_el.set_attribute("style", &style);
                    let _ = tube_el.append_child(&ball_el);
                }
                let _ = container.append_child(&tube_el);
            }
        }
    }

    /// Score line above the tubes, created on first use
    fn update_score(document: &Document, score: u32) {
        let placar = match document.get_element_by_id("placar") {
            Some(el) => el,
            None => {
                let Ok(el) = document.create_element("div") else {
                    return;
                };
                el.set_id("placar");
                if let Some(container) = document.query_selector(".game-container").ok().flatten()
                {
                    if let Some(parent) = container.parent_node() {
                        let _ = parent.insert_before(&el, Some(&container));
                    }
                }
                el
            }
        };
        placar.set_text_content(Some(&format!("Score: {}", score)));
    }

    /// Resolve the pending outcome after the configured pause, unless a reset
    /// or a newer outcome bumped the generation first
    fn schedule_outcome(game: Rc<RefCell<Game>>) {
        let (generation, delay) = {
            let mut g = game.borrow_mut();
            g.generation += 1;
            (g.generation, g.session.config().outcome_delay_ms)
        };
        let callback = Closure::once_into_js(move || {
            let mut g = game.borrow_mut();
            if g.generation == generation {
                g.session.resolve_pending();
                g.flush_events();
            }
        });
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay as i32,
            );
        }
    }

    fn setup_tube_clicks(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(container) = document.query_selector(".game-container").ok().flatten() else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
            let index = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(".tubo").ok().flatten())
                .and_then(|tube| tube.get_attribute("data-index"))
                .and_then(|s| s.parse::<usize>().ok());
            let Some(index) = index else { return };

            let outcome = {
                let mut g = game.borrow_mut();
                let outcome = g.session.handle_tube_selected(index);
                g.flush_events();
                outcome
            };
            if let TapOutcome::Moved { verdict, .. } = outcome {
                if verdict.is_terminal() {
                    schedule_outcome(game.clone());
                }
            }
        });
        let _ =
            container.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_reset_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("reset") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.generation += 1;
                g.session.reset_game();
                g.flush_events();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let seed = js_sys::Date::now() as u64;
        log::info!("Ball Sort starting with seed: {}", seed);

        let session = match Session::new(GameConfig::default(), seed) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Cannot start: {}", e);
                return;
            }
        };
        let game = Rc::new(RefCell::new(Game::new(session)));
        setup_tube_clicks(game.clone());
        setup_reset_button(game.clone());
        game.borrow_mut().flush_events();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::io::{self, BufRead, Write};
    use std::time::Duration;

    use ball_sort::sim::{GameEvent, LossReason, Session, TapOutcome};
    use ball_sort::{ConfigError, GameConfig};

    fn print_board(session: &Session) {
        println!(
            "\nScore {}  |  {} tubes x {}",
            session.score(),
            session.level().tube_count,
            session.level().capacity
        );
        for (i, tube) in session.board().tubes().iter().enumerate() {
            let marker = if tube.is_locked() {
                '#'
            } else if session.selected() == Some(i) {
                '*'
            } else {
                ' '
            };
            let balls: Vec<String> = tube.balls().iter().map(|b| b.color.key()).collect();
            println!(
                "{}{:>2} [{}] {}/{}",
                marker,
                i,
                balls.join(" "),
                tube.len(),
                tube.capacity()
            );
        }
    }

    fn report(session: &mut Session) {
        for event in session.drain_events() {
            match event {
                GameEvent::ShowWinMessage => println!("Level complete!"),
                GameEvent::ShowLossMessage(LossReason::NoLegalMoves) => {
                    println!("Game over: no moves left.")
                }
                GameEvent::ShowLossMessage(LossReason::Repetition) => {
                    println!("Game over: repeated moves.")
                }
                other => log::trace!("{:?}", other),
            }
        }
    }

    pub fn run(config: GameConfig, seed: u64) -> Result<(), ConfigError> {
        let mut session = Session::new(config, seed)?;
        report(&mut session);
        print_board(&session);
        println!("Enter a tube number to select/move, 'r' to reset, 'q' to quit.");

        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match line.trim() {
                "q" => break,
                "r" => session.reset_game(),
                input => match input.parse::<usize>() {
                    Ok(index) => {
                        let outcome = session.handle_tube_selected(index);
                        if let TapOutcome::Moved { verdict, .. } = outcome {
                            if verdict.is_terminal() {
                                report(&mut session);
                                print_board(&session);
                                let delay = session.config().outcome_delay_ms;
                                std::thread::sleep(Duration::from_millis(u64::from(delay)));
                                session.resolve_pending();
                            }
                        } else if outcome == TapOutcome::Ignored {
                            println!("(ignored)");
                        }
                    }
                    Err(_) => println!("Unknown command: {}", input),
                },
            }
            report(&mut session);
            print_board(&session);
            let _ = io::stdout().flush();
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match ball_sort::GameConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => ball_sort::GameConfig::default(),
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    log::info!("Ball Sort (native) starting with seed {}", seed);

    if let Err(e) = terminal::run(config, seed) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
