//! Deflector entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, HtmlInputElement};

    use deflector::consts::*;
    use deflector::gateway::rest::RestGateway;
    use deflector::gateway::{GatewayRequest, LeaderboardGateway, execute};
    use deflector::ui::{Hud, LeaderboardView};
    use deflector::{GameSession, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        settings: Settings,
        gateway: Option<Rc<RestGateway>>,
        last_time: f64,
        /// Last HUD pushed to the page, to skip redundant DOM writes
        last_hud: Option<Hud>,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            let gateway = settings
                .gateway()
                .cloned()
                .map(|config| Rc::new(RestGateway::new(config)));
            Self {
                session: GameSession::new(seed, Tuning::default(), gateway.is_some()),
                settings,
                gateway,
                last_time: 0.0,
                last_hud: None,
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let hud = self.session.hud();
            if self.last_hud.as_ref() == Some(&hud) {
                return;
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            set_text(&document, "hud-score", &hud.score);
            set_text(&document, "hud-lives", &"♥".repeat(hud.lives as usize));
            set_text(&document, "hud-deflectors", &"◆".repeat(hud.deflectors as usize));

            match &hud.boss {
                Some(panel) => {
                    show(&document, "boss-panel", true);
                    set_text(&document, "boss-label", &panel.label);
                    if let Some(fill) = html_element(&document, "boss-bar-fill") {
                        let _ = fill
                            .style()
                            .set_property("width", &format!("{}px", panel.fill_width));
                    }
                }
                None => show(&document, "boss-panel", false),
            }

            match &hud.game_over {
                Some(panel) => {
                    show(&document, "game-over", true);
                    set_text(&document, "game-over-title", &panel.title);
                    set_text(&document, "final-score", &panel.final_score);
                    show(&document, "restart-prompt", panel.restart_prompt.is_some());
                    if let Some(prompt) = &panel.restart_prompt {
                        set_text(&document, "restart-prompt", prompt);
                    }
                    set_text(&document, "leaderboard-message", panel.message.as_deref().unwrap_or(""));

                    let form_visible = matches!(panel.leaderboard, LeaderboardView::Form { .. });
                    let was_visible = self
                        .last_hud
                        .as_ref()
                        .and_then(|h| h.game_over.as_ref())
                        .is_some_and(|p| matches!(p.leaderboard, LeaderboardView::Form { .. }));
                    show(&document, "leaderboard-form", form_visible);
                    if form_visible && !was_visible {
                        prefill_form(&document, &self.settings);
                    }
                    show(&document, "leaderboard-busy", panel.leaderboard == LeaderboardView::Busy);
                    match &panel.leaderboard {
                        LeaderboardView::Table(rows) => {
                            show(&document, "leaderboard", true);
                            fill_table(&document, rows);
                        }
                        _ => show(&document, "leaderboard", false),
                    }
                }
                None => show(&document, "game-over", false),
            }

            self.last_hud = Some(hud);
        }

        fn restart(&mut self) {
            let seed = js_sys::Date::now() as u64;
            if self.session.restart(seed) {
                self.last_hud = None;
            }
        }
    }

    fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn input_value(document: &Document, id: &str) -> String {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn prefill_form(document: &Document, settings: &Settings) {
        for (id, value) in [("name-input", &settings.last_name), ("email-input", &settings.last_email)] {
            if let Some(input) = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                input.set_value(value);
            }
        }
    }

    fn fill_table(document: &Document, rows: &[deflector::ScoreRow]) {
        let Some(body) = document.get_element_by_id("leaderboard-body") else {
            return;
        };
        body.set_text_content(None);

        if rows.is_empty() {
            if let Ok(tr) = document.create_element("tr") {
                if let Ok(td) = document.create_element("td") {
                    let _ = td.set_attribute("colspan", "3");
                    td.set_text_content(Some("No scores yet!"));
                    let _ = tr.append_child(&td);
                }
                let _ = body.append_child(&tr);
            }
            return;
        }

        for (index, row) in rows.iter().enumerate() {
            let Ok(tr) = document.create_element("tr") else {
                continue;
            };
            for cell in [(index + 1).to_string(), row.name.clone(), row.score.to_string()] {
                if let Ok(td) = document.create_element("td") {
                    td.set_text_content(Some(&cell));
                    let _ = tr.append_child(&td);
                }
            }
            let _ = body.append_child(&tr);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Deflector starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));
        log::info!("Game initialized with seed: {}", seed);

        // Grab an anonymous session up front so the first submit is quick
        let gateway = game.borrow().gateway.clone();
        match gateway {
            Some(gateway) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = gateway.sign_in_anonymous().await {
                    log::error!("Anonymous sign-in failed: {}", e);
                }
            }),
            None => log::warn!("No leaderboard backend configured"),
        }

        setup_input_handlers(game.clone());
        setup_leaderboard_form(game.clone());
        setup_restart_button(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Deflector running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                // Let the form fields have their keys
                if event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some()
                {
                    return;
                }
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => g.session.input.left = true,
                    "ArrowRight" => g.session.input.right = true,
                    "ArrowUp" => g.session.input.up = true,
                    "ArrowDown" => g.session.input.down = true,
                    " " => g.session.input.fire = true,
                    "b" | "B" => g.session.input.force_boss = true, // Debug: summon next boss
                    "r" | "R" => g.restart(),
                    _ => return,
                }
                event.prevent_default();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => g.session.input.left = false,
                    "ArrowRight" => g.session.input.right = false,
                    "ArrowUp" => g.session.input.up = false,
                    "ArrowDown" => g.session.input.down = false,
                    " " => g.session.input.fire = false,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_leaderboard_form(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("submit-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                    return;
                };
                let name = input_value(&document, "name-input");
                let email = input_value(&document, "email-input");

                let mut g = game.borrow_mut();
                match g.session.submit_score(&name, &email) {
                    Ok(()) => {
                        g.settings.remember_entry(&name, &email);
                        g.settings.save();
                    }
                    Err(e) => {
                        log::warn!("Submission rejected: {}", e);
                        set_text(&document, "leaderboard-message", &e.to_string());
                    }
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Reload from the leaderboard view
        if let Some(btn) = document.get_element_by_id("play-again-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                if let Some(window) = web_sys::window() {
                    let _ = window.location().reload();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Run queued backend requests; results come back through the session,
    /// which drops them if a restart happened meanwhile
    fn dispatch_requests(game: &Rc<RefCell<Game>>, requests: Vec<GatewayRequest>) {
        let Some(gateway) = game.borrow().gateway.clone() else {
            return;
        };
        for request in requests {
            let game = game.clone();
            let gateway = gateway.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let response = execute(gateway.as_ref(), &request).await;
                game.borrow_mut()
                    .session
                    .on_gateway_response(request.generation, response);
            });
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let requests = {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            for event in g.session.update(dt) {
                log::debug!("{:?}", event);
            }
            g.update_hud();
            g.session.take_requests()
        };

        dispatch_requests(&game, requests);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use deflector::consts::SIM_DT;
    use deflector::sim::GameEvent;
    use deflector::{GameSession, MemoryGateway, Tuning};

    env_logger::init();
    log::info!("Deflector (native) starting...");
    log::info!("Native mode runs a scripted headless session - serve the wasm build to play");

    // Weave up and down while firing until the run ends or time runs out
    let mut session = GameSession::new(2024, Tuning::default(), true);
    let gateway = MemoryGateway::new();
    let frames = 60 * 60 * 5;
    for frame in 0..frames {
        let input = &mut session.input;
        let phase = (frame / 90) % 2 == 0;
        input.up = phase;
        input.down = !phase;
        input.fire = frame % 10 < 5;

        for event in session.update(SIM_DT) {
            match event {
                GameEvent::BossSpawned { .. }
                | GameEvent::BossDefeated { .. }
                | GameEvent::GameOver { .. } => log::info!("{:?}", event),
                other => log::debug!("{:?}", other),
            }
        }
        if session.state.is_over() {
            break;
        }
    }

    pollster::block_on(session.run_requests(&gateway));

    let hud = session.hud();
    println!("{}", hud.score);
    println!("Lives: {}  Deflectors: {}", hud.lives, hud.deflectors);
    if let Some(panel) = hud.game_over {
        println!("{}  {}", panel.title, panel.final_score);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
