//! VR Lab entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlSelectElement, KeyboardEvent, MouseEvent,
        PageTransitionEvent,
    };

    use vr_lab::classify::{Classifier, ImageSource, ScriptClassifier};
    use vr_lab::interaction::{self, Command, HeadPose};
    use vr_lab::persistence::{LocalStorage, MemoryStorage, Store};
    use vr_lab::platform::dom::ListenerGuard;
    use vr_lab::progress::{MissionId, MissionStatus};
    use vr_lab::renderer::{RenderState, SetupError};
    use vr_lab::session::{ClassificationTicket, DisplayMode, Followup, Notice, Session};
    use vr_lab::{ProgressTracker, QualityTier, Tuning};

    /// How long a toast stays visible (ms)
    const TOAST_MS: f64 = 5000.0;

    /// Buttons wired 1:1 to commands
    const BUTTON_IDS: [&str; 9] = [
        "btn-fire",
        "btn-spawn",
        "btn-mix",
        "btn-circuit",
        "btn-reset",
        "btn-ai",
        "mission-spill",
        "mission-pendulum",
        "mission-circuit",
    ];

    // JS binding for WebXR (not exposed by stable web-sys).
    // The headset layer shows the lab canvas, copied once per XR frame into
    // every eye's viewport.
    #[wasm_bindgen(inline_js = "
        export async function request_immersive_session() {
            const xr = navigator.xr;
            if (!xr) {
                throw new Error('WebXR is not available in this browser');
            }
            const supported = await xr.isSessionSupported('immersive-vr');
            if (!supported) {
                throw new Error('immersive-vr sessions are not supported on this device');
            }
            const session = await xr.requestSession('immersive-vr', { optionalFeatures: ['local-floor'] });
            try {
                const gl = document.createElement('canvas').getContext('webgl2', { xrCompatible: true });
                if (!gl) {
                    throw new Error('WebGL2 is needed to present in the headset');
                }
                session.updateRenderState({ baseLayer: new XRWebGLLayer(session, gl) });
                session.vrlabGl = gl;
                try {
                    session.vrlabSpace = await session.requestReferenceSpace('local-floor');
                    session.vrlabHeight = 0;
                } catch (_) {
                    session.vrlabSpace = await session.requestReferenceSpace('local');
                    session.vrlabHeight = 1.6;
                }
            } catch (e) {
                session.end().catch(() => {});
                throw e;
            }
            session.addEventListener('end', () => window.dispatchEvent(new Event('vrlab-xr-end')));
            return session;
        }

        export function end_immersive_session(session) {
            session.end().catch(() => {});
        }

        export function xr_request_frame(session, callback) {
            session.requestAnimationFrame(callback);
        }

        export function xr_viewer_pose(session, frame) {
            const pose = frame.getViewerPose(session.vrlabSpace);
            if (!pose) {
                return new Float32Array(0);
            }
            const p = pose.transform.position;
            const q = pose.transform.orientation;
            return new Float32Array([p.x, p.y + session.vrlabHeight, p.z, q.x, q.y, q.z, q.w]);
        }

        function mirror_program(gl) {
            const compile = (type, source) => {
                const shader = gl.createShader(type);
                gl.shaderSource(shader, source);
                gl.compileShader(shader);
                return shader;
            };
            const program = gl.createProgram();
            gl.attachShader(program, compile(gl.VERTEX_SHADER, `#version 300 es
                out vec2 uv;
                void main() {
                    vec2 p = vec2(float((gl_VertexID << 1) & 2), float(gl_VertexID & 2));
                    uv = vec2(p.x, 1.0 - p.y);
                    gl_Position = vec4(p * 2.0 - 1.0, 0.0, 1.0);
                }`));
            gl.attachShader(program, compile(gl.FRAGMENT_SHADER, `#version 300 es
                precision mediump float;
                uniform sampler2D src;
                in vec2 uv;
                out vec4 color;
                void main() { color = texture(src, uv); }`));
            gl.linkProgram(program);
            const texture = gl.createTexture();
            gl.bindTexture(gl.TEXTURE_2D, texture);
            gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_MIN_FILTER, gl.LINEAR);
            gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_WRAP_S, gl.CLAMP_TO_EDGE);
            gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_WRAP_T, gl.CLAMP_TO_EDGE);
            return { program, texture };
        }

        export function xr_present_canvas(session, frame, canvas) {
            const gl = session.vrlabGl;
            const layer = session.renderState.baseLayer;
            const pose = frame.getViewerPose(session.vrlabSpace);
            if (!gl || !layer || !pose) {
                return;
            }
            session.vrlabMirror ??= mirror_program(gl);
            const { program, texture } = session.vrlabMirror;
            gl.bindTexture(gl.TEXTURE_2D, texture);
            gl.texImage2D(gl.TEXTURE_2D, 0, gl.RGBA, gl.RGBA, gl.UNSIGNED_BYTE, canvas);
            gl.bindFramebuffer(gl.FRAMEBUFFER, layer.framebuffer);
            gl.useProgram(program);
            for (const view of pose.views) {
                const vp = layer.getViewport(view);
                gl.viewport(vp.x, vp.y, vp.width, vp.height);
                gl.drawArrays(gl.TRIANGLES, 0, 3);
            }
        }
    ")]
    extern "C" {
        #[wasm_bindgen(catch)]
        async fn request_immersive_session() -> Result<JsValue, JsValue>;
        fn end_immersive_session(session: &JsValue);
        fn xr_request_frame(session: &JsValue, callback: &js_sys::Function);
        fn xr_viewer_pose(session: &JsValue, frame: &JsValue) -> js_sys::Float32Array;
        fn xr_present_canvas(session: &JsValue, frame: &JsValue, canvas: &HtmlCanvasElement);
    }

    /// App instance holding all state
    struct Game {
        session: Session<RenderState>,
        tracker: ProgressTracker,
        classifier: Rc<ScriptClassifier>,
        canvas: HtmlCanvasElement,
        // HUD refresh tracking
        hud_revision: Option<u64>,
        hud_goggles: Option<bool>,
        toast_until: f64,
        /// Headset session while immersive; frames are then paced by it
        xr_session: Option<JsValue>,
        /// Bumped when the loop is restarted so callbacks queued earlier stop
        loop_epoch: u64,
    }

    impl Game {
        /// Size the canvas backing store for the tier's pixel ratio
        fn resize_canvas(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = canvas_size(&window, &self.canvas, self.tracker.quality());
            self.session.resize(width, height);
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, now: f64) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let goggles = self.session.lab().is_some_and(|lab| lab.safety_gate());
            let revision = self.tracker.revision();
            if self.hud_revision != Some(revision) || self.hud_goggles != Some(goggles) {
                self.hud_revision = Some(revision);
                self.hud_goggles = Some(goggles);
                self.render_progress(&document, goggles);
            }

            for notice in self.session.take_notices() {
                show_toast(&document, &notice);
                self.toast_until = now + TOAST_MS;
            }
            if self.toast_until > 0.0 && now > self.toast_until {
                self.toast_until = 0.0;
                if let Some(el) = document.get_element_by_id("toast") {
                    let _ = el.set_attribute("class", "toast hidden");
                }
            }
        }

        fn render_progress(&self, document: &Document, goggles: bool) {
            if let Some(el) = document.get_element_by_id("hud-xp") {
                el.set_text_content(Some(&self.tracker.xp().to_string()));
            }

            if let Some(el) = document.get_element_by_id("hud-badges") {
                let badges = self.tracker.badges();
                let text = if badges.is_empty() {
                    "None".to_string()
                } else {
                    badges.iter().cloned().collect::<Vec<_>>().join(", ")
                };
                el.set_text_content(Some(&text));
            }

            if let Some(el) = document.get_element_by_id("hud-goggles") {
                el.set_text_content(Some(if goggles { "ON" } else { "OFF" }));
            }

            for id in MissionId::ALL {
                let Some(el) = document.get_element_by_id(&format!("mission-{}", id.as_str())) else {
                    continue;
                };
                let (suffix, class) = match self.tracker.mission(id).status() {
                    MissionStatus::Unstarted => ("", "mission"),
                    MissionStatus::Accepted => (" (accepted)", "mission accepted"),
                    MissionStatus::Done => (" \u{2713}", "mission done"),
                };
                el.set_text_content(Some(&format!("{}{}", id.title(), suffix)));
                let _ = el.set_attribute("class", class);
            }
        }
    }

    fn show_toast(document: &Document, notice: &Notice) {
        let Some(el) = document.get_element_by_id("toast") else {
            return;
        };
        let kind = match notice {
            Notice::Info(_) => "info",
            Notice::Warning(_) => "warning",
            Notice::Error(_) => "error",
        };
        el.set_text_content(Some(notice.text()));
        let _ = el.set_attribute("class", &format!("toast {}", kind));
    }

    fn show_setup_error(message: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("setup-error") {
            el.set_text_content(Some(message));
            let _ = el.set_attribute("class", "");
        }
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }
    }

    /// Backing-store size in device pixels, capped by the tier's pixel ratio
    fn canvas_size(window: &web_sys::Window, canvas: &HtmlCanvasElement, tier: QualityTier) -> (u32, u32) {
        let dpr = tier.pixel_ratio(window.device_pixel_ratio());
        let width = ((canvas.client_width().max(1) as f64) * dpr) as u32;
        let height = ((canvas.client_height().max(1) as f64) * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn open_store() -> Store {
        match LocalStorage::open() {
            Some(storage) => Store::new(storage),
            None => {
                log::warn!("localStorage unavailable, progress will not persist");
                Store::new(MemoryStorage::new())
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("VR Lab starting...");

        if let Err(e) = start().await {
            log::error!("Setup failed: {}", e);
            show_setup_error(&e.to_string());
        }
    }

    async fn start() -> Result<(), SetupError> {
        let window = web_sys::window().ok_or(SetupError::NoWindow)?;
        let document = window.document().ok_or(SetupError::NoWindow)?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
            .ok_or(SetupError::MissingElement("canvas"))?;

        let tracker = ProgressTracker::new(open_store());
        let tier = tracker.quality();
        let (width, height) = canvas_size(&window, &canvas, tier);

        // Initialize WebGPU (WebGL2 fallback)
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, tier).await?;

        let seed = js_sys::Date::now() as u64;
        let mut session = Session::new(Tuning::default(), seed);
        session.resize(width, height);
        session.start(Some(render_state), tier);

        log::info!("Lab initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            tracker,
            classifier: Rc::new(ScriptClassifier::new()),
            canvas: canvas.clone(),
            hud_revision: None,
            hud_goggles: None,
            toast_until: 0.0,
            xr_session: None,
            loop_epoch: 0,
        }));

        if let Some(select) = document
            .get_element_by_id("quality-select")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            select.set_value(tier.as_str());
        }

        setup_input_handlers(&window, &document, &canvas, &game);
        setup_buttons(&document, &game);
        setup_lifecycle(&window, &game);

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        // Start frame loop
        schedule_frame(game);

        log::info!("VR Lab running!");
        Ok(())
    }

    /// Attach a listener owned by the session's registrations
    fn listen(
        game: &Rc<RefCell<Game>>,
        target: &web_sys::EventTarget,
        event: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) {
        match ListenerGuard::attach(target, event, handler) {
            Ok(guard) => game.borrow_mut().session.registrations_mut().hold(event, guard),
            Err(e) => log::warn!("Failed to attach '{}' listener: {:?}", event, e),
        }
    }

    /// Dispatch a command and start any follow-up work
    fn issue(game: &Rc<RefCell<Game>>, command: Command) {
        let followup = {
            let mut g = game.borrow_mut();
            let Game { session, tracker, .. } = &mut *g;
            let followup = session.dispatch(command, tracker);
            if matches!(command, Command::SetQuality(_)) {
                g.resize_canvas();
            }
            followup
        };

        if let Followup::Classify(ticket) = followup {
            spawn_classification(game.clone(), ticket);
        }
    }

    fn spawn_classification(game: Rc<RefCell<Game>>, ticket: ClassificationTicket) {
        let classifier = {
            let mut g = game.borrow_mut();
            g.session
                .notify(Notice::Info("Running AI demo (first run loads the model)...".into()));
            g.classifier.clone()
        };
        wasm_bindgen_futures::spawn_local(async move {
            // No borrow is held across this await
            let result = classifier.classify(&ImageSource::demo()).await;
            let mut g = game.borrow_mut();
            let Game { session, tracker, .. } = &mut *g;
            session.finish_classification(ticket, result, tracker);
        });
    }

    async fn enter_immersive(game: Rc<RefCell<Game>>) {
        if game.borrow().xr_session.is_some() {
            return;
        }
        match request_immersive_session().await {
            Ok(xr_session) => {
                let mut g = game.borrow_mut();
                if !g.session.is_running() {
                    end_immersive_session(&xr_session);
                    return;
                }
                g.session.set_display_mode(DisplayMode::Immersive);
                let held = xr_session.clone();
                g.session
                    .registrations_mut()
                    .on_release("xr-session", move || end_immersive_session(&held));
                // The next window frame hands the loop over to the headset
                g.xr_session = Some(xr_session);
                g.session
                    .notify(Notice::Info("Immersive session started".into()));
            }
            Err(e) => {
                let message = js_sys::Reflect::get(&e, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
                    .unwrap_or_else(|| format!("{:?}", e));
                game.borrow_mut()
                    .session
                    .notify(Notice::Error(format!("VR unavailable: {}", message)));
            }
        }
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
        game: &Rc<RefCell<Game>>,
    ) {
        // Keyboard
        {
            let g = game.clone();
            listen(game, window, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if let Some(command) = interaction::key_command(&event.key()) {
                    if command == Command::Fire {
                        event.prevent_default();
                    }
                    issue(&g, command);
                }
            });
        }

        // Pointer teleport
        {
            let g = game.clone();
            let canvas_clone = canvas.clone();
            listen(game, canvas, "click", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                issue(
                    &g,
                    Command::TeleportAt {
                        x: event.offset_x() as f32,
                        y: event.offset_y() as f32,
                        width: canvas_clone.client_width() as f32,
                        height: canvas_clone.client_height() as f32,
                    },
                );
            });
        }

        // Quality select
        if let Some(select) = document
            .get_element_by_id("quality-select")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            let g = game.clone();
            let select_clone = select.clone();
            listen(game, &select, "change", move |_event| {
                if let Some(command) = interaction::quality_command(&select_clone.value()) {
                    issue(&g, command);
                }
            });
        }

        // Resize
        {
            let g = game.clone();
            listen(game, window, "resize", move |_event| {
                g.borrow_mut().resize_canvas();
            });
        }
    }

    fn setup_buttons(document: &Document, game: &Rc<RefCell<Game>>) {
        for id in BUTTON_IDS {
            let (Some(button), Some(command)) =
                (document.get_element_by_id(id), interaction::button_command(id))
            else {
                log::debug!("Button #{} not wired", id);
                continue;
            };
            let g = game.clone();
            listen(game, &button, "click", move |_event| issue(&g, command));
        }

        if let Some(button) = document.get_element_by_id("btn-vr") {
            let g = game.clone();
            listen(game, &button, "click", move |_event| {
                wasm_bindgen_futures::spawn_local(enter_immersive(g.clone()));
            });
        }
    }

    fn setup_lifecycle(window: &web_sys::Window, game: &Rc<RefCell<Game>>) {
        // Headset session ended (by us or by the user agent). Its frame
        // callbacks stop, so the window takes the loop back.
        {
            let g = game.clone();
            listen(game, window, "vrlab-xr-end", move |_event| {
                let running = {
                    let mut game = g.borrow_mut();
                    game.xr_session = None;
                    game.session.set_display_mode(DisplayMode::Flat);
                    game.session.is_running()
                };
                if running {
                    restart_loop(&g);
                }
            });
        }

        // Page going away. A page entering the back/forward cache is kept alive.
        {
            let g = game.clone();
            listen(game, window, "pagehide", move |event| {
                if is_persisted(&event) {
                    log::info!("Page cached, keeping session");
                    return;
                }
                // This handler is one of the listeners being released, so the
                // release runs once it has returned
                let g = g.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let registrations = std::mem::take(g.borrow_mut().session.registrations_mut());
                    drop(registrations);
                    g.borrow_mut().session.teardown();
                });
            });
        }

        // Restored from the back/forward cache
        {
            let g = game.clone();
            listen(game, window, "pageshow", move |event| {
                if is_persisted(&event) && g.borrow().session.is_running() {
                    log::info!("Page restored, resuming frame loop");
                    restart_loop(&g);
                }
            });
        }
    }

    fn is_persisted(event: &web_sys::Event) -> bool {
        event
            .dyn_ref::<PageTransitionEvent>()
            .is_some_and(|e| e.persisted())
    }

    /// Start a fresh loop; callbacks queued by the previous one end on arrival
    fn restart_loop(game: &Rc<RefCell<Game>>) {
        game.borrow_mut().loop_epoch += 1;
        schedule_frame(game.clone());
    }

    /// Queue the next frame on the headset while immersive, else on the window
    fn schedule_frame(game: Rc<RefCell<Game>>) {
        let (xr_session, epoch) = {
            let g = game.borrow();
            (g.xr_session.clone(), g.loop_epoch)
        };

        match xr_session {
            Some(xr_session) => {
                let closure = Closure::once(move |time: f64, xr_frame: JsValue| {
                    frame_loop(game, epoch, time, Some(xr_frame));
                });
                xr_request_frame(&xr_session, closure.as_ref().unchecked_ref());
                closure.forget();
            }
            None => {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let closure = Closure::once(move |time: f64| {
                    frame_loop(game, epoch, time, None);
                });
                let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn frame_loop(game: Rc<RefCell<Game>>, epoch: u64, time: f64, xr_frame: Option<JsValue>) {
        let keep_running = {
            let mut g = game.borrow_mut();
            if g.loop_epoch != epoch {
                return;
            }

            // Headset frames: view from the reported pose, then show the result
            let xr = g.xr_session.clone().zip(xr_frame);
            if let Some((xr_session, xr_frame)) = &xr {
                let components = xr_viewer_pose(xr_session, xr_frame).to_vec();
                if let Some(pose) = HeadPose::from_components(&components) {
                    g.session.set_head_pose(pose);
                }
            }

            if g.session.frame(time) {
                if let Some((xr_session, xr_frame)) = &xr {
                    xr_present_canvas(xr_session, xr_frame, &g.canvas);
                }
                g.update_hud(time);
                true
            } else {
                false
            }
        };

        if keep_running {
            schedule_frame(game);
        } else {
            log::info!("Frame loop stopped");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    //! Scripted session without a GPU, for smoke runs and tuning checks

    use vr_lab::classify::{Classifier, FixedClassifier, ImageSource};
    use vr_lab::persistence::{MemoryStorage, Store};
    use vr_lab::progress::MissionId;
    use vr_lab::renderer::{Frame, FrameSink};
    use vr_lab::scene::StationId;
    use vr_lab::session::{Followup, Session};
    use vr_lab::{Command, ProgressTracker, QualityTier, Tuning};

    /// Counts frames instead of drawing them
    #[derive(Default)]
    struct HeadlessSink {
        frames: u64,
        vertices: usize,
    }

    impl FrameSink for HeadlessSink {
        fn present(&mut self, frame: &Frame) {
            self.frames += 1;
            self.vertices = frame.vertices.len();
        }

        fn resize(&mut self, width: u32, height: u32) {
            log::debug!("Headless resize {}x{}", width, height);
        }

        fn set_quality(&mut self, tier: QualityTier) {
            log::debug!("Headless quality {}", tier.as_str());
        }
    }

    pub fn run(tuning: Tuning) {
        let mut tracker = ProgressTracker::new(Store::new(MemoryStorage::new()));
        let mut session = Session::new(tuning, 42);
        session.start(Some(HeadlessSink::default()), tracker.quality());

        let script = [
            (0, Command::AcceptMission(MissionId::Spill)),
            (10, Command::Teleport(StationId::Physics)),
            (20, Command::Fire),
            (30, Command::SpawnBody),
            (60, Command::Teleport(StationId::Chemistry)),
            (70, Command::Mix),
            (80, Command::ToggleSafetyGate),
            (90, Command::Mix),
            (120, Command::Teleport(StationId::Ai)),
            (130, Command::BuildCircuit),
            (140, Command::RunClassification),
        ];

        let classifier = FixedClassifier::demo();
        let mut now = 0.0;
        for frame in 0..300u32 {
            for (_, command) in script.iter().filter(|(at, _)| *at == frame) {
                if let Followup::Classify(ticket) = session.dispatch(*command, &mut tracker) {
                    let result = pollster::block_on(classifier.classify(&ImageSource::demo()));
                    session.finish_classification(ticket, result, &mut tracker);
                }
            }
            session.frame(now);
            now += 1000.0 / 60.0;

            for notice in session.take_notices() {
                println!("[{:>3}] {:?}", frame, notice);
            }
        }

        if let (Some(lab), Some(sink)) = (session.lab(), session.sink()) {
            println!(
                "\n{} frames, {} vertices in the last one, lab clock {:.2}s",
                sink.frames,
                sink.vertices,
                lab.time()
            );
            println!(
                "Pendulum theta {:.3} rad, {} projectiles, {} cubes",
                lab.pendulum.theta,
                lab.launcher.bodies().len(),
                lab.drop_zone.bodies().len()
            );
        }
        println!(
            "XP {}, badges {:?}",
            tracker.xp(),
            tracker.badges().iter().collect::<Vec<_>>()
        );
        for id in MissionId::ALL {
            println!("  {:<24} {:?}", id.title(), tracker.mission(id).status());
        }

        session.teardown();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("VR Lab (native) starting...");
    log::info!("Native mode runs a headless scripted session - run with `trunk serve` for the web version");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| vr_lab::Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                vr_lab::Tuning::default()
            }
        },
        None => vr_lab::Tuning::default(),
    };

    headless::run(tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
