use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::Window,
};

use std::sync::Arc;
use tracing::info;

// Import from the library crate
use duelbox::{logging, ui};

use duelbox::controller::{FrameLoop, InputState, KeyBindings, RapierPhysics};
use duelbox::model::arena::PHYSICS_DT;
use duelbox::model::{Arena, Camera, PlayerId};
use duelbox::ui::Hud;
use duelbox::view::{GpuContext, RenderState, Renderer};

/// Translate a winit logical key into the key ids the bindings use.
/// Character keys are lowercased so Shift never breaks movement.
fn key_id(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.as_str().to_lowercase()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        Key::Named(NamedKey::Enter) => Some("Enter".to_string()),
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp".to_string()),
        Key::Named(NamedKey::ArrowDown) => Some("ArrowDown".to_string()),
        Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft".to_string()),
        Key::Named(NamedKey::ArrowRight) => Some("ArrowRight".to_string()),
        _ => None,
    }
}

struct App {
    window: Arc<Window>,
    size: winit::dpi::PhysicalSize<u32>,
    render_state: RenderState,

    // Game state
    camera: Camera,
    physics: RapierPhysics,
    frame_loop: FrameLoop,
    input_state: InputState,
    hud: Hud,
    fire_keys: [(String, PlayerId); 2],

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,

    // Frame timing
    last_frame_time: std::time::Instant,
    fps: f32,
    frame_count: u32,
    fps_timer: f32,
}

impl App {
    async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        // Initialize wgpu
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone()).unwrap();
        let gpu = GpuContext::new(&instance, surface, size.width, size.height).await;

        // Initialize game systems
        let arena = Arena::standard();
        let bindings = [KeyBindings::player_one(), KeyBindings::player_two()];
        let fire_keys = [
            (bindings[0].fire.clone(), PlayerId::One),
            (bindings[1].fire.clone(), PlayerId::Two),
        ];
        let mut physics = RapierPhysics::new();
        let frame_loop = FrameLoop::new(&arena, &mut physics, bindings);

        let render_state = RenderState::new(gpu, &arena);
        let camera = Camera::new(size.width, size.height);

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        Self {
            window,
            size,
            render_state,
            camera,
            physics,
            frame_loop,
            input_state: InputState::new(),
            hud: Hud::new(),
            fire_keys,
            egui_ctx,
            egui_state,
            last_frame_time: std::time::Instant::now(),
            fps: 0.0,
            frame_count: 0,
            fps_timer: 0.0,
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // First let egui process the event
        let egui_captured = self
            .egui_state
            .on_window_event(self.window.as_ref(), event)
            .consumed;
        if egui_captured {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if let Some(id) = key_id(&key_event.logical_key) {
                    match key_event.state {
                        ElementState::Pressed => {
                            // Fire is edge-triggered: one shot per discrete
                            // press, never on key auto-repeat.
                            if !key_event.repeat {
                                for (fire_key, player) in &self.fire_keys {
                                    if &id == fire_key {
                                        self.input_state.request_fire(*player);
                                    }
                                }
                            }
                            self.input_state.set_key(&id, true);
                        }
                        ElementState::Released => {
                            self.input_state.set_key(&id, false);
                        }
                    }
                }
                true
            }
            WindowEvent::Focused(false) => {
                // Focus loss - clear all keys
                self.input_state.clear_keys();
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.render_state.resize(new_size.width, new_size.height);
            self.camera.set_aspect(new_size.width, new_size.height);
        }
    }

    fn update(&mut self, dt: f32) {
        // Update FPS
        self.frame_count += 1;
        self.fps_timer += dt;
        if self.fps_timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
        }

        // One fixed-step match tick per frame
        let events = self
            .frame_loop
            .tick(&mut self.physics, &mut self.input_state, PHYSICS_DT);
        for event in &events {
            self.hud.apply_event(event);
        }
        self.hud.tick(dt);
        self.hud.fps = self.fps;
    }

    fn render_ui(&mut self) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let hud = &self.hud;
        let mut full_output = self.egui_ctx.run(raw_input, |ctx| ui::build_hud(ctx, hud));
        self.egui_state.handle_platform_output(
            &self.window,
            std::mem::take(&mut full_output.platform_output),
        );

        let dpr = self.window.scale_factor() as f32;
        let primitives = self
            .egui_ctx
            .tessellate(std::mem::take(&mut full_output.shapes), dpr);
        self.render_state.egui_primitives = Some(primitives);
        self.render_state.egui_full_output = Some(full_output);
        self.render_state.egui_dpr = dpr;
    }

    fn render(&mut self) {
        self.render_ui();
        let snapshot = self.frame_loop.state().snapshot();
        self.render_state.draw(&snapshot, &self.camera);
    }
}

fn main() {
    logging::init();
    info!("starting duelbox");

    let event_loop = EventLoop::new().unwrap();
    let window_attributes = Window::default_attributes()
        .with_title("Duelbox")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = event_loop.create_window(window_attributes).unwrap();
    let window = Arc::new(window);

    let mut app = pollster::block_on(App::new(window.clone()));

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let now = std::time::Instant::now();
                            let dt = (now - app.last_frame_time).as_secs_f32();
                            app.last_frame_time = now;

                            app.update(dt);
                            app.render();
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        })
        .unwrap();
}
