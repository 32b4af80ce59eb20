//! Interactive ballpit window.
//!
//! Draws the ensemble with egui, forwards pointer and touch input to the
//! shared tracker, and rebuilds the ensemble whenever the watched config
//! file changes.

use ballpit_core::{
    Ballpit, InstanceTransform, PointerTracker, Rect, RenderBackend, SimulationConfig, SurfaceId,
    Viewport,
};
use eframe::egui;
use glam::Vec3;
use notify::{Event, RecommendedWatcher, Watcher};
use std::cell::Cell;
use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;

const CANVAS: SurfaceId = SurfaceId(1);

pub fn open(config_path: Option<PathBuf>, seed: u64) -> Result<(), Box<dyn Error>> {
    let config = crate::load_config(config_path.as_deref())?;
    eframe::run_native(
        "Ballpit",
        eframe::NativeOptions::default(),
        Box::new(move |_cc| {
            let app = ViewerApp::new(config, config_path, seed)?;
            Ok(Box::new(app) as Box<dyn eframe::App>)
        }),
    )?;
    Ok(())
}

/// Keeps the latest frame for painting
#[derive(Default)]
struct PaintBackend {
    instances: Vec<InstanceTransform>,
    colors: Vec<egui::Color32>,
}

impl RenderBackend for PaintBackend {
    fn set_colors(&mut self, instance_colors: &[Vec3], _light_color: Vec3) {
        self.colors = instance_colors
            .iter()
            .map(|c| {
                egui::Color32::from_rgb(
                    (c.x * 255.0) as u8,
                    (c.y * 255.0) as u8,
                    (c.z * 255.0) as u8,
                )
            })
            .collect();
    }

    fn draw(&mut self, instances: &[InstanceTransform], _light_position: Vec3) {
        self.instances.clear();
        self.instances.extend_from_slice(instances);
    }
}

/// Forwards egui input to the tracker. egui mirrors an active touch as
/// pointer events, so those are dropped until the finger lifts.
#[derive(Default)]
struct InputRouter {
    touch_active: bool,
}

impl InputRouter {
    fn route(&mut self, tracker: &mut PointerTracker, event: &egui::Event) {
        match *event {
            egui::Event::PointerMoved(pos) if !self.touch_active => {
                tracker.pointer_move(glam::vec2(pos.x, pos.y))
            }
            egui::Event::PointerGone if !self.touch_active => tracker.pointer_leave(),
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed: false,
                ..
            } => tracker.click(glam::vec2(pos.x, pos.y)),
            egui::Event::Touch { phase, pos, .. } => {
                let touch = [glam::vec2(pos.x, pos.y)];
                match phase {
                    egui::TouchPhase::Start => {
                        self.touch_active = true;
                        tracker.touch_start(&touch);
                    }
                    egui::TouchPhase::Move => tracker.touch_move(&touch),
                    egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                        self.touch_active = false;
                        tracker.touch_end();
                    }
                }
            }
            _ => {}
        }
    }
}

struct ViewerApp {
    config_path: Option<PathBuf>,
    tracker: PointerTracker,
    ballpit: Ballpit<PaintBackend>,
    canvas_rect: Rc<Cell<Rect>>,
    count: usize,
    input: InputRouter,
    last_load_error: Option<String>,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
}

impl ViewerApp {
    fn new(
        config: SimulationConfig,
        config_path: Option<PathBuf>,
        seed: u64,
    ) -> Result<Self, ballpit_core::BallpitError> {
        let mut tracker = PointerTracker::new();
        let canvas_rect = Rc::new(Cell::new(Rect::default()));
        let count = config.count;
        let ballpit = Ballpit::new(
            config,
            PaintBackend::default(),
            &mut tracker,
            CANVAS,
            Box::new(Rc::clone(&canvas_rect)),
            Viewport::new(800.0, 600.0),
            seed,
        )?;

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            // The receiver is gone during shutdown
            let _ = tx.send(res);
        })
        .ok();
        if let (Some(w), Some(path)) = (watcher.as_mut(), config_path.as_ref()) {
            if let Err(e) = w.watch(path, notify::RecursiveMode::NonRecursive) {
                log::warn!("not watching {}: {}", path.display(), e);
            }
        }

        Ok(Self {
            config_path,
            tracker,
            ballpit,
            canvas_rect,
            count,
            input: InputRouter::default(),
            last_load_error: None,
            file_watcher: watcher,
            file_receiver: rx,
        })
    }

    fn check_file_changes(&mut self) {
        let mut needs_reload = false;
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: notify::EventKind::Modify(_),
                    ..
                }) => needs_reload = true,
                Ok(_) => {}
                Err(e) => log::error!("file watcher error: {}", e),
            }
        }

        if needs_reload {
            self.reload_config();
        }
    }

    fn reload_config(&mut self) {
        match crate::load_config(self.config_path.as_deref()) {
            Ok(config) => {
                self.count = config.count;
                match self.ballpit.reconfigure(config) {
                    Ok(()) => self.last_load_error = None,
                    Err(e) => self.last_load_error = Some(e.to_string()),
                }
            }
            Err(e) => self.last_load_error = Some(e),
        }
    }

    fn forward_input(&mut self, ctx: &egui::Context) {
        let events = ctx.input(|i| i.events.clone());
        for event in &events {
            self.input.route(&mut self.tracker, event);
        }
    }

    fn track_canvas(&mut self, rect: egui::Rect, now: f64) {
        let canvas = Rect::new(rect.left(), rect.top(), rect.width(), rect.height());
        if self.canvas_rect.get() != canvas {
            self.canvas_rect.set(canvas);
            self.ballpit
                .request_resize(Viewport::new(rect.width(), rect.height()), now);
        }
        self.ballpit.poll(now);
    }

    fn paint(&self, painter: &egui::Painter, rect: egui::Rect) {
        let view_projection = self.ballpit.driver().camera().view_projection();
        let to_screen = |p: Vec3| {
            let ndc = view_projection.project_point3(p);
            egui::pos2(
                rect.center().x + ndc.x * rect.width() / 2.0,
                rect.center().y - ndc.y * rect.height() / 2.0,
            )
        };

        let backend = self.ballpit.backend();
        let mut order: Vec<usize> = (0..backend.instances.len()).collect();
        // Farthest first so nearer spheres overdraw them
        order.sort_by(|&a, &b| {
            backend.instances[a]
                .position
                .z
                .total_cmp(&backend.instances[b].position.z)
        });

        for i in order {
            let instance = backend.instances[i];
            if instance.scale <= 0.0 {
                continue;
            }
            let center = to_screen(instance.position);
            let edge = to_screen(instance.position + Vec3::Y * instance.scale);
            let radius = center.distance(edge);
            let fill = backend
                .colors
                .get(i)
                .copied()
                .unwrap_or(egui::Color32::LIGHT_BLUE);

            painter.circle_filled(center, radius, fill);
            painter.circle_stroke(center, radius, egui::Stroke::new(1.0, egui::Color32::GRAY));
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();
        let now = ctx.input(|i| i.time);

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.ballpit.is_paused() { "▶ Resume" } else { "⏸ Pause" })
                    .clicked()
                {
                    self.ballpit.toggle_pause();
                }

                if ui.button("⏮ Reset").clicked() {
                    let config = self.ballpit.config().clone();
                    if let Err(e) = self.ballpit.reconfigure(config) {
                        self.last_load_error = Some(e.to_string());
                    }
                }

                ui.separator();

                ui.label("Count:");
                if ui
                    .add(egui::Slider::new(&mut self.count, 0..=400))
                    .changed()
                {
                    if let Err(e) = self.ballpit.set_count(self.count) {
                        self.last_load_error = Some(e.to_string());
                    }
                }

                ui.separator();

                let world = self.ballpit.driver().world_size();
                ui.label(format!(
                    "World: {:.1} x {:.1}  Particles: {}",
                    world.width,
                    world.height,
                    self.ballpit.ensemble().count()
                ));
            });
        });

        if let Some(ref error) = self.last_load_error {
            egui::TopBottomPanel::bottom("errors").show(ctx, |ui| {
                ui.set_max_height(100.0);
                ui.label(egui::RichText::new(format!("Error: {}", error)).color(egui::Color32::RED));
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.max_rect();
            self.track_canvas(rect, now);

            let minimized = ctx.input(|i| i.viewport().minimized.unwrap_or(false));
            self.ballpit.set_document_hidden(minimized, now);
            self.ballpit.set_intersecting(true, now);

            self.forward_input(ctx);

            if let Some(request) = self.ballpit.scheduled_frame() {
                self.ballpit.animate(request, now);
            }

            self.paint(ui.painter(), rect);
        });

        if self.ballpit.driver().is_running() {
            ctx.request_repaint();
        }
    }
}

impl Drop for ViewerApp {
    fn drop(&mut self) {
        if let Err(e) = self.ballpit.dispose(&mut self.tracker) {
            log::warn!("dispose: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballpit_core::{PointerHandler, PointerState};

    struct CountMoves(Rc<Cell<usize>>);

    impl PointerHandler for CountMoves {
        fn on_move(&mut self, _pointer: &PointerState) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn touch(phase: egui::TouchPhase, x: f32, y: f32) -> egui::Event {
        egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(0),
            phase,
            pos: egui::pos2(x, y),
            force: None,
        }
    }

    #[test]
    fn test_touch_drag_reaches_tracker_once_per_step() {
        let moves = Rc::new(Cell::new(0));
        let mut tracker = PointerTracker::new();
        tracker
            .register_surface(
                CANVAS,
                Box::new(Rect::new(0.0, 0.0, 100.0, 100.0)),
                Box::new(CountMoves(Rc::clone(&moves))),
            )
            .unwrap();
        let mut router = InputRouter::default();

        // egui sends each touch step as a Touch and a mirrored PointerMoved
        for (phase, x) in [
            (egui::TouchPhase::Start, 10.0),
            (egui::TouchPhase::Move, 20.0),
            (egui::TouchPhase::Move, 30.0),
        ] {
            router.route(&mut tracker, &touch(phase, x, 50.0));
            router.route(&mut tracker, &egui::Event::PointerMoved(egui::pos2(x, 50.0)));
        }
        assert_eq!(moves.get(), 3);

        router.route(&mut tracker, &touch(egui::TouchPhase::End, 30.0, 50.0));
        router.route(&mut tracker, &egui::Event::PointerMoved(egui::pos2(40.0, 50.0)));
        assert_eq!(moves.get(), 4);
    }
}
