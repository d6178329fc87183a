//! Interactive viewer for scene files
//!
//! Draws the simulation with egui and reloads the scene whenever the file
//! on disk changes.

use boxsim_core::{
    build_simulation_context_from_source, step_simulation, DrawRecord, Renderer,
    SimulationContext,
};
use eframe::egui;
use notify::{Event, RecommendedWatcher, Watcher};
use std::path::PathBuf;
use std::sync::mpsc;

/// Speed at which the outline is fully red.
const HOT_SPEED: f32 = 0.05;

/// Draws records onto an egui painter, looking down the z axis.
struct PainterRenderer<'a> {
    painter: &'a egui::Painter,
    center: egui::Pos2,
    scale: f32,
    radius: f32,
}

impl Renderer for PainterRenderer<'_> {
    fn draw(&mut self, records: &[DrawRecord]) {
        for record in records {
            let screen_pos = self.center
                + egui::vec2(record.position.x * self.scale, -record.position.y * self.scale);
            let radius = (self.radius * self.scale).max(2.0);

            let fill = egui::Color32::from_rgb(
                channel(record.color.x),
                channel(record.color.y),
                channel(record.color.z),
            );
            let heat = (record.speed / HOT_SPEED).min(1.0);
            let outline = egui::Color32::from_rgb(channel(heat), 64, channel(1.0 - heat));

            self.painter.circle_filled(screen_pos, radius, fill);
            self.painter
                .circle_stroke(screen_pos, radius, egui::Stroke::new(1.5, outline));
        }
    }
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub struct ViewerApp {
    source_path: PathBuf,
    source_text: String,
    ctx_opt: Option<SimulationContext>,
    last_load_error: Option<String>,
    playing: bool,
    frames_per_update: f32,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
    needs_reload: bool,
}

impl ViewerApp {
    pub fn new(source_path: PathBuf, _cc: &eframe::CreationContext<'_>) -> Self {
        let source_text = std::fs::read_to_string(&source_path)
            .unwrap_or_else(|e| format!("Error reading file: {}", e));

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            // Receiver may already be gone during shutdown
            let _ = tx.send(res);
        })
        .ok();

        if let Some(ref mut w) = watcher {
            if let Err(e) = w.watch(&source_path, notify::RecursiveMode::NonRecursive) {
                log::warn!("not watching {}: {}", source_path.display(), e);
            }
        }

        let mut app = Self {
            source_path,
            source_text,
            ctx_opt: None,
            last_load_error: None,
            playing: false,
            frames_per_update: 1.0,
            file_watcher: watcher,
            file_receiver: rx,
            needs_reload: false,
        };

        app.reload_context();

        app
    }

    fn reload_context(&mut self) {
        match build_simulation_context_from_source(&self.source_text) {
            Ok((ctx, diagnostics)) => {
                log::info!(
                    "loaded {} ({} particles, {} warnings)",
                    self.source_path.display(),
                    ctx.simulation.len(),
                    diagnostics.warnings().count()
                );
                self.ctx_opt = Some(ctx);
                self.last_load_error = None;
            }
            Err(e) => {
                self.last_load_error = Some(e.to_string());
                self.ctx_opt = None;
                self.playing = false;
            }
        }
    }

    fn check_file_changes(&mut self) {
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: notify::EventKind::Modify(_),
                    paths,
                    ..
                }) => {
                    if paths.contains(&self.source_path) {
                        if let Ok(new_text) = std::fs::read_to_string(&self.source_path) {
                            self.source_text = new_text;
                            self.needs_reload = true;
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("file watcher error: {}", e);
                }
            }
        }

        if self.needs_reload {
            self.reload_context();
            self.needs_reload = false;
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(if self.playing { "⏸ Pause" } else { "▶ Play" }).clicked() {
                    self.playing = !self.playing;
                }

                if ui.button("⏮ Reset").clicked() {
                    self.reload_context();
                    self.playing = false;
                }

                if ui.button("⏭ Step").clicked() {
                    if let Some(ref mut sim_ctx) = self.ctx_opt {
                        step_simulation(sim_ctx);
                    }
                }

                ui.separator();

                ui.label("Frames/update:");
                ui.add(egui::Slider::new(&mut self.frames_per_update, 1.0..=20.0));

                ui.separator();

                if let Some(ref sim_ctx) = self.ctx_opt {
                    ui.label(format!(
                        "Frame: {} / {}  t = {:.3}  E = {:.6}",
                        sim_ctx.current_frame,
                        sim_ctx.max_frames,
                        sim_ctx.simulation.elapsed(),
                        sim_ctx.simulation.kinetic_energy()
                    ));
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.max_rect();
            let painter = ui.painter();

            if let Some(ref sim_ctx) = self.ctx_opt {
                let params = sim_ctx.simulation.params();
                let center = rect.center();
                let scale = (rect.width().min(rect.height()) / (2.0 * params.boundary)) * 0.9;

                let wall = egui::Rect::from_center_size(
                    center,
                    egui::vec2(2.0 * params.boundary * scale, 2.0 * params.boundary * scale),
                );
                painter.rect_stroke(wall, 0.0, egui::Stroke::new(1.0, egui::Color32::GRAY));

                let mut renderer = PainterRenderer {
                    painter,
                    center,
                    scale,
                    radius: params.radius,
                };
                sim_ctx.simulation.render(&mut renderer);
            }

            if let Some(ref error) = self.last_load_error {
                ui.vertical_centered(|ui| {
                    ui.add_space(rect.height() * 0.4);
                    ui.label(
                        egui::RichText::new(format!("Error: {}", error))
                            .color(egui::Color32::RED)
                            .size(16.0),
                    );
                });
            }
        });

        if self.playing {
            if let Some(ref mut sim_ctx) = self.ctx_opt {
                let frames = self.frames_per_update.round().max(1.0) as usize;
                for _ in 0..frames {
                    if step_simulation(sim_ctx) {
                        self.playing = false;
                        break;
                    }
                }
            }
            ctx.request_repaint();
        }
    }
}
