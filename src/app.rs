//! The egui shell around the detection canvas.
//!
//! Keeps the windowing concerns (textures, panels, pointer events) out of
//! the interaction core: pointer positions are translated to image-relative
//! logical coordinates before they reach [`DetectionCanvas`], and the
//! backend's device-pixel-ratio handling never leaks in here.

use std::path::PathBuf;

use eframe::egui;
use image::DynamicImage;

use crate::canvas::DetectionCanvas;
use crate::color::LabelPalette;
use crate::config::Options;
use crate::detection::{self, Detection};
use crate::export;
use crate::geometry;

pub struct DetectEditApp {
    image_path: PathBuf,
    detections_path: PathBuf,
    raw_image: DynamicImage,
    natural_size: (f32, f32),
    texture: Option<egui::TextureHandle>,
    canvas: DetectionCanvas,
    palette: LabelPalette,
    options: Options,
    dirty: bool,
}

impl DetectEditApp {
    pub fn new(
        image_path: PathBuf,
        detections_path: PathBuf,
        raw_image: DynamicImage,
        detections: Vec<Detection>,
        options: Options,
    ) -> Self {
        let natural_size = (raw_image.width() as f32, raw_image.height() as f32);
        let palette = LabelPalette::for_detections(&detections);
        Self {
            image_path,
            detections_path,
            raw_image,
            natural_size,
            texture: None,
            canvas: DetectionCanvas::new(detections, options.score_threshold),
            palette,
            options,
            dirty: false,
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        let rgba = self.raw_image.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        self.texture = Some(ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR));
    }

    /// Fired after every committed drag move with the full updated list
    /// available through the canvas.
    fn on_detection_update(&mut self) {
        self.dirty = true;
        log::trace!(
            "detections updated ({} total)",
            self.canvas.detections().len()
        );
    }

    fn autosave(&mut self) {
        match detection::save_detections(&self.detections_path, self.canvas.detections()) {
            Ok(()) => self.dirty = false,
            Err(e) => log::error!("autosave failed: {e}"),
        }
    }

    fn export_snapshot(&self, path: &std::path::Path) {
        let options = Options {
            score_threshold: self.canvas.score_threshold(),
            ..self.options
        };
        if let Err(e) = export::save_composite(
            path,
            &self.raw_image,
            self.canvas.detections(),
            &self.palette,
            &options,
        ) {
            log::error!("export failed: {e}");
        }
    }

    fn clear_overlay(&mut self) {
        self.canvas.replace_detections(Vec::new());
        self.palette = LabelPalette::default();
        self.dirty = false;
        log::info!("cleared detection overlay");
    }

    fn reload_detections(&mut self) {
        match detection::load_detections(&self.detections_path) {
            Ok(detections) => {
                self.palette = LabelPalette::for_detections(&detections);
                self.canvas.replace_detections(detections);
                self.dirty = false;
                log::info!(
                    "reloaded {} detections from {}",
                    self.canvas.detections().len(),
                    self.detections_path.display()
                );
            }
            Err(e) => log::error!("reload failed: {e}"),
        }
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("detections")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Detections");
                ui.separator();

                let mut threshold = self.canvas.score_threshold();
                if ui
                    .add(egui::Slider::new(&mut threshold, 0.0..=1.0).text("score threshold"))
                    .changed()
                {
                    self.canvas.set_score_threshold(threshold);
                }
                ui.separator();

                ui.horizontal(|ui| {
                    if ui.button("Export…").clicked() {
                        let default_name = export::default_export_path(&self.image_path);
                        let picked = rfd::FileDialog::new()
                            .set_file_name(
                                default_name
                                    .file_name()
                                    .unwrap_or_default()
                                    .to_string_lossy(),
                            )
                            .save_file();
                        if let Some(path) = picked {
                            self.export_snapshot(&path);
                        }
                        ctx.request_repaint();
                    }
                    if ui.button("Reload").clicked() {
                        self.reload_detections();
                        ctx.request_repaint();
                    }
                    if ui.button("Clear").clicked() {
                        self.clear_overlay();
                        ctx.request_repaint();
                    }
                });
                ui.separator();

                let dragged = self.canvas.dragging();
                let rows: Vec<(usize, String)> = self
                    .canvas
                    .visible()
                    .into_iter()
                    .map(|(i, det, _)| {
                        (
                            i,
                            format!(
                                "{}  {:.0}%  ({:.0}, {:.0})",
                                det.label,
                                det.score * 100.0,
                                det.bbox.xmin,
                                det.bbox.ymin
                            ),
                        )
                    })
                    .collect();
                let shown = rows.len();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (i, row) in rows {
                        if dragged == Some(i) {
                            ui.label(egui::RichText::new(row).strong());
                        } else {
                            ui.label(row);
                        }
                    }
                });

                ui.separator();
                ui.label(format!(
                    "{} shown of {}{}",
                    shown,
                    self.canvas.detections().len(),
                    if self.dirty { "  (editing)" } else { "" }
                ));
            });
    }

    fn central_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let canvas_rect = response.rect;

            painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));

            let (natural_w, natural_h) = self.natural_size;
            let (display_w, display_h) = geometry::fit_within(
                natural_w,
                natural_h,
                canvas_rect.width(),
                canvas_rect.height(),
            );
            self.canvas
                .set_view(natural_w, natural_h, display_w, display_h);

            let origin = egui::pos2(
                canvas_rect.center().x - display_w * 0.5,
                canvas_rect.center().y - display_h * 0.5,
            );
            let image_rect =
                egui::Rect::from_min_size(origin, egui::vec2(display_w, display_h));

            if let Some(ref tex) = self.texture {
                painter.image(
                    tex.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }

            self.draw_detections(&painter, origin);
            self.handle_pointer(ctx, &response, origin);
        });
    }

    fn draw_detections(&self, painter: &egui::Painter, origin: egui::Pos2) {
        let dragged = self.canvas.dragging();
        let pad = self.options.label_padding;

        for (i, det, dbox) in self.canvas.visible() {
            let [r, g, b] = self.palette.color(&det.label);
            let is_dragged = dragged == Some(i);
            let stroke_w = if is_dragged {
                self.options.stroke_width + 2.0
            } else {
                self.options.stroke_width
            };
            let fill_alpha = if is_dragged { 80 } else { 36 };

            let rect = egui::Rect::from_min_max(
                egui::pos2(origin.x + dbox.xmin, origin.y + dbox.ymin),
                egui::pos2(origin.x + dbox.xmax, origin.y + dbox.ymax),
            );
            painter.rect_filled(
                rect,
                0.0,
                egui::Color32::from_rgba_unmultiplied(r, g, b, fill_alpha),
            );
            painter.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(stroke_w, egui::Color32::from_rgb(r, g, b)),
                egui::StrokeKind::Middle,
            );

            let text = format!(
                "{} {:.0}% ({:.0},{:.0})",
                det.label,
                det.score * 100.0,
                det.bbox.xmin,
                det.bbox.ymin
            );
            let galley = painter.layout_no_wrap(
                text,
                egui::FontId::proportional(12.0),
                egui::Color32::WHITE,
            );
            let pill_size =
                egui::vec2(galley.size().x + pad * 2.0, galley.size().y + pad);
            // never let the pill leave the top of the canvas
            let pill_y = (dbox.ymin - pill_size.y).max(0.0);
            let pill_rect = egui::Rect::from_min_size(
                egui::pos2(origin.x + dbox.xmin, origin.y + pill_y),
                pill_size,
            );
            painter.rect_filled(
                pill_rect,
                4.0,
                egui::Color32::from_rgba_unmultiplied(r, g, b, 220),
            );
            painter.galley(
                pill_rect.min + egui::vec2(pad, pad * 0.5),
                galley,
                egui::Color32::WHITE,
            );
        }
    }

    fn handle_pointer(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        origin: egui::Pos2,
    ) {
        let rel = |pos: egui::Pos2| (pos.x - origin.x, pos.y - origin.y);

        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let (x, y) = rel(pos);
                self.canvas.pointer_down(x, y);
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let (x, y) = rel(pos);
                if self.canvas.pointer_moved(x, y) {
                    self.on_detection_update();
                }
            }
        }

        if response.drag_stopped_by(egui::PointerButton::Primary) {
            if self.canvas.dragging().is_some() {
                self.canvas.pointer_released();
                self.autosave();
            }
        } else if self.canvas.dragging().is_some() && !ctx.input(|i| i.pointer.has_pointer()) {
            // pointer left the window mid-drag: keep the last position
            self.canvas.pointer_left();
            self.autosave();
        }
    }
}

impl eframe::App for DetectEditApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S)) {
            self.export_snapshot(&export::default_export_path(&self.image_path));
        }

        self.side_panel(ctx);
        self.central_canvas(ctx);
    }
}
