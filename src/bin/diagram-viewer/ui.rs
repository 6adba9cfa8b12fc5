//! UI rendering methods for the diagram viewer.

use crate::DiagramViewerApp;
use crate::assets::AssetLoadState;
use crate::colors;
use crate::constants::{CONTROLS_MARGIN, CONTROLS_SIZE, SIDEBAR_WIDTH};
use diagram_viewer::ControlsPlacement;
use eframe::egui;

impl DiagramViewerApp {
    /// Handles keyboard shortcuts for zoom and reset.
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        let (zoom_in, zoom_out, reset) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals),
                i.key_pressed(egui::Key::Minus),
                i.key_pressed(egui::Key::Num0),
            )
        });

        if zoom_in {
            self.viewer.zoom_in();
        }
        if zoom_out {
            self.viewer.zoom_out();
        }
        if reset {
            self.viewer.reset();
        }
    }

    /// Renders the bottom status bar with controls hint, alt text and transform.
    pub fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut hint = String::from("Scroll: Zoom | Drag: Pan | +/-: Zoom | 0: Reset");
                if self.viewer.config().double_click_scale.is_some() {
                    hint.push_str(" | Double-click: Toggle zoom");
                }
                ui.label(hint);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.monospace(self.viewer.view().to_string());
                    ui.separator();
                    ui.label(self.alt_text.as_str());
                });
            });
        });
    }

    /// Renders the left sidebar panel.
    pub fn show_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.show_sidebar_content(ui);
                });
            });
    }

    /// Renders the sidebar content: profile selector and image details.
    fn show_sidebar_content(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);

        ui.strong("Profiles");
        ui.separator();

        let mut clicked = None;
        for (idx, profile) in self.profiles.profiles.iter().enumerate() {
            let zoom = &profile.zoom;
            let response = ui
                .selectable_label(self.selected_profile == idx, &profile.name)
                .on_hover_text(format!(
                    "Scale {:.0}%–{:.0}%, step ×{}",
                    zoom.min_scale * 100.0,
                    zoom.max_scale * 100.0,
                    zoom.zoom_step
                ));
            if response.clicked() {
                clicked = Some(idx);
            }
        }
        if let Some(idx) = clicked {
            self.select_profile(idx);
        }

        ui.add_space(12.0);

        ui.strong("Image");
        ui.separator();

        ui.label(self.source.to_string());
        if let Some(image) = &self.image {
            let [width, height] = image.texture.size();
            ui.weak(format!("{width} × {height} px"));
        }
        if let Some(watcher) = &self.file_watcher {
            ui.weak("Watching for changes")
                .on_hover_text(watcher.path().display().to_string());
        }
    }

    /// Renders the central panel containing the viewer and its controls.
    pub fn show_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let controls = self.current_profile().presentation.controls;
            match controls {
                ControlsPlacement::Toolbar => {
                    ui.horizontal(|ui| self.show_zoom_buttons(ui));
                    ui.add_space(4.0);
                    self.show_viewer(ui);
                }
                ControlsPlacement::Floating => {
                    let viewport_rect = self.show_viewer(ui);
                    self.show_floating_controls(ctx, viewport_rect);
                }
            }
        });
    }

    /// Zoom out, scale readout, zoom in and reset.
    fn show_zoom_buttons(&mut self, ui: &mut egui::Ui) {
        if ui.button("−").on_hover_text("Zoom out (-)").clicked() {
            self.viewer.zoom_out();
        }
        ui.label(format!("{:.0}%", self.viewer.view().scale * 100.0));
        if ui.button("+").on_hover_text("Zoom in (+)").clicked() {
            self.viewer.zoom_in();
        }
        if ui.button("Reset").on_hover_text("Reset view (0)").clicked() {
            self.viewer.reset();
        }
    }

    /// Renders the floating zoom controls in the bottom-right corner of the viewport.
    fn show_floating_controls(&mut self, ctx: &egui::Context, viewport_rect: egui::Rect) {
        let anchor_pos = egui::pos2(
            viewport_rect.right() - CONTROLS_SIZE[0] - CONTROLS_MARGIN,
            viewport_rect.bottom() - CONTROLS_SIZE[1] - CONTROLS_MARGIN,
        );

        egui::Area::new(egui::Id::new("zoom_controls"))
            .fixed_pos(anchor_pos)
            .interactable(true)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(ui.style().visuals.window_fill.gamma_multiply(0.95))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| self.show_zoom_buttons(ui));
                    });
            });
    }

    /// Allocates the viewport, feeds it input and paints the transformed image.
    ///
    /// Returns the viewport rect.
    fn show_viewer(&mut self, ui: &mut egui::Ui) -> egui::Rect {
        let available = ui.available_size();
        let height = self
            .current_profile()
            .presentation
            .frame_height
            .map_or(available.y, |h| h.min(available.y));

        let (viewport_rect, response) = ui.allocate_exact_size(
            egui::vec2(available.x, height),
            egui::Sense::click_and_drag(),
        );

        let painter = ui.painter_at(viewport_rect);
        painter.rect_filled(viewport_rect, 0.0, colors::VIEWPORT_BACKGROUND);

        let Some(image) = &self.image else {
            match &self.image_state {
                AssetLoadState::Error(msg) => {
                    show_broken_image(&painter, viewport_rect, &self.alt_text, msg);
                }
                AssetLoadState::Loading(_) | AssetLoadState::Ready => {
                    ui.put(viewport_rect, egui::Spinner::new())
                        .on_hover_text(self.alt_text.as_str());
                }
            }
            return viewport_rect;
        };
        let texture_id = image.texture.id();
        let logical_size = image.logical_size;

        // The viewport centre is the transform origin
        let origin = viewport_rect.center();
        self.handle_viewer_input(ui, &response, origin);

        let viewport_size = viewport_rect.size();
        let fit_scale = (viewport_size.x / logical_size.x).min(viewport_size.y / logical_size.y);
        if !fit_scale.is_finite() || fit_scale <= 0.0 {
            return viewport_rect;
        }

        let image_rect = self
            .viewer
            .view()
            .image_rect(origin, logical_size * fit_scale);

        painter.image(
            texture_id,
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
        painter.rect_stroke(
            viewport_rect,
            0.0,
            egui::Stroke::new(1.0, colors::VIEWPORT_BORDER),
            egui::StrokeKind::Inside,
        );

        viewport_rect
    }

    /// Translates egui wheel, drag and double-click input into viewer events.
    fn handle_viewer_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        origin: egui::Pos2,
    ) {
        let local = |pos: egui::Pos2| (pos - origin).to_pos2();

        if response.hovered() {
            // egui reports scroll-up as positive; the viewer expects wheel deltaY
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.viewer.on_wheel(-scroll, response.hover_pos().map(local));
            }
        }

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(press) = ui.input(|i| i.pointer.press_origin())
        {
            self.viewer.on_pointer_down(local(press));
        }

        if self.viewer.is_dragging()
            && response.dragged()
            && let Some(pos) = response.interact_pointer_pos()
        {
            self.viewer.on_pointer_move(local(pos));
        }

        // Release even if the button came up somewhere egui didn't report as a drag stop
        if response.drag_stopped()
            || (self.viewer.is_dragging() && !ui.input(|i| i.pointer.primary_down()))
        {
            self.viewer.on_pointer_up();
        }

        if response.double_clicked() {
            self.viewer
                .on_double_click(response.interact_pointer_pos().map(local));
        }

        if self.viewer.is_dragging() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }
    }
}

/// Draws the placeholder shown when the image can't be displayed.
fn show_broken_image(painter: &egui::Painter, viewport_rect: egui::Rect, alt: &str, reason: &str) {
    let frame = egui::Rect::from_center_size(
        viewport_rect.center(),
        egui::vec2(
            (viewport_rect.width() * 0.6).min(420.0),
            (viewport_rect.height() * 0.4).min(160.0),
        ),
    );

    painter.rect_filled(frame, 6.0, colors::BROKEN_IMAGE_FILL);
    painter.rect_stroke(
        frame,
        6.0,
        egui::Stroke::new(1.5, colors::BROKEN_IMAGE_STROKE),
        egui::StrokeKind::Inside,
    );
    painter.text(
        frame.center() - egui::vec2(0.0, 12.0),
        egui::Align2::CENTER_CENTER,
        alt,
        egui::FontId::proportional(18.0),
        colors::BROKEN_IMAGE_TEXT,
    );
    painter.text(
        frame.center() + egui::vec2(0.0, 14.0),
        egui::Align2::CENTER_CENTER,
        reason,
        egui::FontId::proportional(12.0),
        colors::BROKEN_IMAGE_STROKE,
    );
}
