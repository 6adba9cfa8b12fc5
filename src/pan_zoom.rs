//! Pan/zoom state machine for inspecting a single image.
//!
//! Positions are viewport-local points measured from the transform origin.
//! An image-local point `p` is drawn at `origin + offset + scale * p`.

use std::fmt;

use eframe::egui::{Pos2, Rect, Vec2};

use crate::profile::{ProfileError, ZoomAnchor, ZoomConfig};

/// Scales closer than this to 1.0 count as "not zoomed" for the double-click toggle.
const IDENTITY_EPSILON: f32 = 1e-4;

/// The pan/zoom transform applied to the inspected image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Zoom factor relative to the fitted image size.
    pub scale: f32,
    /// Translation of the image centre away from the transform origin.
    pub offset: Vec2,
}

impl ViewState {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Vec2::ZERO,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Maps an image-local point to screen space.
    pub fn to_screen(&self, origin: Pos2, local: Pos2) -> Pos2 {
        origin + self.offset + local.to_vec2() * self.scale
    }

    /// Maps a screen point back to image-local space.
    pub fn to_local(&self, origin: Pos2, screen: Pos2) -> Pos2 {
        ((screen - origin - self.offset) / self.scale).to_pos2()
    }

    /// Screen rect covered by an image of `base_size` (its size at scale 1).
    pub fn image_rect(&self, origin: Pos2, base_size: Vec2) -> Rect {
        Rect::from_center_size(origin + self.offset, base_size * self.scale)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({:.1}, {:.1}) scale({:.3})",
            self.offset.x, self.offset.y, self.scale
        )
    }
}

/// Pointer state captured between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Pointer position when the drag started.
    pub anchor: Pos2,
    /// View offset when the drag started.
    pub origin_offset: Vec2,
}

/// Wheel, drag and button handling for one viewer instance.
///
/// Every input is clamped into range, so no operation can fail.
#[derive(Debug, Clone)]
pub struct PanZoom {
    config: ZoomConfig,
    view: ViewState,
    drag: Option<DragSession>,
}

impl PanZoom {
    /// Builds a viewer at identity. Profiles loaded through `ProfileSet` are
    /// already validated; use [`PanZoom::try_new`] for configs built by hand.
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            config,
            view: ViewState::IDENTITY,
            drag: None,
        }
    }

    /// Validates `config` before building the viewer.
    pub fn try_new(config: ZoomConfig) -> Result<Self, ProfileError> {
        config.validate("custom")?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn drag_session(&self) -> Option<DragSession> {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Handles a wheel event using the browser sign convention (positive `delta_y` zooms out).
    ///
    /// Returns `true` if the view changed.
    pub fn on_wheel(&mut self, delta_y: f32, cursor: Option<Pos2>) -> bool {
        if !delta_y.is_finite() || delta_y == 0.0 {
            return false;
        }

        let factor = 1.0 + delta_y * -self.config.wheel_sensitivity;
        let target = self.view.scale * factor;
        let anchor = match self.config.anchor {
            ZoomAnchor::Cursor => cursor.unwrap_or(Pos2::ZERO),
            ZoomAnchor::Center => Pos2::ZERO,
        };

        self.zoom_to(target, anchor)
    }

    pub fn on_pointer_down(&mut self, pos: Pos2) {
        self.drag = Some(DragSession {
            anchor: pos,
            origin_offset: self.view.offset,
        });
    }

    /// Returns `true` if a drag is in progress and the offset was updated.
    pub fn on_pointer_move(&mut self, pos: Pos2) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return false;
        }

        self.view.offset = drag.origin_offset + (pos - drag.anchor);
        true
    }

    pub fn on_pointer_up(&mut self) {
        self.drag = None;
    }

    /// Steps the scale up by `zoom_step`, keeping the transform origin fixed.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_to(self.view.scale * self.config.zoom_step, Pos2::ZERO)
    }

    /// Steps the scale down by `zoom_step`, keeping the transform origin fixed.
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_to(self.view.scale / self.config.zoom_step, Pos2::ZERO)
    }

    pub fn reset(&mut self) {
        log::debug!("Resetting view from {}", self.view);
        self.view = ViewState::IDENTITY;
        self.drag = None;
    }

    /// Toggles between identity and the configured double-click scale.
    ///
    /// Does nothing when the profile has no double-click scale.
    pub fn on_double_click(&mut self, cursor: Option<Pos2>) {
        let Some(toggle_scale) = self.config.double_click_scale else {
            return;
        };

        if (self.view.scale - 1.0).abs() <= IDENTITY_EPSILON {
            let anchor = match self.config.anchor {
                ZoomAnchor::Cursor => cursor.unwrap_or(Pos2::ZERO),
                ZoomAnchor::Center => Pos2::ZERO,
            };
            self.zoom_to(toggle_scale, anchor);
            log::debug!("Double-click zoomed to {}", self.view);
        } else {
            self.reset();
        }
    }

    /// Sets the scale (clamped) while keeping the point under `anchor` fixed on screen.
    ///
    /// An open drag session is rebased so the pan continues from the zoomed offset.
    pub fn zoom_to(&mut self, scale: f32, anchor: Pos2) -> bool {
        if !scale.is_finite() || !(anchor.x.is_finite() && anchor.y.is_finite()) {
            return false;
        }

        let new_scale = self.config.clamp_scale(scale);
        if new_scale == self.view.scale {
            return false;
        }

        let ratio = new_scale / self.view.scale;
        let anchor = anchor.to_vec2();
        let new_offset = anchor - (anchor - self.view.offset) * ratio;

        if let Some(drag) = &mut self.drag {
            drag.origin_offset += new_offset - self.view.offset;
        }

        self.view = ViewState {
            scale: new_scale,
            offset: new_offset,
        };
        true
    }
}

impl Default for PanZoom {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    fn detail() -> ZoomConfig {
        ZoomConfig {
            min_scale: 1.0,
            max_scale: 6.0,
            wheel_sensitivity: 0.002,
            zoom_step: 1.25,
            anchor: ZoomAnchor::Cursor,
            double_click_scale: Some(2.5),
        }
    }

    fn overview() -> ZoomConfig {
        ZoomConfig {
            min_scale: 0.6,
            max_scale: 2.0,
            wheel_sensitivity: 0.001,
            zoom_step: 1.25,
            anchor: ZoomAnchor::Center,
            double_click_scale: None,
        }
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn starts_at_identity() {
        let viewer = PanZoom::new(detail());
        assert!(viewer.view().is_identity());
        assert!(!viewer.is_dragging());
    }

    #[test]
    fn wheel_up_zooms_in() {
        let mut viewer = PanZoom::new(detail());
        assert!(viewer.on_wheel(-100.0, None));
        assert_close(viewer.view().scale, 1.2);
    }

    #[test]
    fn wheel_clamps_to_max() {
        let mut viewer = PanZoom::new(detail());
        viewer.on_wheel(-1.0e6, Some(pos2(10.0, 10.0)));
        assert_eq!(viewer.view().scale, 6.0);
    }

    #[test]
    fn wheel_clamps_to_min_even_when_factor_goes_negative() {
        let mut viewer = PanZoom::new(overview());
        viewer.on_wheel(5000.0, None);
        assert_eq!(viewer.view().scale, 0.6);
    }

    #[test]
    fn wheel_at_bound_reports_no_change() {
        let mut viewer = PanZoom::new(detail());
        assert!(!viewer.on_wheel(100.0, None));
        assert!(viewer.view().is_identity());
    }

    #[test]
    fn non_finite_wheel_is_ignored() {
        let mut viewer = PanZoom::new(detail());
        assert!(!viewer.on_wheel(f32::NAN, None));
        assert!(!viewer.on_wheel(f32::INFINITY, None));
        assert!(viewer.view().is_identity());
    }

    #[test]
    fn wheel_keeps_point_under_cursor_fixed() {
        let mut viewer = PanZoom::new(detail());
        let origin = pos2(400.0, 300.0);
        let cursor = pos2(120.0, -45.0);
        let screen = origin + cursor.to_vec2();

        let before = viewer.view().to_local(origin, screen);
        viewer.on_wheel(-150.0, Some(cursor));
        let after = viewer.view().to_local(origin, screen);

        assert_close(before.x, after.x);
        assert_close(before.y, after.y);
    }

    #[test]
    fn center_anchor_ignores_cursor() {
        let mut viewer = PanZoom::new(overview());
        viewer.on_pointer_down(pos2(0.0, 0.0));
        viewer.on_pointer_move(pos2(50.0, 20.0));
        viewer.on_pointer_up();

        viewer.on_wheel(-200.0, Some(pos2(300.0, 300.0)));
        let view = viewer.view();
        assert_close(view.scale, 1.2);
        assert_close(view.offset.x, 60.0);
        assert_close(view.offset.y, 24.0);
    }

    #[test]
    fn drag_moves_offset_by_pointer_delta() {
        let mut viewer = PanZoom::new(detail());
        viewer.on_pointer_down(pos2(10.0, 10.0));
        assert!(viewer.on_pointer_move(pos2(25.0, -5.0)));
        assert!(viewer.on_pointer_move(pos2(40.0, 30.0)));
        viewer.on_pointer_up();

        assert_eq!(viewer.view().offset, vec2(30.0, 20.0));
        assert!(!viewer.is_dragging());
    }

    #[test]
    fn move_without_session_is_noop() {
        let mut viewer = PanZoom::new(detail());
        assert!(!viewer.on_pointer_move(pos2(100.0, 100.0)));
        assert_eq!(viewer.view().offset, Vec2::ZERO);
    }

    #[test]
    fn pointer_up_is_idempotent() {
        let mut viewer = PanZoom::new(detail());
        viewer.on_pointer_up();
        viewer.on_pointer_down(pos2(1.0, 1.0));
        viewer.on_pointer_up();
        viewer.on_pointer_up();
        assert!(viewer.drag_session().is_none());
    }

    #[test]
    fn zoom_during_drag_rebases_session() {
        let mut viewer = PanZoom::new(detail());
        viewer.on_pointer_down(pos2(0.0, 0.0));
        viewer.on_pointer_move(pos2(10.0, 0.0));
        viewer.on_wheel(-100.0, Some(pos2(50.0, 0.0)));
        let zoomed = viewer.view().offset;

        viewer.on_pointer_move(pos2(20.0, 0.0));
        assert_close(viewer.view().offset.x, zoomed.x + 10.0);
    }

    #[test]
    fn zoom_buttons_step_and_clamp() {
        let mut viewer = PanZoom::new(detail());
        assert!(viewer.zoom_in());
        assert_close(viewer.view().scale, 1.25);
        assert!(viewer.zoom_out());
        assert_close(viewer.view().scale, 1.0);
        assert!(!viewer.zoom_out());
        assert_eq!(viewer.view().scale, 1.0);
    }

    #[test]
    fn zoom_buttons_scale_offset_about_center() {
        let mut viewer = PanZoom::new(detail());
        viewer.on_pointer_down(pos2(0.0, 0.0));
        viewer.on_pointer_move(pos2(40.0, -20.0));
        viewer.on_pointer_up();

        assert!(viewer.zoom_in());
        let view = viewer.view();
        assert_close(view.scale, 1.25);
        assert_close(view.offset.x, 50.0);
        assert_close(view.offset.y, -25.0);

        // The point at the viewport centre doesn't move
        let origin = pos2(320.0, 240.0);
        let centre = view.to_local(origin, origin);
        assert_close(centre.x, -40.0);
        assert_close(centre.y, 20.0);

        assert!(viewer.zoom_out());
        assert_close(viewer.view().offset.x, 40.0);
        assert_close(viewer.view().offset.y, -20.0);
    }

    #[test]
    fn try_new_rejects_invalid_config() {
        let inverted = ZoomConfig {
            min_scale: 4.0,
            max_scale: 2.0,
            ..detail()
        };
        assert!(matches!(
            PanZoom::try_new(inverted),
            Err(ProfileError::InvalidScaleRange { .. })
        ));

        let nan_step = ZoomConfig {
            zoom_step: f32::NAN,
            ..detail()
        };
        assert!(matches!(
            PanZoom::try_new(nan_step),
            Err(ProfileError::InvalidZoomStep { .. })
        ));

        assert!(PanZoom::try_new(detail()).unwrap().view().is_identity());
    }

    #[test]
    fn unvalidated_config_does_not_panic() {
        let inverted = ZoomConfig {
            min_scale: 4.0,
            max_scale: 2.0,
            ..detail()
        };
        let mut viewer = PanZoom::new(inverted);
        viewer.zoom_in();
        viewer.on_wheel(-100.0, Some(pos2(5.0, 5.0)));
        assert_eq!(viewer.view().scale, 2.0);

        let nan_range = ZoomConfig {
            min_scale: f32::NAN,
            max_scale: f32::NAN,
            ..detail()
        };
        let mut viewer = PanZoom::new(nan_range);
        viewer.zoom_in();
        viewer.zoom_out();
        viewer.on_double_click(None);
        assert!(viewer.view().scale.is_finite());
    }

    #[test]
    fn reset_restores_identity_and_ends_drag() {
        let mut viewer = PanZoom::new(detail());
        viewer.zoom_in();
        viewer.on_pointer_down(pos2(0.0, 0.0));
        viewer.on_pointer_move(pos2(30.0, 30.0));
        viewer.reset();

        assert!(viewer.view().is_identity());
        assert!(!viewer.is_dragging());
    }

    #[test]
    fn double_click_toggles() {
        let mut viewer = PanZoom::new(detail());
        viewer.on_double_click(Some(pos2(40.0, -10.0)));
        assert_close(viewer.view().scale, 2.5);
        viewer.on_double_click(Some(pos2(0.0, 0.0)));
        assert!(viewer.view().is_identity());
    }

    #[test]
    fn double_click_without_toggle_scale_is_noop() {
        let mut viewer = PanZoom::new(overview());
        viewer.on_double_click(Some(pos2(40.0, -10.0)));
        assert!(viewer.view().is_identity());
    }

    #[test]
    fn image_rect_follows_transform() {
        let view = ViewState {
            scale: 2.0,
            offset: vec2(10.0, -5.0),
        };
        let rect = view.image_rect(pos2(100.0, 100.0), vec2(50.0, 20.0));
        assert_eq!(rect.center(), pos2(110.0, 95.0));
        assert_eq!(rect.size(), vec2(100.0, 40.0));
    }

    #[test]
    fn display_renders_css_style_transform() {
        let view = ViewState {
            scale: 1.5,
            offset: vec2(12.0, -3.5),
        };
        assert_eq!(view.to_string(), "translate(12.0, -3.5) scale(1.500)");
    }
}
