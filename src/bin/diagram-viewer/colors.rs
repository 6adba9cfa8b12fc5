//! Color constants for the viewport and placeholder states.

use eframe::egui::Color32;

// Viewport
pub const VIEWPORT_BACKGROUND: Color32 = Color32::from_gray(24);
pub const VIEWPORT_BORDER: Color32 = Color32::from_gray(60);

// Broken image placeholder
pub const BROKEN_IMAGE_FILL: Color32 = Color32::from_rgb(48, 28, 28);
pub const BROKEN_IMAGE_STROKE: Color32 = Color32::from_rgb(170, 70, 70);
pub const BROKEN_IMAGE_TEXT: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 220);
