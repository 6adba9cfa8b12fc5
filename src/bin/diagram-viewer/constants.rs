/// Width of the sidebar panel in pixels.
pub const SIDEBAR_WIDTH: f32 = 180.0;

/// Initial window size.
pub const WINDOW_SIZE: [f32; 2] = [1280.0, 720.0];

/// SVGs are rasterised at this multiple of their intrinsic size.
pub const SVG_RASTER_SCALE: f32 = 2.0;

/// Gap between the viewport edge and the floating zoom controls.
pub const CONTROLS_MARGIN: f32 = 12.0;

/// Size of the floating zoom controls panel.
pub const CONTROLS_SIZE: [f32; 2] = [190.0, 36.0];

/// Name of the profile file looked up in the user's config directory.
pub const PROFILES_FILE: &str = "profiles.ron";

/// Directory under the platform config dir holding our files.
pub const CONFIG_DIR_NAME: &str = "diagram-viewer";
