//! Pan/zoom state and viewer profiles for the diagram viewer.

pub mod pan_zoom;
pub mod profile;

pub use pan_zoom::{DragSession, PanZoom, ViewState};
pub use profile::{
    ControlsPlacement, Presentation, ProfileError, ProfileSet, ViewerProfile, ZoomAnchor,
    ZoomConfig,
};
