//! Named viewer profiles: zoom limits plus presentation options.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating profiles.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("failed to parse profiles: {0}")]
    Parse(#[from] ron::de::SpannedError),
    #[error("profile '{profile}': scale range {min}..={max} must be finite, positive and contain 1.0")]
    InvalidScaleRange { profile: String, min: f32, max: f32 },
    #[error("profile '{profile}': wheel sensitivity {value} must be finite and non-negative")]
    InvalidSensitivity { profile: String, value: f32 },
    #[error("profile '{profile}': zoom step {value} must be finite and greater than 1.0")]
    InvalidZoomStep { profile: String, value: f32 },
    #[error("profile '{profile}': double-click scale {value} is outside {min}..={max}")]
    InvalidDoubleClickScale {
        profile: String,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("profile names must not be empty")]
    EmptyName,
    #[error("duplicate profile name '{0}'")]
    DuplicateName(String),
    #[error("no profiles defined")]
    NoProfiles,
    #[error("unknown profile '{0}'")]
    UnknownProfile(String),
}

/// Point kept fixed on screen while the wheel zooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZoomAnchor {
    /// The point under the pointer.
    #[default]
    Cursor,
    /// The transform origin (viewport centre).
    Center,
}

/// Zoom limits and input sensitivities for one viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Smallest allowed scale
    pub min_scale: f32,
    /// Largest allowed scale
    pub max_scale: f32,
    /// Scale change per unit of wheel delta
    pub wheel_sensitivity: f32,
    /// Multiplicative step used by the zoom buttons and keyboard
    pub zoom_step: f32,
    /// Where wheel zoom is anchored
    pub anchor: ZoomAnchor,
    /// Scale reached by double-click; `None` disables the toggle
    pub double_click_scale: Option<f32>,
}

impl ZoomConfig {
    /// Clamps `scale` into the configured range.
    ///
    /// Never panics; with an inverted range `max_scale` wins.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.max(self.min_scale).min(self.max_scale)
    }

    pub fn validate(&self, profile: &str) -> Result<(), ProfileError> {
        let (min, max) = (self.min_scale, self.max_scale);
        let range_ok = min.is_finite() && max.is_finite() && min > 0.0 && min <= 1.0 && 1.0 <= max;
        if !range_ok {
            return Err(ProfileError::InvalidScaleRange {
                profile: profile.to_owned(),
                min,
                max,
            });
        }

        let sensitivity = self.wheel_sensitivity;
        if !sensitivity.is_finite() || sensitivity < 0.0 {
            return Err(ProfileError::InvalidSensitivity {
                profile: profile.to_owned(),
                value: sensitivity,
            });
        }

        let step = self.zoom_step;
        if !step.is_finite() || step <= 1.0 {
            return Err(ProfileError::InvalidZoomStep {
                profile: profile.to_owned(),
                value: step,
            });
        }

        if let Some(value) = self.double_click_scale
            && !(min..=max).contains(&value)
        {
            return Err(ProfileError::InvalidDoubleClickScale {
                profile: profile.to_owned(),
                value,
                min,
                max,
            });
        }

        Ok(())
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 6.0,
            wheel_sensitivity: 0.0015,
            zoom_step: 1.25,
            anchor: ZoomAnchor::Cursor,
            double_click_scale: None,
        }
    }
}

/// Where the zoom buttons are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlsPlacement {
    /// Floating panel in the bottom-right corner of the viewport.
    #[default]
    Floating,
    /// Toolbar row above the image.
    Toolbar,
}

/// Presentational options that differ between viewers sharing the same zoom logic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
    pub controls: ControlsPlacement,
    /// Fixed viewport height in points; `None` fills the panel.
    pub frame_height: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerProfile {
    pub name: String,
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub presentation: Presentation,
}

/// A set of named profiles, one of which is the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    pub default: String,
    pub profiles: Vec<ViewerProfile>,
}

impl ProfileSet {
    /// Parses and validates a profile set from RON.
    pub fn from_ron(source: &str) -> Result<Self, ProfileError> {
        let set: Self = ron::from_str(source)?;
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.profiles.is_empty() {
            return Err(ProfileError::NoProfiles);
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if profile.name.trim().is_empty() {
                return Err(ProfileError::EmptyName);
            }
            if !seen.insert(profile.name.as_str()) {
                return Err(ProfileError::DuplicateName(profile.name.clone()));
            }
            profile.zoom.validate(&profile.name)?;
        }

        if !seen.contains(self.default.as_str()) {
            return Err(ProfileError::UnknownProfile(self.default.clone()));
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&ViewerProfile, ProfileError> {
        self.profiles
            .iter()
            .find(|profile| profile.name == name)
            .ok_or_else(|| ProfileError::UnknownProfile(name.to_owned()))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|profile| profile.name == name)
    }

    /// Index of the default profile.
    pub fn default_index(&self) -> usize {
        self.position(&self.default).unwrap_or(0)
    }
}

impl Default for ProfileSet {
    /// The two built-in profiles: a bounded overview and a deep-zoom detail view.
    fn default() -> Self {
        Self {
            default: "detail".to_owned(),
            profiles: vec![
                ViewerProfile {
                    name: "overview".to_owned(),
                    zoom: ZoomConfig {
                        min_scale: 0.6,
                        max_scale: 2.0,
                        wheel_sensitivity: 0.001,
                        zoom_step: 1.25,
                        anchor: ZoomAnchor::Center,
                        double_click_scale: None,
                    },
                    presentation: Presentation {
                        controls: ControlsPlacement::Toolbar,
                        frame_height: Some(480.0),
                    },
                },
                ViewerProfile {
                    name: "detail".to_owned(),
                    zoom: ZoomConfig {
                        min_scale: 1.0,
                        max_scale: 6.0,
                        wheel_sensitivity: 0.0015,
                        zoom_step: 1.25,
                        anchor: ZoomAnchor::Cursor,
                        double_click_scale: Some(2.5),
                    },
                    presentation: Presentation {
                        controls: ControlsPlacement::Floating,
                        frame_height: None,
                    },
                },
            ],
        }
    }
}
