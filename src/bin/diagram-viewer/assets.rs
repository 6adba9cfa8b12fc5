//! Image sources and background decoding.

use crate::constants::SVG_RASTER_SCALE;
use eframe::egui;
use image::imageops::FilterType;
use resvg::{tiny_skia, usvg};
use rust_embed::RustEmbed;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use thiserror::Error;

/// Embeds all assets from the assets/ directory into the binary.
/// In debug mode, assets are loaded from the filesystem for faster iteration.
/// In release mode, assets are compressed and embedded in the binary.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

/// Embedded diagram shown when no image is given.
pub const DEMO_DIAGRAM: &str = "demo.svg";

/// Errors that can occur when loading and decoding images.
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("asset not found: {0}")]
    AssetNotFound(String),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode image '{path}': {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },
    #[error("failed to parse SVG '{path}': {source}")]
    Svg { path: String, source: usvg::Error },
    #[error("SVG '{0}' has empty dimensions")]
    EmptySvg(String),
}

/// Where the viewed image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Embedded(String),
    File(PathBuf),
}

impl ImageSource {
    pub fn demo() -> Self {
        Self::Embedded(DEMO_DIAGRAM.to_owned())
    }

    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Embedded(_) => None,
        }
    }

    fn is_svg(&self) -> bool {
        let name = match self {
            Self::Embedded(name) => Path::new(name),
            Self::File(path) => path.as_path(),
        };
        name.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    }

    fn read(&self) -> Result<Vec<u8>, ImageLoadError> {
        match self {
            Self::Embedded(name) => Assets::get(name)
                .map(|file| file.data.into_owned())
                .ok_or_else(|| ImageLoadError::AssetNotFound(name.clone())),
            Self::File(path) => std::fs::read(path).map_err(|source| ImageLoadError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded(name) => write!(f, "builtin:{name}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Decoded image data ready for texture creation.
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// SVG rasters come out of tiny-skia premultiplied.
    pub premultiplied: bool,
    /// Intrinsic size used for aspect-ratio fitting.
    pub logical_size: egui::Vec2,
}

impl DecodedImage {
    pub fn to_color_image(&self) -> egui::ColorImage {
        let size = [self.width as usize, self.height as usize];
        if self.premultiplied {
            egui::ColorImage::from_rgba_premultiplied(size, &self.pixels)
        } else {
            egui::ColorImage::from_rgba_unmultiplied(size, &self.pixels)
        }
    }
}

/// State of an image being loaded asynchronously.
pub enum AssetLoadState {
    /// Image is being decoded in a background thread.
    Loading(mpsc::Receiver<Result<DecodedImage, ImageLoadError>>),
    /// Image has been decoded and uploaded as a texture.
    Ready,
    /// Loading failed; stores the error message (already displayed via toast).
    Error(String),
}

/// Starts decoding `source` on a background thread, sized to fit the GPU's texture limit.
pub fn spawn_load(source: ImageSource, ctx: egui::Context) -> AssetLoadState {
    let (tx, rx) = mpsc::channel();
    let max_side = ctx.input(|i| i.max_texture_side) as u32;

    thread::spawn(move || {
        let result = load_and_decode_image(&source, max_side);
        let _ = tx.send(result);
        ctx.request_repaint();
    });

    AssetLoadState::Loading(rx)
}

/// Reads and decodes an image, rasterising SVG sources.
///
/// Pixels are downscaled so neither side exceeds `max_side`; `logical_size`
/// keeps the intrinsic size.
pub fn load_and_decode_image(
    source: &ImageSource,
    max_side: u32,
) -> Result<DecodedImage, ImageLoadError> {
    let bytes = source.read()?;
    let label = source.to_string();

    let decoded = if source.is_svg() {
        rasterize_svg(&label, &bytes, max_side)?
    } else {
        decode_raster(&label, &bytes, max_side)?
    };

    log::info!(
        "Decoded {label}: {}x{} pixels",
        decoded.width,
        decoded.height
    );
    Ok(decoded)
}

fn decode_raster(label: &str, bytes: &[u8], max_side: u32) -> Result<DecodedImage, ImageLoadError> {
    let mut img = image::load_from_memory(bytes).map_err(|source| ImageLoadError::Decode {
        path: label.to_owned(),
        source,
    })?;
    let logical_size = egui::vec2(img.width() as f32, img.height() as f32);

    if img.width() > max_side || img.height() > max_side {
        log::info!(
            "Downscaling {label} from {}x{} to fit {max_side}px textures",
            img.width(),
            img.height()
        );
        img = img.resize(max_side, max_side, FilterType::Triangle);
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        pixels: rgba.into_raw(),
        width,
        height,
        premultiplied: false,
        logical_size,
    })
}

fn rasterize_svg(label: &str, bytes: &[u8], max_side: u32) -> Result<DecodedImage, ImageLoadError> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_data(bytes, &options).map_err(|source| ImageLoadError::Svg {
        path: label.to_owned(),
        source,
    })?;

    let size = tree.size();
    let longest = size.width().max(size.height());
    let scale = SVG_RASTER_SCALE.min(max_side as f32 / longest);
    let width = ((size.width() * scale).ceil() as u32).min(max_side);
    let height = ((size.height() * scale).ceil() as u32).min(max_side);

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ImageLoadError::EmptySvg(label.to_owned()))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    Ok(DecodedImage {
        pixels: pixmap.take(),
        width,
        height,
        premultiplied: true,
        logical_size: egui::vec2(size.width(), size.height()),
    })
}
