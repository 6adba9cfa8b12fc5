#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod assets;
mod colors;
mod config;
mod constants;
mod file_watcher;
mod ui;

use assets::{AssetLoadState, ImageSource, spawn_load};
use clap::Parser;
use config::{PersistedState, load_profiles};
use constants::WINDOW_SIZE;
use diagram_viewer::{PanZoom, ProfileSet, ViewerProfile};
use eframe::egui::{self, TextureHandle, TextureOptions};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use file_watcher::FileWatcher;
use std::path::PathBuf;
use std::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "diagram-viewer", about = "Pan and zoom around large diagram images")]
#[command(version)]
struct Cli {
    /// Image to open (PNG, JPEG, GIF or SVG); shows a demo diagram when omitted
    image: Option<PathBuf>,

    /// Text shown in place of the image while it loads or if it cannot be displayed
    #[arg(long)]
    alt: Option<String>,

    /// Viewer profile to start with
    #[arg(short, long)]
    profile: Option<String>,

    /// RON file with viewer profiles
    #[arg(long, value_name = "PATH")]
    profiles: Option<PathBuf>,

    /// Reload the image when it changes on disk
    #[arg(short, long)]
    watch: bool,
}

/// A decoded image uploaded to the GPU.
pub struct LoadedImage {
    pub texture: TextureHandle,
    /// Intrinsic size, used to fit the image into the viewport at scale 1.
    pub logical_size: egui::Vec2,
}

/// Main application state for the diagram viewer.
pub struct DiagramViewerApp {
    profiles: ProfileSet,
    selected_profile: usize,
    viewer: PanZoom,
    source: ImageSource,
    alt_text: String,
    image_state: AssetLoadState,
    image: Option<LoadedImage>,
    watch: bool,
    file_watcher: Option<FileWatcher>,
    toasts: Toasts,
}

impl DiagramViewerApp {
    fn new(cc: &eframe::CreationContext<'_>, cli: Cli) -> Self {
        let mut toasts = Toasts::new()
            .anchor(egui::Align2::RIGHT_TOP, (-10.0, 10.0))
            .direction(egui::Direction::TopDown);

        let profiles = match load_profiles(cli.profiles.as_deref()) {
            Ok(profiles) => profiles,
            Err(err) => {
                log::warn!("{err}");
                add_error_toast(&mut toasts, err.to_string(), 10.0);
                ProfileSet::default()
            }
        };

        let persisted: PersistedState = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let selected_profile = match &cli.profile {
            Some(name) => profiles.position(name).unwrap_or_else(|| {
                let err = diagram_viewer::ProfileError::UnknownProfile(name.clone());
                log::warn!("{err}");
                add_error_toast(&mut toasts, err.to_string(), 8.0);
                profiles.default_index()
            }),
            None => persisted
                .profile
                .as_deref()
                .and_then(|name| profiles.position(name))
                .unwrap_or_else(|| profiles.default_index()),
        };

        let source = match cli.image {
            Some(path) => ImageSource::File(path),
            None => persisted
                .last_image
                .filter(|path| path.is_file())
                .map(ImageSource::File)
                .unwrap_or_else(ImageSource::demo),
        };

        let viewer = PanZoom::new(profiles.profiles[selected_profile].zoom.clone());
        log::info!(
            "Using profile '{}'",
            profiles.profiles[selected_profile].name
        );

        let mut app = Self {
            profiles,
            selected_profile,
            viewer,
            alt_text: String::new(),
            image_state: AssetLoadState::Error(String::new()),
            source: ImageSource::demo(),
            image: None,
            watch: cli.watch,
            file_watcher: None,
            toasts,
        };
        app.open_image(&cc.egui_ctx, source, cli.alt);
        app
    }

    fn current_profile(&self) -> &ViewerProfile {
        &self.profiles.profiles[self.selected_profile]
    }

    /// Switches profile; the viewer is rebuilt so its view starts at identity.
    fn select_profile(&mut self, idx: usize) {
        if idx == self.selected_profile || idx >= self.profiles.profiles.len() {
            return;
        }
        self.selected_profile = idx;
        self.viewer = PanZoom::new(self.current_profile().zoom.clone());
        log::info!("Switched to profile '{}'", self.current_profile().name);
    }

    /// Replaces the viewed image and starts decoding it.
    fn open_image(&mut self, ctx: &egui::Context, source: ImageSource, alt: Option<String>) {
        log::info!("Opening {source}");

        self.alt_text = alt.unwrap_or_else(|| default_alt_text(&source));
        self.viewer = PanZoom::new(self.current_profile().zoom.clone());
        self.image = None;
        self.image_state = spawn_load(source.clone(), ctx.clone());

        self.file_watcher = match source.file_path() {
            Some(path) if self.watch => {
                let watcher = FileWatcher::new(path, ctx.clone());
                if watcher.is_none() {
                    log::info!("File watching unavailable for {}", path.display());
                }
                watcher
            }
            _ => None,
        };

        self.source = source;
    }

    /// Moves a finished decode into a texture, or records the failure.
    fn poll_image(&mut self, ctx: &egui::Context) {
        let AssetLoadState::Loading(rx) = &self.image_state else {
            return;
        };

        let decoded = match rx.try_recv() {
            Ok(Ok(decoded)) => decoded,
            Ok(Err(err)) => return self.fail_image(err.to_string()),
            Err(mpsc::TryRecvError::Disconnected) => {
                return self.fail_image(format!("{}: channel disconnected", self.source));
            }
            Err(mpsc::TryRecvError::Empty) => return,
        };

        let texture = ctx.load_texture(
            self.source.to_string(),
            decoded.to_color_image(),
            TextureOptions::LINEAR,
        );
        self.image = Some(LoadedImage {
            texture,
            logical_size: decoded.logical_size,
        });
        self.image_state = AssetLoadState::Ready;
    }

    fn fail_image(&mut self, msg: String) {
        log::warn!("{msg}");
        add_error_toast(&mut self.toasts, msg.clone(), 8.0);
        self.image = None;
        self.image_state = AssetLoadState::Error(msg);
    }

    /// Re-decodes the image after an on-disk change, keeping the current view.
    fn poll_file_watcher(&mut self, ctx: &egui::Context) {
        let Some(watcher) = &mut self.file_watcher else {
            return;
        };
        if !watcher.poll() {
            return;
        }

        log::info!("{} changed, reloading", watcher.path().display());
        self.image_state = spawn_load(self.source.clone(), ctx.clone());
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.iter().find_map(|file| file.path.clone()));
        if let Some(path) = dropped {
            self.open_image(ctx, ImageSource::File(path), None);
        }
    }
}

impl eframe::App for DiagramViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.poll_file_watcher(ctx);
        self.poll_image(ctx);
        self.handle_keyboard_input(ctx);

        self.show_status_bar(ctx);
        self.show_sidebar(ctx);
        self.show_central_panel(ctx);

        // Show toasts
        self.toasts.show(ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let state = PersistedState {
            profile: Some(self.current_profile().name.clone()),
            last_image: self.source.file_path().map(|path| path.to_path_buf()),
        };
        eframe::set_value(storage, eframe::APP_KEY, &state);
    }
}

fn add_error_toast(toasts: &mut Toasts, text: String, seconds: f64) {
    toasts.add(Toast {
        kind: ToastKind::Error,
        text: text.into(),
        options: ToastOptions::default()
            .duration_in_seconds(seconds)
            .show_icon(true),
        ..Default::default()
    });
}

fn default_alt_text(source: &ImageSource) -> String {
    match source {
        ImageSource::Embedded(_) => "Demo architecture diagram".to_owned(),
        ImageSource::File(path) => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    }
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Diagram Viewer",
        options,
        Box::new(|cc| Ok(Box::new(DiagramViewerApp::new(cc, cli)))),
    )
}
