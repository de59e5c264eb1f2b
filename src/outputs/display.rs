use std::collections::HashMap;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The round panel is 240x240; every face is fitted to it at load time.
pub const FACE_SIZE: u32 = 240;

/// Face ids the loop can show. Every one of these must be resolvable before
/// the loop starts: render latency has to be effectively zero at tick rate,
/// so there is no on-demand loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expression {
    Idle,
    Working,
    Break,
    Distracted,
    BreakReminder,
    Loading,
    Connected,
}

impl Expression {
    pub const ALL: [Expression; 7] = [
        Expression::Idle,
        Expression::Working,
        Expression::Break,
        Expression::Distracted,
        Expression::BreakReminder,
        Expression::Loading,
        Expression::Connected,
    ];

    pub fn file_stem(&self) -> &'static str {
        match self {
            Expression::Idle => "idle",
            Expression::Working => "working",
            Expression::Break => "break",
            Expression::Distracted => "distracted",
            Expression::BreakReminder => "break-reminder",
            Expression::Loading => "loading",
            Expression::Connected => "connected",
        }
    }
}

#[derive(Debug, Error)]
pub enum FaceError {
    #[error("face asset missing: {0}")]
    Missing(String),
    #[error("face asset unreadable: {0}")]
    Unreadable(#[from] image::ImageError),
}

/// All faces decoded, fitted to the panel and held in RAM.
pub struct FaceLibrary {
    faces: HashMap<Expression, RgbImage>,
}

impl FaceLibrary {
    /// Load every face or fail. A missing asset at boot is fatal; there is
    /// no partial library.
    pub fn load(dir: &Path) -> Result<Self, FaceError> {
        let mut faces = HashMap::new();
        for expression in Expression::ALL {
            let stem = expression.file_stem();
            let path = ["png", "bmp"]
                .iter()
                .map(|ext| dir.join(format!("{stem}.{ext}")))
                .find(|p| p.exists())
                .ok_or_else(|| FaceError::Missing(dir.join(stem).display().to_string()))?;

            let img = image::open(&path)?.to_rgb8();
            let fitted = imageops::resize(&img, FACE_SIZE, FACE_SIZE, FilterType::Lanczos3);
            faces.insert(expression, fitted);
            debug!(face = stem, "face loaded");
        }
        info!(count = faces.len(), "face library ready");
        Ok(Self { faces })
    }

    pub fn get(&self, expression: Expression) -> Option<&RgbImage> {
        self.faces.get(&expression)
    }
}

/// Where a fitted face actually goes. The SPI panel driver implements this
/// on the robot; rigs without the panel attached log instead.
pub trait Panel: Send {
    fn blit(&mut self, frame: &RgbImage);
}

pub struct LogPanel;

impl Panel for LogPanel {
    fn blit(&mut self, frame: &RgbImage) {
        debug!(width = frame.width(), height = frame.height(), "panel frame");
    }
}

/// The expression sink the driver feeds. Re-showing the current expression
/// is a no-op, so repeated effects stay idempotent.
pub struct Display<P: Panel> {
    library: FaceLibrary,
    panel: P,
    current: Option<Expression>,
}

impl<P: Panel> Display<P> {
    pub fn new(library: FaceLibrary, panel: P) -> Self {
        Self {
            library,
            panel,
            current: None,
        }
    }

    pub fn show(&mut self, expression: Expression) {
        if self.current == Some(expression) {
            return;
        }
        self.current = Some(expression);
        info!(face = expression.file_stem(), "expression");
        match self.library.get(expression) {
            Some(face) => self.panel.blit(face),
            None => warn!(face = expression.file_stem(), "face not in library"),
        }
    }
}
