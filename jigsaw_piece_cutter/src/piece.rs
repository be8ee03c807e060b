use image::{imageops, ImageResult, RgbaImage};
use log::debug;
use std::path::{Path, PathBuf};

/// A single puzzle piece travelling through the pipeline.
///
/// Whoever holds the `Piece` owns its canvas. Sending it to the next stage hands over the
/// right to write into the canvas, so no two stages ever touch the same pixels.
#[derive(Debug, Clone)]
pub struct Piece {
    /// Position in the configured piece list, row-major
    pub index: usize,
    pub template_path: PathBuf,
    /// `pieceLocationX` / `pieceLocationY` from the init file
    pub location: (i32, i32),
    /// Mask whose sentinel-colored pixels lie outside the piece
    pub template: RgbaImage,
    /// Output raster, same bounds as the template
    pub canvas: RgbaImage,
}

impl Piece {
    /// Wraps an already decoded template and allocates a transparent canvas of the same size.
    pub fn new(
        index: usize,
        template_path: impl Into<PathBuf>,
        location: (i32, i32),
        template: RgbaImage,
    ) -> Self {
        let (width, height) = template.dimensions();
        Piece {
            index,
            template_path: template_path.into(),
            location,
            template,
            canvas: RgbaImage::new(width, height),
        }
    }

    pub fn load(index: usize, template_path: &Path, location: (i32, i32)) -> ImageResult<Self> {
        let template = image::open(template_path)?.to_rgba8();
        debug!(
            "loaded template {} for piece {index} with dimensions {}x{}",
            template_path.display(),
            template.width(),
            template.height()
        );
        Ok(Piece::new(index, template_path, location, template))
    }

    /// The canvas restricted to the template's bounds.
    pub fn cropped(&self) -> RgbaImage {
        let (width, height) = self.template.dimensions();
        imageops::crop_imm(&self.canvas, 0, 0, width, height).to_image()
    }

    pub fn file_name(prefix: &str, index: usize) -> String {
        format!("{prefix}{index}.png")
    }
}
