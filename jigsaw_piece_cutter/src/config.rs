//! The init file read by the cutter and the grid geometry derived from it.
//!
//! Colors arrive packed into a single `0xRRGGBBAA` integer and are decoded here, so that the
//! pipeline only ever sees [`Rgba<u8>`] values.

use crate::error::{CutterError, CutterResult};
use image::Rgba;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One entry of the `pieces` list in the init file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceEntry {
    /// Template file, relative to the template directory
    pub file_location: String,
    #[serde(default)]
    pub piece_location_x: i32,
    #[serde(default)]
    pub piece_location_y: i32,
}

/// The init file as written by the puzzle author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JigsawConfig {
    /// Full image, relative to the image root
    pub full_image_location: String,
    /// Template directory, relative to the image root
    pub template_location: String,
    pub pieces: Vec<PieceEntry>,
    pub piece_width: u32,
    pub piece_height: u32,
    /// Pixels shared between adjacent pieces
    pub piece_overflow: u32,
    pub piece_columns: usize,
    /// Not used for any computation, rows are derived from the piece index.
    #[serde(default)]
    pub piece_rows: usize,
    /// Packed `0xRRGGBBAA` sentinel marking template pixels outside the piece
    pub template_off: u32,
    /// Packed `0xRRGGBBAA` color used when authoring templates
    #[serde(default)]
    pub template_on: u32,
}

impl JigsawConfig {
    pub fn from_path(path: impl AsRef<Path>) -> CutterResult<Self> {
        let path = path.as_ref();
        info!("Opening {}", path.display());
        let contents = fs::read_to_string(path).map_err(|source| CutterError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Reading init");
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> CutterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decodes the geometry and colors the pipeline works with.
    pub fn grid(&self) -> CutterResult<GridConfig> {
        if self.piece_columns == 0 {
            return Err(CutterError::invalid_grid(
                "pieceColumns must be greater than zero",
            ));
        }
        Ok(GridConfig {
            piece_width: self.piece_width,
            piece_height: self.piece_height,
            overflow: self.piece_overflow,
            columns: self.piece_columns,
            rows: self.piece_rows,
            piece_count: self.pieces.len(),
            off_color: unpack_rgba(self.template_off),
            on_color: unpack_rgba(self.template_on),
        })
    }
}

/// Grid geometry shared read-only by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub piece_width: u32,
    pub piece_height: u32,
    pub overflow: u32,
    pub columns: usize,
    pub rows: usize,
    pub piece_count: usize,
    pub off_color: Rgba<u8>,
    pub on_color: Rgba<u8>,
}

impl GridConfig {
    /// `(column, row)` of a piece, row-major.
    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index % self.columns, index / self.columns)
    }
}

/// Splits a packed `0xRRGGBBAA` integer into its channels.
pub fn unpack_rgba(packed: u32) -> Rgba<u8> {
    Rgba(packed.to_be_bytes())
}
