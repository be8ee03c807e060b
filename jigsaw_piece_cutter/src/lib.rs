//! The Jigsaw Piece Cutter library cuts the pieces of a jigsaw puzzle out of a full photograph.
//! Every piece comes with a template image: template pixels painted in the sentinel "off"
//! color lie outside the piece, every other pixel is copied from the photograph.
//!
//! - [`compute_offsets`] returns the overflow margins of a piece on each of its sides
//! - [`composite_piece`] fills a single piece's canvas from the full image
//! - [`Jigsaw`] loads the init file's images and runs the three stage pipeline
//!   (template loading, compositing, writing) on its own threads

mod compositor;
mod config;
mod error;
mod jigsaw;
mod offsets;
mod piece;

pub use compositor::{composite_piece, piece_anchor};
pub use config::{unpack_rgba, GridConfig, JigsawConfig, PieceEntry};
pub use error::{CutterError, CutterResult};
pub use jigsaw::{CutSummary, Jigsaw, PIECE_DIRECTORY, PIECE_PREFIX};
pub use offsets::{compute_offsets, PieceOffsets};
pub use piece::Piece;

pub use flume;
pub use image;
