//! Fills a piece's canvas from the full image, pixel by pixel, using its template as a mask.

use crate::config::GridConfig;
use crate::offsets::compute_offsets;
use crate::piece::Piece;
use image::{Rgba, RgbaImage};
use log::debug;
use rayon::iter::ParallelIterator;

/// Top-left corner of a piece in full image coordinates, before subtracting its margins.
pub fn piece_anchor(index: usize, grid: &GridConfig) -> (i64, i64) {
    let offsets = compute_offsets(index, grid.columns, grid.piece_count, grid.overflow);
    let (column, row) = grid.cell(index);
    let overflow = i64::from(grid.overflow);
    (
        column as i64 * i64::from(grid.piece_width) - overflow + i64::from(offsets.left),
        row as i64 * i64::from(grid.piece_height) - overflow + i64::from(offsets.top),
    )
}

/// Composites one piece.
///
/// Template pixels matching the off color, and local coordinates lying beyond the full
/// image's width or height, become the off color. Every other pixel is copied from the full
/// image at the translated coordinate, clamped to the image.
pub fn composite_piece(piece: &mut Piece, full_image: &RgbaImage, grid: &GridConfig) {
    let offsets = compute_offsets(piece.index, grid.columns, grid.piece_count, grid.overflow);
    let (start_x, start_y) = piece_anchor(piece.index, grid);
    let origin_x = start_x - i64::from(offsets.left);
    let origin_y = start_y - i64::from(offsets.top);
    debug!(
        "piece {} anchored at ({start_x}, {start_y}) with {offsets:?}",
        piece.index
    );

    let (full_width, full_height) = full_image.dimensions();
    let off_color = grid.off_color;
    let template = &piece.template;
    piece
        .canvas
        .par_enumerate_pixels_mut()
        .for_each(|(x, y, pixel)| {
            // compares local coordinates, not the translated ones
            if x > full_width || y > full_height || is_off(*template.get_pixel(x, y), off_color)
            {
                *pixel = off_color;
                return;
            }
            *pixel = sample_clamped(
                full_image,
                i64::from(x) + origin_x,
                i64::from(y) + origin_y,
            )
            .unwrap_or(off_color);
        });
}

/// Widens a straight-alpha pixel to 16 bits per channel and premultiplies it.
fn premultiplied(Rgba([r, g, b, a]): Rgba<u8>) -> [u32; 4] {
    let a = u32::from(a) * 0x101;
    let channel = |c: u8| u32::from(c) * 0x101 * a / 0xffff;
    [channel(r), channel(g), channel(b), a]
}

/// Template pixels match the off color after premultiplying, so every fully transparent
/// pixel counts as a transparent sentinel whatever color it stores.
fn is_off(pixel: Rgba<u8>, off_color: Rgba<u8>) -> bool {
    premultiplied(pixel) == premultiplied(off_color)
}

/// Reads the full image, pulling out-of-range coordinates back onto its nearest edge.
/// `None` only for an empty image.
fn sample_clamped(image: &RgbaImage, x: i64, y: i64) -> Option<Rgba<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    let x = x.clamp(0, i64::from(width) - 1) as u32;
    let y = y.clamp(0, i64::from(height) - 1) as u32;
    Some(*image.get_pixel(x, y))
}
