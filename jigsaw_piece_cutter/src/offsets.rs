/// Margins applied on each side of a piece. Each one is either `0` or the grid's overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PieceOffsets {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Returns the margins of the piece at `index` in a grid with `columns` columns and
/// `piece_count` pieces in total.
///
/// The right margin is always `overflow`, whether or not the piece sits on the right edge.
/// Pieces placed in the last `columns` slots of the list are bottom pieces.
///
/// # Panics
///
/// Panics if `columns` is zero.
pub fn compute_offsets(
    index: usize,
    columns: usize,
    piece_count: usize,
    overflow: u32,
) -> PieceOffsets {
    assert!(columns > 0, "a grid needs at least one column");
    let edge = |touches: bool| if touches { overflow } else { 0 };
    PieceOffsets {
        top: edge(index < columns),
        bottom: edge(index >= piece_count.saturating_sub(columns)),
        left: edge(index % columns == 0),
        right: overflow,
    }
}
