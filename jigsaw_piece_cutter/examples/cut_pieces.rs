use env_logger::{Builder, Env};
use jigsaw_piece_cutter::{Jigsaw, JigsawConfig};
use log::info;
use std::env;

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("debug"))
        .format_timestamp_millis()
        .init();
    let init_path = env::args()
        .nth(1)
        .unwrap_or("assets/puzzle/init.json".to_string());
    let image_root = env::args().nth(2).unwrap_or("assets/puzzle".to_string());

    let config = JigsawConfig::from_path(&init_path)?;
    let jigsaw = Jigsaw::init(config, image_root)?;
    let grid = jigsaw.grid();
    info!(
        "cutting {} pieces of {}x{} with {} overflow",
        grid.piece_count, grid.piece_width, grid.piece_height, grid.overflow
    );
    let summary = jigsaw.run()?;
    info!(
        "{} pieces saved in {}",
        summary.pieces_written,
        summary.output_dir.display()
    );
    Ok(())
}
