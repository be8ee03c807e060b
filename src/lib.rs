use anyhow::{Context, Result};
use clap::Parser;
use jigsaw_piece_cutter::{CutSummary, Jigsaw, JigsawConfig};
use log::info;
use std::path::PathBuf;

/// Cuts jigsaw puzzle pieces out of a full image using one template per piece.
///
/// Pieces are written to `<IMAGES>/out/Piece<N>.png`.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "jigsaw_cutter", version)]
pub struct Cli {
    /// Initialization file location
    #[arg(long, value_name = "FILE")]
    pub init: PathBuf,

    /// Root directory for images
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub images: PathBuf,
}

/// Loads the init file and the full image, then runs the cutting pipeline to completion.
pub fn run(cli: &Cli) -> Result<CutSummary> {
    let config = JigsawConfig::from_path(&cli.init)
        .with_context(|| format!("could not read {}", cli.init.display()))?;
    let jigsaw = Jigsaw::init(config, &cli.images).context("Could not initialize jigsaw")?;
    let summary = jigsaw.run().context("Could not cut the jigsaw pieces")?;
    info!(
        "wrote {} pieces to {}",
        summary.pieces_written,
        summary.output_dir.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jigsaw_piece_cutter::image::{Rgba, RgbaImage};
    use std::fs;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from(["jigsaw_cutter", "--init", "init.json", "--images", "imgs"])
            .unwrap();
        assert_eq!(cli.init, PathBuf::from("init.json"));
        assert_eq!(cli.images, PathBuf::from("imgs"));

        let cli = Cli::try_parse_from(["jigsaw_cutter", "--init", "init.json"]).unwrap();
        assert_eq!(cli.images, PathBuf::from("."));
    }

    #[test]
    fn test_init_is_required() {
        assert!(Cli::try_parse_from(["jigsaw_cutter", "--images", "imgs"]).is_err());
    }

    #[test]
    fn test_run_cuts_every_piece() {
        let root = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(6, 3, Rgba([10, 20, 30, 255]))
            .save(root.path().join("full.png"))
            .unwrap();
        fs::create_dir_all(root.path().join("templates")).unwrap();
        for name in ["left.png", "right.png"] {
            RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]))
                .save(root.path().join("templates").join(name))
                .unwrap();
        }
        let init = root.path().join("init.json");
        fs::write(
            &init,
            r#"{
                "fullImageLocation": "full.png",
                "templateLocation": "templates",
                "pieces": [
                    { "fileLocation": "left.png", "pieceLocationX": 0, "pieceLocationY": 0 },
                    { "fileLocation": "right.png", "pieceLocationX": 3, "pieceLocationY": 0 }
                ],
                "pieceWidth": 3,
                "pieceHeight": 3,
                "pieceOverflow": 0,
                "pieceColumns": 2,
                "pieceRows": 1,
                "templateOff": 0,
                "templateOn": 4294967295
            }"#,
        )
        .unwrap();

        let summary = run(&Cli {
            init,
            images: root.path().to_path_buf(),
        })
        .unwrap();

        assert_eq!(summary.pieces_written, 2);
        assert!(root.path().join("out").join("Piece1.png").exists());
    }

    #[test]
    fn test_run_reports_missing_init() {
        let root = tempfile::tempdir().unwrap();
        let err = run(&Cli {
            init: root.path().join("missing.json"),
            images: root.path().to_path_buf(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }
}
