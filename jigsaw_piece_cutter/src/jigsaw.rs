use crate::compositor::composite_piece;
use crate::config::{GridConfig, JigsawConfig, PieceEntry};
use crate::error::{CutterError, CutterResult};
use crate::piece::Piece;
use flume::{Receiver, Sender};
use image::{ImageFormat, RgbaImage};
use log::{debug, error, info, warn};
use std::fs;
use std::path::PathBuf;
use std::thread;

/// File name prefix of every written piece.
pub const PIECE_PREFIX: &str = "Piece";
/// Directory under the image root receiving the pieces.
pub const PIECE_DIRECTORY: &str = "out";

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutSummary {
    pub pieces_written: usize,
    pub output_dir: PathBuf,
}

/// The cutting pipeline.
///
/// Holds the init file, the decoded grid and the full image. All three are read-only once
/// [`Jigsaw::init`] returns, so the stages borrow them concurrently without locking. Pieces move
/// between stages through rendezvous channels; sending a [`Piece`] transfers its canvas.
#[derive(Debug)]
pub struct Jigsaw {
    config: JigsawConfig,
    grid: GridConfig,
    full_image: RgbaImage,
    image_root: PathBuf,
}

impl Jigsaw {
    /// Creates the output directory and loads the full image.
    pub fn init(config: JigsawConfig, image_root: impl Into<PathBuf>) -> CutterResult<Self> {
        let image_root = image_root.into();
        let output_dir = image_root.join(PIECE_DIRECTORY);
        fs::create_dir_all(&output_dir).map_err(|source| CutterError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;

        let full_image_path = image_root.join(&config.full_image_location);
        let full_image = image::open(&full_image_path)
            .map_err(|source| {
                error!("could not load {}", full_image_path.display());
                CutterError::FullImageLoad {
                    path: full_image_path.clone(),
                    source,
                }
            })?
            .to_rgba8();
        info!(
            "loaded full image from {} with dimensions {}x{}",
            full_image_path.display(),
            full_image.width(),
            full_image.height()
        );
        Self::from_image(config, full_image, image_root)
    }

    /// Builds the pipeline around an already decoded full image.
    pub fn from_image(
        config: JigsawConfig,
        full_image: RgbaImage,
        image_root: impl Into<PathBuf>,
    ) -> CutterResult<Self> {
        let grid = config.grid()?;
        Ok(Jigsaw {
            config,
            grid,
            full_image,
            image_root: image_root.into(),
        })
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn full_image(&self) -> &RgbaImage {
        &self.full_image
    }

    pub fn output_dir(&self) -> PathBuf {
        self.image_root.join(PIECE_DIRECTORY)
    }

    pub fn piece_path(&self, index: usize) -> PathBuf {
        self.output_dir().join(Piece::file_name(PIECE_PREFIX, index))
    }

    fn template_path(&self, entry: &PieceEntry) -> PathBuf {
        self.image_root
            .join(&self.config.template_location)
            .join(&entry.file_location)
    }

    /// Loads every template in configuration order and hands each piece to `ready`.
    ///
    /// Stops at the first template that fails to load; dropping `ready` lets the later stages
    /// drain and finish. Returns the number of pieces handed off.
    ///
    /// # Errors
    ///
    /// [`CutterError::TemplateLoad`] for the first unreadable template.
    pub fn init_pieces(&self, ready: Sender<Piece>) -> CutterResult<usize> {
        info!("starting");
        for (index, entry) in self.config.pieces.iter().enumerate() {
            debug!("Adding piece {index}");
            let path = self.template_path(entry);
            let location = (entry.piece_location_x, entry.piece_location_y);
            let piece = Piece::load(index, &path, location).map_err(|source| {
                error!("Could not create template piece {index}: {source}");
                CutterError::TemplateLoad {
                    index,
                    path,
                    source,
                }
            })?;
            if ready.send(piece).is_err() {
                warn!("compositor stopped, {index} pieces initialized");
                return Ok(index);
            }
        }
        Ok(self.config.pieces.len())
    }

    /// Composites each piece received from `ready` and passes it on to `created`.
    ///
    /// Returns once `ready` is closed, or as soon as the writer has gone away.
    pub fn composite_pieces(&self, ready: Receiver<Piece>, created: Sender<Piece>) -> usize {
        let mut composited = 0;
        for mut piece in ready.iter() {
            info!("Transferring pixels for piece {}", piece.index);
            composite_piece(&mut piece, &self.full_image, &self.grid);
            if created.send(piece).is_err() {
                warn!("writer stopped, {composited} pieces composited");
                return composited;
            }
            composited += 1;
        }
        debug!("compositor received all jobs");
        composited
    }

    /// Writes each piece received from `created` and reports the outcome on `done`, once.
    pub fn save_pieces(&self, created: Receiver<Piece>, done: Sender<CutterResult<CutSummary>>) {
        let result = self.write_pieces(created);
        if done.send(result).is_err() {
            warn!("nobody is waiting for the pieces");
        }
    }

    fn write_pieces(&self, created: Receiver<Piece>) -> CutterResult<CutSummary> {
        let mut pieces_written = 0;
        for piece in created.iter() {
            info!("finishing piece {}", piece.index);
            let path = self.piece_path(piece.index);
            piece
                .cropped()
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|source| {
                    error!("could not save {}: {source}", path.display());
                    CutterError::Persist {
                        index: piece.index,
                        path: path.clone(),
                        source,
                    }
                })?;
            pieces_written += 1;
        }
        debug!("writer received all jobs");
        Ok(CutSummary {
            pieces_written,
            output_dir: self.output_dir(),
        })
    }

    /// Runs the three stages on their own threads and waits for the writer to finish.
    ///
    /// Pieces written before a failure stay on disk.
    ///
    /// # Errors
    ///
    /// The writer's error if it failed, otherwise the initializer's.
    pub fn run(&self) -> CutterResult<CutSummary> {
        let (ready_tx, ready_rx) = flume::bounded(0);
        let (created_tx, created_rx) = flume::bounded(0);
        let (done_tx, done_rx) = flume::bounded(1);

        thread::scope(|s| {
            let initializer = s.spawn(move || self.init_pieces(ready_tx));
            let compositor = s.spawn(move || self.composite_pieces(ready_rx, created_tx));
            let writer = s.spawn(move || self.save_pieces(created_rx, done_tx));

            // a panicking writer drops `done_tx` without sending
            let saved = done_rx.recv();
            let initialized = initializer.join();
            let composited = compositor.join();
            let written = writer.join();

            let initialized = initialized.map_err(|_| CutterError::StagePanicked("initializer"))?;
            let composited = composited.map_err(|_| CutterError::StagePanicked("compositor"))?;
            written.map_err(|_| CutterError::StagePanicked("writer"))?;
            let summary = saved.map_err(|_| CutterError::StagePanicked("writer"))??;
            let initialized = initialized?;

            info!(
                "Done: {initialized} initialized, {composited} composited, {} written",
                summary.pieces_written
            );
            Ok(summary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn config(pieces: usize) -> JigsawConfig {
        JigsawConfig {
            full_image_location: "full.png".to_string(),
            template_location: "templates".to_string(),
            pieces: (0..pieces)
                .map(|i| PieceEntry {
                    file_location: format!("t{i}.png"),
                    piece_location_x: 0,
                    piece_location_y: 0,
                })
                .collect(),
            piece_width: 2,
            piece_height: 2,
            piece_overflow: 0,
            piece_columns: 2,
            piece_rows: 1,
            template_off: 0xFF00_FFFF,
            template_on: 0xFFFF_FFFF,
        }
    }

    #[test]
    fn test_paths() {
        let jigsaw = Jigsaw::from_image(config(2), RgbaImage::new(4, 2), "root").unwrap();
        assert_eq!(jigsaw.output_dir(), PathBuf::from("root").join("out"));
        assert_eq!(
            jigsaw.piece_path(7),
            PathBuf::from("root").join("out").join("Piece7.png")
        );
        assert_eq!(
            jigsaw.template_path(&jigsaw.config.pieces[1]),
            PathBuf::from("root").join("templates").join("t1.png")
        );
    }

    #[test]
    fn test_compositor_drains_and_closes() {
        let jigsaw = Jigsaw::from_image(
            config(2),
            RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 255])),
            "root",
        )
        .unwrap();
        let (ready_tx, ready_rx) = flume::unbounded();
        let (created_tx, created_rx) = flume::unbounded();
        for index in 0..2 {
            let template = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
            ready_tx.send(Piece::new(index, "t.png", (0, 0), template)).unwrap();
        }
        drop(ready_tx);

        assert_eq!(jigsaw.composite_pieces(ready_rx, created_tx), 2);

        let pieces: Vec<_> = created_rx.iter().collect();
        assert_eq!(pieces.iter().map(|p| p.index).collect::<Vec<_>>(), vec![0, 1]);
        assert!(pieces[1].canvas.pixels().all(|p| *p == Rgba([1, 2, 3, 255])));
    }

    #[test]
    fn test_compositor_stops_when_writer_is_gone() {
        let jigsaw = Jigsaw::from_image(config(1), RgbaImage::new(2, 2), "root").unwrap();
        let (ready_tx, ready_rx) = flume::unbounded();
        let (created_tx, created_rx) = flume::bounded(0);
        drop(created_rx);
        ready_tx
            .send(Piece::new(0, "t.png", (0, 0), RgbaImage::new(2, 2)))
            .unwrap();
        drop(ready_tx);

        assert_eq!(jigsaw.composite_pieces(ready_rx, created_tx), 0);
    }

    fn write_templates(root: &std::path::Path, config: &JigsawConfig) {
        let dir = root.join(&config.template_location);
        fs::create_dir_all(&dir).unwrap();
        for entry in &config.pieces {
            RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]))
                .save(dir.join(&entry.file_location))
                .unwrap();
        }
    }

    #[test]
    fn test_initializer_emits_in_configuration_order() {
        let root = tempfile::tempdir().unwrap();
        write_templates(root.path(), &config(4));
        let jigsaw = Jigsaw::from_image(config(4), RgbaImage::new(8, 4), root.path()).unwrap();
        let (ready_tx, ready_rx) = flume::unbounded();

        assert_eq!(jigsaw.init_pieces(ready_tx).unwrap(), 4);

        let pieces: Vec<_> = ready_rx.iter().collect();
        assert_eq!(pieces.iter().map(|p| p.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert!(pieces.iter().all(|p| p.canvas.dimensions() == (2, 2)));
    }

    #[test]
    fn test_initializer_stops_when_compositor_is_gone() {
        let root = tempfile::tempdir().unwrap();
        write_templates(root.path(), &config(3));
        let jigsaw = Jigsaw::from_image(config(3), RgbaImage::new(4, 4), root.path()).unwrap();
        let (ready_tx, ready_rx) = flume::bounded(0);
        drop(ready_rx);

        assert_eq!(jigsaw.init_pieces(ready_tx).unwrap(), 0);
    }

    #[test]
    fn test_zero_columns_rejected() {
        let mut config = config(1);
        config.piece_columns = 0;
        assert!(Jigsaw::from_image(config, RgbaImage::new(1, 1), "root").is_err());
    }
}
