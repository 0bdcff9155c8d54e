// src/processing/parallel.rs
use std::{ops::Range, thread};

use flume::{Receiver, Sender};

/// A row-aligned run of pixels, as linear indices into a row-major raster.
pub type Tile = Range<usize>;

/// Splits rasters into row tiles and runs a per-tile kernel on worker threads.
///
/// Tiles go out over a request channel and come back tagged with their tile
/// number, so the stitched output never depends on which worker finished first.
#[derive(Debug, Clone)]
pub struct TiledProcessor {
    workers: usize,
    tile_rows: usize,
}

impl Default for TiledProcessor {
    fn default() -> Self {
        Self::new(None, 64)
    }
}

impl TiledProcessor {
    pub fn new(workers: Option<usize>, tile_rows: usize) -> Self {
        let workers = workers.unwrap_or_else(num_cpus::get);

        Self {
            workers: workers.max(1),
            tile_rows: tile_rows.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Tiles covering a `(width, height)` raster, top to bottom.
    pub fn tiles(&self, shape: (usize, usize)) -> Vec<Tile> {
        let (width, height) = shape;
        (0..height)
            .step_by(self.tile_rows)
            .map(|row| row * width..(row + self.tile_rows).min(height) * width)
            .collect()
    }

    /// Run `kernel` on every tile and concatenate the results in raster order.
    ///
    /// `kernel` must return exactly one value per pixel of the tile it is given.
    pub fn map_tiles<T, F>(&self, shape: (usize, usize), kernel: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Tile) -> Vec<T> + Sync,
    {
        let tiles = self.tiles(shape);
        let num_tiles = tiles.len();

        if num_tiles <= 1 || self.workers == 1 {
            return tiles.into_iter().flat_map(&kernel).collect();
        }

        let (req_tx, req_rx): (Sender<(usize, Tile)>, Receiver<(usize, Tile)>) =
            flume::unbounded();
        for request in tiles.into_iter().enumerate() {
            // The receiver is held below, so an unbounded send cannot fail.
            let _ = req_tx.send(request);
        }
        drop(req_tx);

        let (res_tx, res_rx) = flume::unbounded::<(usize, Vec<T>)>();
        let kernel = &kernel;

        thread::scope(|scope| {
            for _ in 0..self.workers.min(num_tiles) {
                let req_rx = req_rx.clone();
                let res_tx = res_tx.clone();
                scope.spawn(move || {
                    for (idx, tile) in req_rx {
                        if res_tx.send((idx, kernel(tile))).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(res_tx);

            let mut parts: Vec<Option<Vec<T>>> = (0..num_tiles).map(|_| None).collect();
            for (idx, part) in res_rx.iter() {
                parts[idx] = Some(part);
            }
            parts.into_iter().flatten().flatten().collect()
        })
    }
}
