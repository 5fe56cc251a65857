//! Destinations for the rendered occupancy map.

use image::{GrayImage, RgbImage};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tapemap_grid::OccupancyMap;

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Receives the map after every merge.
///
/// Encoding and transport are the sink's business; the session only logs
/// sink failures.
pub trait MapSink: Send + Sync {
    fn publish_map(&self, map: &OccupancyMap) -> Result<(), SinkError>;

    /// Annotated layer of the same merge. Ignored by default.
    fn publish_debug(&self, _debug: &RgbImage) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: MapSink + ?Sized> MapSink for Arc<S> {
    fn publish_map(&self, map: &OccupancyMap) -> Result<(), SinkError> {
        (**self).publish_map(map)
    }

    fn publish_debug(&self, debug: &RgbImage) -> Result<(), SinkError> {
        (**self).publish_debug(debug)
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl MapSink for NullSink {
    fn publish_map(&self, _map: &OccupancyMap) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Keeps the most recent mono8 rendering in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    last: Mutex<Option<GrayImage>>,
    last_debug: Mutex<Option<RgbImage>>,
    published: AtomicU64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_map(&self) -> Option<GrayImage> {
        self.last.lock().clone()
    }

    pub fn last_debug(&self) -> Option<RgbImage> {
        self.last_debug.lock().clone()
    }

    /// Number of maps published so far.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl MapSink for MemorySink {
    fn publish_map(&self, map: &OccupancyMap) -> Result<(), SinkError> {
        *self.last.lock() = Some(map.to_gray_image());
        self.published.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn publish_debug(&self, debug: &RgbImage) -> Result<(), SinkError> {
        *self.last_debug.lock() = Some(debug.clone());
        Ok(())
    }
}

/// Writes `map_000000.png`, `map_000001.png`, ... into a directory.
#[derive(Debug)]
pub struct PngSink {
    dir: PathBuf,
    with_debug: bool,
    counter: AtomicU64,
}

impl PngSink {
    /// Create the output directory if needed.
    pub fn new(dir: impl Into<PathBuf>, with_debug: bool) -> Result<Self, SinkError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            with_debug,
            counter: AtomicU64::new(0),
        })
    }
}

impl MapSink for PngSink {
    fn publish_map(&self, map: &OccupancyMap) -> Result<(), SinkError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        map.to_gray_image()
            .save(self.dir.join(format!("map_{n:06}.png")))?;
        Ok(())
    }

    fn publish_debug(&self, debug: &RgbImage) -> Result<(), SinkError> {
        if !self.with_debug {
            return Ok(());
        }
        // publish_map runs first for the same merge
        let n = self.counter.load(Ordering::Relaxed).saturating_sub(1);
        debug.save(self.dir.join(format!("debug_{n:06}.png")))?;
        Ok(())
    }
}
