//! Frame-driven mapping session.
//!
//! The session owns the occupancy map behind a reader/writer lock:
//! - a frame merge takes the write lock without waiting and drops the frame
//!   when the map is in use,
//! - a scan takes the read lock with a bounded wait, copies the map and
//!   releases the lock before any ray is cast.
//!
//! The map is published to the [`MapSink`] while the merge still holds the
//! map (downgraded to a read lock), so the sink always sees a fully merged
//! map.

use crate::{MapSink, NullSink, TagTable, TapeMapConfig, TapeMapError, TargetLocator};
use image::RgbImage;
use log::{debug, info, warn};
use nalgebra::Point2;
use parking_lot::{RwLock, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use tapemap_core::DetectedRegion;
use tapemap_detect::{ColorMaskSegmenter, ContourShapeFilter, ExtractStats};
use tapemap_grid::{GridError, OccupancyAccumulator, OccupancyMap, RayMarchScanner, ScanResult};

#[cfg(feature = "tracing")]
use tracing::instrument;

const MAP_RESOURCE: &str = "occupancy map";

/// What one accepted frame contributed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub regions: Vec<DetectedRegion>,
    pub stats: ExtractStats,
}

pub struct TapeMapSession {
    config: TapeMapConfig,
    segmenter: ColorMaskSegmenter,
    filter: ContourShapeFilter,
    accumulator: OccupancyAccumulator,
    scanner: RayMarchScanner,
    map: RwLock<Option<OccupancyMap>>,
    locator: Box<dyn TargetLocator>,
    sink: Box<dyn MapSink>,
}

impl std::fmt::Debug for TapeMapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapeMapSession")
            .field("config", &self.config)
            .field("initialized", &self.map.try_read().map(|m| m.is_some()))
            .finish_non_exhaustive()
    }
}

impl TapeMapSession {
    /// Validate `config` and build a session with a [`TagTable`] locator and
    /// no sink.
    pub fn new(config: TapeMapConfig) -> Result<Self, TapeMapError> {
        config.validate()?;
        let segmenter = ColorMaskSegmenter::new(config.segment.clone())?;
        let filter = ContourShapeFilter::new(config.contours.clone())?;
        let accumulator = OccupancyAccumulator::new(config.accumulate.clone())
            .map_err(|e| TapeMapError::Config(e.into()))?;
        let scanner = RayMarchScanner::new(config.scan.clone())
            .map_err(|e| TapeMapError::Config(e.into()))?;
        let locator = TagTable::new(config.session.tag_lock_timeout());

        Ok(Self {
            config,
            segmenter,
            filter,
            accumulator,
            scanner,
            map: RwLock::new(None),
            locator: Box::new(locator),
            sink: Box::new(NullSink),
        })
    }

    pub fn with_sink(mut self, sink: impl MapSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_locator(mut self, locator: impl TargetLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    #[inline]
    pub fn config(&self) -> &TapeMapConfig {
        &self.config
    }

    /// Detect tape in `frame` and merge it into the map.
    ///
    /// The first accepted frame fixes the map size. Returns
    /// [`TapeMapError::ResourceBusy`] without touching the map when a merge
    /// or scan currently holds it.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn on_frame(&self, frame: &RgbImage) -> Result<FrameReport, TapeMapError> {
        let Some(mut guard) = self.map.try_write() else {
            warn!("map busy, dropping frame");
            return Err(TapeMapError::ResourceBusy {
                resource: MAP_RESOURCE,
            });
        };

        let mask = self.segmenter.segment(frame)?;
        let (regions, stats) = self.filter.extract_with_stats(&mask);

        let map = self
            .accumulator
            .init_if_empty(&mut *guard, frame.dimensions())
            .map_err(grid_input_error)?;
        let debug_layer = self
            .accumulator
            .merge_with_debug(map, &mask, &regions)
            .map_err(grid_input_error)?;
        debug!(
            "merged {} regions (found {}, too large {}, rectangular {})",
            stats.kept, stats.found, stats.too_large, stats.rectangular
        );

        let guard = RwLockWriteGuard::downgrade(guard);
        if let Some(map) = guard.as_ref() {
            if let Err(err) = self.sink.publish_map(map) {
                warn!("map publish failed: {err}");
            }
            if let Err(err) = self.sink.publish_debug(&debug_layer) {
                warn!("debug publish failed: {err}");
            }
        }

        Ok(FrameReport { regions, stats })
    }

    /// Decode an encoded image (PNG, JPEG, ...) and feed it to [`Self::on_frame`].
    pub fn on_frame_encoded(&self, bytes: &[u8]) -> Result<FrameReport, TapeMapError> {
        let frame = image::load_from_memory(bytes)?.to_rgb8();
        self.on_frame(&frame)
    }

    /// Forward a tag tracker report to the locator.
    pub fn on_tag_update(&self, tags: Vec<(String, Point2<f32>)>) {
        debug!("tag update with {} entries", tags.len());
        self.locator.update(tags);
    }

    /// Scan the map from the current position of `target`.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn request_scan(&self, target: &str) -> Result<ScanResult, TapeMapError> {
        let snapshot = self.snapshot_for_scan()?;
        let origin = self.locator.locate(target);
        self.scanner.scan(&snapshot, origin).map_err(|err| match err {
            GridError::TargetUnresolved => {
                info!("scan for {target:?}: target not found");
                TapeMapError::TargetUnresolved {
                    target: target.to_string(),
                }
            }
            other => TapeMapError::invalid(other),
        })
    }

    /// Scan the map from an explicit origin in map pixels.
    pub fn scan_from(&self, origin: Point2<f32>) -> Result<ScanResult, TapeMapError> {
        let snapshot = self.snapshot_for_scan()?;
        self.scanner
            .scan(&snapshot, Some(origin))
            .map_err(|err| match err {
                GridError::TargetUnresolved => TapeMapError::TargetUnresolved {
                    target: format!("({}, {})", origin.x, origin.y),
                },
                other => TapeMapError::invalid(other),
            })
    }

    /// Copy of the current map, `None` before the first frame.
    ///
    /// Waits for an in-progress merge to finish.
    pub fn map_snapshot(&self) -> Option<OccupancyMap> {
        self.map.read().clone()
    }

    fn snapshot_for_scan(&self) -> Result<OccupancyMap, TapeMapError> {
        let timeout = self.config.session.scan_lock_timeout();
        let Some(guard) = self.map.try_read_for(timeout) else {
            warn!("map busy for {timeout:?}, rejecting scan");
            return Err(TapeMapError::ResourceBusy {
                resource: MAP_RESOURCE,
            });
        };
        guard.as_ref().cloned().ok_or(TapeMapError::MapNotInitialized)
    }
}

fn grid_input_error(err: GridError) -> TapeMapError {
    match err {
        GridError::InvalidParams { .. } => TapeMapError::Config(err.into()),
        other => TapeMapError::invalid(other),
    }
}
