use crate::{AccumulateParams, GridError, OccupancyMap, ScratchBase, NEUTRAL};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use log::info;
use tapemap_core::DetectedRegion;

#[cfg(feature = "tracing")]
use tracing::instrument;

const DEBUG_FILL: Rgb<u8> = Rgb([255, 255, 255]);

/// Blends per-frame detections into the persistent occupancy map.
#[derive(Clone, Debug)]
pub struct OccupancyAccumulator {
    params: AccumulateParams,
}

impl OccupancyAccumulator {
    pub fn new(params: AccumulateParams) -> Result<Self, GridError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &AccumulateParams {
        &self.params
    }

    /// Allocate a neutral map on first use, otherwise check the frame size.
    ///
    /// A later frame with different dimensions is an error; the map is
    /// never resized.
    pub fn init_if_empty<'a>(
        &self,
        map: &'a mut Option<OccupancyMap>,
        frame_size: (u32, u32),
    ) -> Result<&'a mut OccupancyMap, GridError> {
        let (width, height) = frame_size;
        match map.as_ref() {
            Some(existing) if existing.dimensions() != frame_size => {
                return Err(GridError::SizeMismatch {
                    expected: existing.dimensions(),
                    got: frame_size,
                });
            }
            Some(_) => {}
            None => {
                *map = Some(OccupancyMap::filled(width, height, NEUTRAL)?);
                info!("allocated occupancy map {width}x{height}");
            }
        }
        map.as_mut().ok_or(GridError::EmptyMap { width, height })
    }

    /// Blend one frame into `map`.
    ///
    /// The scratch layer is the frame's obstacle `mask` (or neutral, see
    /// [`ScratchBase`]) with every region drawn on top as a disk of
    /// `region_value`. Every cell then moves towards the scratch layer by
    /// `blend_weight`. `mask` must have the map's dimensions.
    pub fn merge(
        &self,
        map: &mut OccupancyMap,
        mask: &GrayImage,
        regions: &[DetectedRegion],
    ) -> Result<(), GridError> {
        let scratch = self.render_scratch(map.dimensions(), mask, regions)?;
        self.blend(map, &scratch);
        Ok(())
    }

    /// [`Self::merge`] plus the annotated layer: black background, each region
    /// a full-bright disk. The annotated layer is for visualization only.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, map, mask, regions), fields(regions = regions.len()))
    )]
    pub fn merge_with_debug(
        &self,
        map: &mut OccupancyMap,
        mask: &GrayImage,
        regions: &[DetectedRegion],
    ) -> Result<RgbImage, GridError> {
        self.merge(map, mask, regions)?;

        let (w, h) = map.dimensions();
        let mut debug = RgbImage::new(w, h);
        for r in regions {
            let (center, radius) = disk_raster(r);
            draw_filled_circle_mut(&mut debug, center, radius, DEBUG_FILL);
        }
        Ok(debug)
    }

    fn render_scratch(
        &self,
        (w, h): (u32, u32),
        mask: &GrayImage,
        regions: &[DetectedRegion],
    ) -> Result<GrayImage, GridError> {
        if mask.dimensions() != (w, h) {
            return Err(GridError::SizeMismatch {
                expected: (w, h),
                got: mask.dimensions(),
            });
        }
        let mut scratch = match self.params.base {
            ScratchBase::Mask => mask.clone(),
            ScratchBase::Neutral => GrayImage::from_pixel(w, h, Luma([NEUTRAL as u8])),
        };
        let fill = Luma([self.params.region_value]);
        for r in regions {
            let (center, radius) = disk_raster(r);
            draw_filled_circle_mut(&mut scratch, center, radius, fill);
        }
        Ok(scratch)
    }

    fn blend(&self, map: &mut OccupancyMap, scratch: &GrayImage) {
        let w_new = self.params.blend_weight;
        let w_old = 1.0 - w_new;
        for (cell, s) in map.data_mut().iter_mut().zip(scratch.as_raw()) {
            *cell = (w_new * *s as f32 + w_old * *cell).clamp(0.0, 255.0);
        }
    }
}

/// Pixel center (rounded) and integer radius (truncated) for drawing.
fn disk_raster(r: &DetectedRegion) -> ((i32, i32), i32) {
    let center = (r.center.x.round() as i32, r.center.y.round() as i32);
    (center, r.inflation_radius.max(0.0) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn accumulator(base: ScratchBase) -> OccupancyAccumulator {
        OccupancyAccumulator::new(AccumulateParams {
            base,
            ..AccumulateParams::default()
        })
        .unwrap()
    }

    fn floor_mask(w: u32, h: u32) -> GrayImage {
        GrayImage::new(w, h)
    }

    #[test]
    fn first_frame_allocates_neutral_map() {
        let acc = accumulator(ScratchBase::Mask);
        let mut slot = None;
        let map = acc.init_if_empty(&mut slot, (8, 6)).unwrap();
        assert_eq!(map.dimensions(), (8, 6));
        assert!(map.data().iter().all(|&v| v == NEUTRAL));
        assert!(slot.is_some());
    }

    #[test]
    fn size_change_is_an_error_not_a_reinit() {
        let acc = accumulator(ScratchBase::Mask);
        let mut slot = None;
        acc.init_if_empty(&mut slot, (8, 6)).unwrap().set(1, 1, 0.0);

        let err = acc.init_if_empty(&mut slot, (9, 6)).unwrap_err();
        assert_eq!(
            err,
            GridError::SizeMismatch {
                expected: (8, 6),
                got: (9, 6)
            }
        );
        assert_eq!(slot.as_ref().and_then(|m| m.get(1, 1)), Some(0.0));
    }

    #[test]
    fn zero_sized_reference_is_rejected() {
        let mut slot = None;
        assert!(accumulator(ScratchBase::Mask)
            .init_if_empty(&mut slot, (0, 10))
            .is_err());
        assert!(slot.is_none());
    }

    #[test]
    fn mismatched_mask_leaves_the_map_alone() {
        let acc = accumulator(ScratchBase::Mask);
        let mut map = OccupancyMap::neutral(8, 8);
        let err = acc.merge(&mut map, &floor_mask(8, 7), &[]).unwrap_err();
        assert_eq!(
            err,
            GridError::SizeMismatch {
                expected: (8, 8),
                got: (8, 7)
            }
        );
        assert!(map.data().iter().all(|&v| v == NEUTRAL));
    }

    #[test]
    fn mask_layer_pulls_tape_up_and_floor_down() {
        let acc = accumulator(ScratchBase::Mask);
        let mut map = OccupancyMap::neutral(10, 10);
        let mut mask = floor_mask(10, 10);
        mask.put_pixel(2, 3, Luma([255]));

        for k in 1..=5 {
            acc.merge(&mut map, &mask, &[]).unwrap();
            let f = 0.5f32.powi(k);
            assert_relative_eq!(map.get(2, 3).unwrap(), 255.0 - 128.0 * f, max_relative = 1e-5);
            assert_relative_eq!(map.get(7, 7).unwrap(), 127.0 * f, max_relative = 1e-5);
        }
    }

    #[test]
    fn region_disks_are_drawn_over_the_mask() {
        let acc = accumulator(ScratchBase::Mask);
        let mut map = OccupancyMap::neutral(21, 21);
        let mask = GrayImage::from_pixel(21, 21, Luma([255]));
        let region = DetectedRegion::disk(Point2::new(10.0, 10.0), 3.0);

        acc.merge(&mut map, &mask, &[region]).unwrap();
        assert_relative_eq!(map.get(10, 10).unwrap(), 63.5);
        assert_relative_eq!(map.get(13, 10).unwrap(), 63.5);
        assert_relative_eq!(map.get(0, 0).unwrap(), 191.0);
    }

    #[test]
    fn occupied_cell_converges_geometrically() {
        let acc = accumulator(ScratchBase::Neutral);
        let mut map = OccupancyMap::neutral(21, 21);
        let mask = floor_mask(21, 21);
        let region = DetectedRegion::disk(Point2::new(10.0, 10.0), 3.0);
        for k in 1..=12 {
            acc.merge(&mut map, &mask, &[region]).unwrap();
            let expected = 127.0 * 0.5f32.powi(k);
            assert_relative_eq!(map.get(10, 10).unwrap(), expected, max_relative = 1e-5);
        }
        assert!(map.get(10, 10).unwrap() > 0.0);
        assert_eq!(map.get(0, 0), Some(NEUTRAL));
    }

    #[test]
    fn neutral_base_decays_untouched_cells_back_to_neutral() {
        let acc = accumulator(ScratchBase::Neutral);
        let mut map = OccupancyMap::neutral(10, 10);
        let mask = GrayImage::from_pixel(10, 10, Luma([255]));
        map.set(4, 4, 7.0);
        map.set(5, 5, 247.0);
        for k in 1..=6 {
            acc.merge(&mut map, &mask, &[]).unwrap();
            let f = 0.5f32.powi(k);
            assert_relative_eq!(map.get(4, 4).unwrap(), 127.0 - 120.0 * f, max_relative = 1e-5);
            assert_relative_eq!(map.get(5, 5).unwrap(), 127.0 + 120.0 * f, max_relative = 1e-5);
        }
    }

    #[test]
    fn debug_layer_marks_region_disks_only() {
        let acc = accumulator(ScratchBase::Neutral);
        let mut map = OccupancyMap::neutral(30, 30);
        let debug = acc
            .merge_with_debug(
                &mut map,
                &floor_mask(30, 30),
                &[DetectedRegion::disk(Point2::new(10.2, 9.8), 4.9)],
            )
            .unwrap();
        assert_eq!(debug.dimensions(), (30, 30));
        assert_eq!(*debug.get_pixel(10, 10), DEBUG_FILL);
        assert_eq!(*debug.get_pixel(14, 10), DEBUG_FILL);
        assert_eq!(*debug.get_pixel(16, 10), Rgb([0, 0, 0]));
        assert_eq!(*debug.get_pixel(29, 29), Rgb([0, 0, 0]));
        assert_relative_eq!(map.get(10, 10).unwrap(), 63.5);
    }
}
