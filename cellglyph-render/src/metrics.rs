use crate::context::RenderContext;
use crate::error::Error;
use crate::font::Style;

/// Cell height must land in this range once the additive/multiplicative
/// adjustments are applied; outside it, the configuration is rejected
/// wholesale rather than clamped.
const MIN_CELL_HEIGHT: u32 = 4;
const MAX_CELL_HEIGHT: u32 = 1000;

impl RenderContext {
    /// Recomputes cell geometry for every configured face at `pt_size` and
    /// resolution `(xdpi, ydpi)`, then resets the sprite tracker's layout
    /// and every font's sprite cache to match.
    ///
    /// A failure here is fatal for this reconfiguration attempt; callers
    /// (notably [`RenderContext::set_font`]) leave the previous
    /// configuration untouched.
    pub fn update_cell_metrics(&mut self, pt_size: f32, xdpi: f32, ydpi: f32) -> Result<(), Error> {
        let size_1_64 = (pt_size * 64.0).round().max(1.0) as u32;

        for font in self.roster.all_mut() {
            font.face.set_size(size_1_64, size_1_64, xdpi, ydpi)?;
            font.cache.clear();
        }

        let medium = self.roster.styled(Style::Medium).ok_or(Error::NoCellWidth)?;
        let metrics = medium.face.cell_metrics()?;
        if metrics.width == 0 {
            return Err(Error::NoCellWidth);
        }

        let height = apply_height_adjustment(metrics.height, self.height_delta, self.height_scale)?;

        self.cell_width = metrics.width;
        self.cell_height = height;
        self.baseline = metrics.baseline;
        self.underline_position = metrics.underline_position.min(height - 1);
        self.underline_thickness = metrics.underline_thickness;

        self.tracker.set_layout(self.cell_width, self.cell_height);
        self.box_cache.clear();
        self.blank_sprite = self.tracker.allocate_next()?;
        self.missing_sprite = self.tracker.allocate_next()?;

        if let Some(sink) = self.sink.as_deref_mut() {
            let (xnum, ynum, z) = self.tracker.current_layout();
            sink.resize_atlas(xnum * self.cell_width, ynum * self.cell_height, z + 1);
        }

        tracing::info!(
            width = self.cell_width,
            height = self.cell_height,
            baseline = self.baseline,
            "cell metrics recomputed"
        );
        Ok(())
    }
}

/// Applies the additive delta then the multiplicative scale to
/// `base_height`, rejecting the result if it falls outside
/// `MIN_CELL_HEIGHT..=MAX_CELL_HEIGHT` rather than clamping it into range.
fn apply_height_adjustment(base_height: u32, delta: i32, scale: f32) -> Result<u32, Error> {
    let mut height = base_height as i32 + delta;
    if (scale - 1.0).abs() > f32::EPSILON {
        height = (height as f32 * scale).round() as i32;
    }
    let height = height.clamp(0, i32::MAX) as u32;
    if !(MIN_CELL_HEIGHT..=MAX_CELL_HEIGHT).contains(&height) {
        return Err(Error::BadCellHeight(height));
    }
    Ok(height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_cell_metrics_rejects_missing_medium_face_before_touching_height() {
        let mut ctx = RenderContext::new();
        ctx.set_cell_height_adjustment(-1000, 1.0);
        assert!(matches!(ctx.update_cell_metrics(12.0, 96.0, 96.0), Err(Error::NoCellWidth)));
    }

    #[test]
    fn height_below_minimum_is_rejected_not_clamped() {
        assert!(matches!(apply_height_adjustment(0, 0, 1.0), Err(Error::BadCellHeight(0))));
    }

    #[test]
    fn height_above_maximum_is_rejected_not_clamped() {
        assert!(matches!(apply_height_adjustment(2000, 0, 1.0), Err(Error::BadCellHeight(2000))));
    }

    #[test]
    fn height_within_range_applies_delta_then_scale() {
        // (20 + 4) * 2.0 = 48
        assert_eq!(apply_height_adjustment(20, 4, 2.0).unwrap(), 48);
    }
}
