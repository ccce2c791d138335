use crate::error::Error;
use crate::face::Face;

/// Intensity above which a sample counts as non-empty when trimming
/// overflowing italic glyphs.
const TRIM_INTENSITY_THRESHOLD: u8 = 200;

/// A rasterized, not-yet-placed glyph bitmap: 8-bit grayscale intensity,
/// row-major, `stride` bytes per row (`stride >= width`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedBitmap {
    /// Pixel data, `rows * stride` bytes.
    pub buf: Vec<u8>,
    /// Column offset into each row where real content starts; columns
    /// before this in a composited canvas are left untouched.
    pub start_x: u32,
    /// Visible width in pixels (after any trimming).
    pub width: u32,
    /// Bytes between the start of consecutive rows.
    pub stride: u32,
    /// Row count.
    pub rows: u32,
    /// Horizontal distance from the pen origin to the left edge of the
    /// glyph outline, in pixels.
    pub bearing_x: i32,
    /// Vertical distance from the pen origin (baseline) to the top edge of
    /// the glyph outline, in pixels.
    pub bearing_y: i32,
}

impl ProcessedBitmap {
    fn row(&self, r: u32) -> &[u8] {
        let start = (r * self.stride + self.start_x) as usize;
        &self.buf[start..start + self.width as usize]
    }
}

/// Trims empty trailing columns from `bitmap`, up to `max_trim` pixels. A
/// column counts as empty when every sample in it is at or below
/// [`TRIM_INTENSITY_THRESHOLD`]. The scan stops at the first non-empty
/// column, but the full `max_trim` is always removed from `width` regardless
/// of how many columns the scan actually found empty: whatever wasn't
/// trimmed away is instead folded into `start_x`, so the visible window
/// still excludes it. The underlying buffer is untouched.
fn trim_borders(bitmap: &mut ProcessedBitmap, max_trim: u32) {
    let mut found_empty = 0;
    while found_empty < max_trim && bitmap.width > found_empty {
        let col = bitmap.start_x + bitmap.width - 1 - found_empty;
        let column_empty =
            (0..bitmap.rows).all(|r| bitmap.buf[(r * bitmap.stride + col) as usize] <= TRIM_INTENSITY_THRESHOLD);
        if !column_empty {
            break;
        }
        found_empty += 1;
    }
    bitmap.start_x += max_trim - found_empty;
    bitmap.width = bitmap.width.saturating_sub(max_trim);
}

/// Renders `glyph_id` via `face`, applying the oversize policy when the
/// glyph is wider than the cells it must fit in.
///
/// `cell_w * num_cells` is the destination width. A glyph within that width
/// is returned as-is. An oversized italic glyph is trimmed on its empty
/// right-hand columns; otherwise, if rescaling is permitted and the face
/// is scalable and the overflow is large enough to be worth it, the glyph
/// is re-rendered at a reduced size (one retry, `rescale` forced false to
/// avoid recursion) and the face's size is restored afterward.
pub fn render_bitmap(
    face: &mut Face,
    glyph_id: u16,
    cell_w: u32,
    num_cells: u32,
    bold: bool,
    italic: bool,
    rescale: bool,
) -> Result<ProcessedBitmap, Error> {
    let _ = bold;
    let mut bitmap = face.render_glyph(glyph_id)?;
    let max_width = cell_w * num_cells;
    if bitmap.width <= max_width {
        return Ok(bitmap);
    }

    let extra = bitmap.width - max_width;
    if italic && extra < cell_w / 2 {
        trim_borders(&mut bitmap, extra);
        return Ok(bitmap);
    }

    if rescale && face.is_scalable() && extra > cell_w / 3.max(2) {
        return rescale_and_render(face, glyph_id, max_width, bitmap.width);
    }

    Ok(bitmap)
}

fn rescale_and_render(face: &mut Face, glyph_id: u16, max_width: u32, width: u32) -> Result<ProcessedBitmap, Error> {
    let ratio = max_width as f32 / width as f32;
    let original_ppem = face.scale_ppem_by(ratio);
    let result = face.render_glyph(glyph_id);
    face.set_ppem(original_ppem);
    result
}

/// Where in the destination canvas a rendered bitmap's origin lands, given
/// the shaper's fractional offsets and the glyph's own bearing.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    /// Horizontal pen offset from the shaper, in pixels.
    pub x_offset: f32,
    /// Vertical pen offset from the shaper, in pixels.
    pub y_offset: f32,
}

/// Composites `bitmap` into `dest` (a `total_width * cell_h` canvas),
/// aligning it to `baseline` and the shaper's placement offsets. Samples
/// that land on an already-written destination pixel add modulo 256: this
/// is deliberate legacy behavior (overlapping glyphs alias rather than
/// clip), not a bug to "fix" by saturating.
pub fn place_bitmap_in_cell(
    dest: &mut [u8],
    total_width: u32,
    cell_h: u32,
    bitmap: &ProcessedBitmap,
    placement: Placement,
    baseline: u32,
) {
    let xoff = (placement.x_offset + bitmap.bearing_x as f32).floor() as i64;
    let (src_col_start, mut dest_col_start) = if xoff < 0 { ((-xoff) as u32, 0) } else { (0, xoff as u32) };

    if dest_col_start + bitmap.width.saturating_sub(src_col_start) > total_width {
        let overflow = dest_col_start + bitmap.width.saturating_sub(src_col_start) - total_width;
        dest_col_start = dest_col_start.saturating_sub(overflow);
    }

    let yoff = (placement.y_offset + bitmap.bearing_y as f32).floor() as i64;
    let (src_row_start, dest_row_start) = if yoff > baseline as i64 {
        (0u32, 0u32)
    } else {
        (0u32, (baseline as i64 - yoff).max(0) as u32)
    };

    let usable_cols = bitmap.width.saturating_sub(src_col_start).min(total_width.saturating_sub(dest_col_start));
    let usable_rows = bitmap.rows.saturating_sub(src_row_start).min(cell_h.saturating_sub(dest_row_start));

    for r in 0..usable_rows {
        let src_row = bitmap.row(src_row_start + r);
        let dest_row_idx = dest_row_start + r;
        for c in 0..usable_cols {
            let src = src_row[(src_col_start + c) as usize];
            let dest_idx = (dest_row_idx * total_width + dest_col_start + c) as usize;
            dest[dest_idx] = ((dest[dest_idx] as u16 + src as u16) % 256) as u8;
        }
    }
}

/// Scatters a `cell_w * cell_count` wide, `cell_h` tall composite canvas
/// into `cell_count` contiguous `cell_w * cell_h` buffers. At most ten
/// cells per call.
#[must_use]
pub fn split_cells(cell_w: u32, cell_h: u32, source: &[u8], cell_count: u32) -> Vec<Vec<u8>> {
    let cell_count = cell_count.min(10);
    let total_width = cell_w * cell_count;
    let mut cells = Vec::with_capacity(cell_count as usize);
    for i in 0..cell_count {
        let mut cell = vec![0u8; (cell_w * cell_h) as usize];
        for r in 0..cell_h {
            let src_start = (r * total_width + i * cell_w) as usize;
            let dest_start = (r * cell_w) as usize;
            cell[dest_start..dest_start + cell_w as usize]
                .copy_from_slice(&source[src_start..src_start + cell_w as usize]);
        }
        cells.push(cell);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_bitmap(width: u32, rows: u32, fill: u8) -> ProcessedBitmap {
        ProcessedBitmap { buf: vec![fill; (width * rows) as usize], start_x: 0, width, stride: width, rows, bearing_x: 0, bearing_y: 0 }
    }

    #[test]
    fn trim_borders_removes_the_full_extra_even_when_scan_stops_early() {
        let mut bitmap = flat_bitmap(10, 1, 0);
        bitmap.buf[5] = 255;
        trim_borders(&mut bitmap, 8);
        // Columns 6-9 are found empty (4 columns); the scan stops at column
        // 5 (non-empty). The remaining 4 pixels of max_trim are absorbed
        // into start_x rather than left in the visible window.
        assert_eq!(bitmap.width, 2);
        assert_eq!(bitmap.start_x, 4);
    }

    #[test]
    fn place_bitmap_accumulates_modulo_256_on_overlap() {
        let mut dest = vec![200u8; 4];
        let bitmap = flat_bitmap(2, 1, 100);
        place_bitmap_in_cell(&mut dest, 2, 1, &bitmap, Placement { x_offset: 0.0, y_offset: 0.0 }, 0);
        assert_eq!(dest[0], (200 + 100) % 256);
        assert_eq!(dest[1], (200 + 100) % 256);
    }

    #[test]
    fn place_bitmap_never_writes_outside_destination() {
        let mut dest = vec![0u8; 4 * 3];
        let bitmap = flat_bitmap(10, 10, 50);
        place_bitmap_in_cell(&mut dest, 4, 3, &bitmap, Placement { x_offset: 0.0, y_offset: 0.0 }, 2);
        assert_eq!(dest.len(), 12);
    }

    #[test]
    fn split_cells_round_trips_a_composed_canvas() {
        let cell_w = 3;
        let cell_h = 2;
        let originals: Vec<Vec<u8>> = (0..3u8).map(|n| vec![n; (cell_w * cell_h) as usize]).collect();

        let total_width = cell_w * originals.len() as u32;
        let mut canvas = vec![0u8; (total_width * cell_h) as usize];
        for (i, cell) in originals.iter().enumerate() {
            for r in 0..cell_h {
                let dest_start = (r * total_width + i as u32 * cell_w) as usize;
                let src_start = (r * cell_w) as usize;
                canvas[dest_start..dest_start + cell_w as usize]
                    .copy_from_slice(&cell[src_start..src_start + cell_w as usize]);
            }
        }

        let split = split_cells(cell_w, cell_h, &canvas, originals.len() as u32);
        assert_eq!(split, originals);
    }
}
