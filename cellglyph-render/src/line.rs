use cellglyph_data::{Cell, Line};
use cellglyph_rasterizer::{place_bitmap_in_cell, render_bitmap, split_cells, Placement};

use crate::context::RenderContext;
use crate::error::Error;
use crate::font::SelectedFont;
use crate::glyph_key::pack_extra_glyphs;
use crate::selector::{cell_text, font_for_cell, NullFallbackProvider};

fn is_continuation(cells: &[Cell], idx: usize) -> bool {
    idx > 0 && cells[idx - 1].attrs.width() == 2
}

impl RenderContext {
    /// Renders every cell of `line`, writing sprite coordinates back. Runs
    /// of cells selecting the same font are rendered together; a cell
    /// whose predecessor has width 2 is skipped, since its sprite is set
    /// implicitly by the run containing the wide cell.
    pub fn render_line(&mut self, line: &mut Line) -> Result<(), Error> {
        let selections: Vec<SelectedFont> = {
            let mut provider = self.fallback_provider.take().unwrap_or_else(|| Box::new(NullFallbackProvider));
            let result = line
                .cells()
                .iter()
                .map(|cell| font_for_cell(cell, &mut self.roster, provider.as_mut()))
                .collect();
            self.fallback_provider = Some(provider);
            result
        };

        let cells = line.cells_mut();
        let mut run_start = 0usize;
        let mut run_font: Option<SelectedFont> = None;
        for idx in 0..cells.len() {
            if is_continuation(cells, idx) {
                continue;
            }
            match run_font {
                None => run_font = Some(selections[idx]),
                Some(font) if font == selections[idx] => {}
                Some(font) => {
                    self.render_run(cells, run_start, idx, font)?;
                    run_start = idx;
                    run_font = Some(selections[idx]);
                }
            }
        }
        if let Some(font) = run_font {
            self.render_run(cells, run_start, cells.len(), font)?;
        }
        Ok(())
    }

    fn render_run(&mut self, cells: &mut [Cell], first: usize, end: usize, font: SelectedFont) -> Result<(), Error> {
        match font {
            SelectedFont::Blank => {
                let (x, y, z) = self.blank_sprite;
                for cell in cells.iter_mut().take(end).skip(first) {
                    cell.set_sprite(x, y, z as u16);
                }
                Ok(())
            }
            SelectedFont::Missing => {
                let (x, y, z) = self.missing_sprite;
                for cell in cells.iter_mut().take(end).skip(first) {
                    cell.set_sprite(x, y, z as u16);
                }
                Ok(())
            }
            SelectedFont::Box => self.render_box_run(cells, first, end),
            SelectedFont::Real(handle) => {
                for idx in first..end {
                    if is_continuation(cells, idx) {
                        continue;
                    }
                    self.render_real_cell(cells, idx, handle)?;
                }
                Ok(())
            }
        }
    }

    fn render_box_run(&mut self, cells: &mut [Cell], first: usize, end: usize) -> Result<(), Error> {
        for idx in first..end {
            if is_continuation(cells, idx) {
                continue;
            }
            let ch = cells[idx].ch;
            let lookup = self.box_cache.position_for(ch as u16, 0, false, &mut self.tracker)?;
            if !lookup.already_rendered {
                if let Some(painter) = self.box_painter.as_deref_mut() {
                    let buf = painter.paint(ch, self.cell_width, self.cell_height);
                    if let Some(sink) = self.sink.as_deref_mut() {
                        sink.upload_sprite(
                            lookup.position.x,
                            lookup.position.y,
                            lookup.position.z,
                            self.cell_width,
                            self.cell_height,
                            &buf,
                        );
                    } else {
                        tracing::debug!(ch, "no GPU sink installed, box sprite upload dropped");
                    }
                }
                self.box_cache.mark_rendered(lookup.id);
            }
            cells[idx].set_sprite(lookup.position.x, lookup.position.y, lookup.position.z as u16);
        }
        Ok(())
    }

    fn render_real_cell(&mut self, cells: &mut [Cell], idx: usize, handle: crate::font::FontHandle) -> Result<(), Error> {
        let text = cell_text(&cells[idx]);
        let is_wide = cells[idx].attrs.width() == 2 && idx + 1 < cells.len();
        let num_cells: u32 = if is_wide { 2 } else { 1 };

        let real = self.roster.get_mut(handle).expect("font_for_cell only returns handles into the live roster");
        let shaped = real.face.shape(text.as_bytes())?;
        let Some(primary) = shaped.first().copied() else {
            let (x, y, z) = self.missing_sprite;
            cells[idx].set_sprite(x, y, z as u16);
            if is_wide {
                cells[idx + 1].set_sprite(x, y, z as u16);
            }
            return Ok(());
        };
        let secondary: Vec<u16> = shaped[1..].iter().map(|r| r.glyph_id).collect();
        let extra_glyphs = pack_extra_glyphs(&secondary);

        let first_lookup = real.cache.position_for(primary.glyph_id, extra_glyphs, false, &mut self.tracker)?;
        let second_lookup = if is_wide {
            Some(real.cache.position_for(primary.glyph_id, extra_glyphs, true, &mut self.tracker)?)
        } else {
            None
        };

        let needs_render = !first_lookup.already_rendered || second_lookup.is_some_and(|l| !l.already_rendered);
        if needs_render {
            let total_width = self.cell_width * num_cells;
            let mut canvas = vec![0u8; (total_width * self.cell_height) as usize];
            for glyph in &shaped {
                let bitmap =
                    render_bitmap(&mut real.face, glyph.glyph_id, self.cell_width, num_cells, real.bold, real.italic, true)?;
                place_bitmap_in_cell(
                    &mut canvas,
                    total_width,
                    self.cell_height,
                    &bitmap,
                    Placement { x_offset: glyph.x_offset, y_offset: glyph.y_offset },
                    self.baseline,
                );
            }

            if let Some(sink) = self.sink.as_deref_mut() {
                if is_wide {
                    let halves = split_cells(self.cell_width, self.cell_height, &canvas, 2);
                    sink.upload_sprite(
                        first_lookup.position.x,
                        first_lookup.position.y,
                        first_lookup.position.z,
                        self.cell_width,
                        self.cell_height,
                        &halves[0],
                    );
                    let second = second_lookup.expect("second_lookup is Some whenever is_wide");
                    sink.upload_sprite(
                        second.position.x,
                        second.position.y,
                        second.position.z,
                        self.cell_width,
                        self.cell_height,
                        &halves[1],
                    );
                } else {
                    sink.upload_sprite(
                        first_lookup.position.x,
                        first_lookup.position.y,
                        first_lookup.position.z,
                        self.cell_width,
                        self.cell_height,
                        &canvas,
                    );
                }
            } else {
                tracing::debug!(glyph_id = primary.glyph_id, "no GPU sink installed, sprite upload dropped");
            }

            real.cache.mark_rendered(first_lookup.id);
            if let Some(second) = second_lookup {
                real.cache.mark_rendered(second.id);
            }
        }

        cells[idx].set_sprite(first_lookup.position.x, first_lookup.position.y, first_lookup.position.z as u16);
        if is_wide {
            let second = second_lookup.expect("second_lookup is Some whenever is_wide");
            cells[idx + 1].set_sprite(second.position.x, second.position.y, second.position.z as u16);
        }
        Ok(())
    }
}
