mod cli;
mod logging;
mod sink;

use cellglyph_data::{Cell, Line};
use cellglyph_rasterizer::Face;
use cellglyph_render::{RenderContext, SetFontConfig};
use clap::Parser;
use color_eyre::eyre::Context;

fn open_face(path: &std::path::Path) -> color_eyre::Result<Face> {
    let path_str = path.to_str().ok_or_else(|| color_eyre::eyre::eyre!("non-utf8 font path"))?;
    Face::open(path_str, 0).with_context(|| format!("opening {}", path.display()))
}

fn line_from_sample(text: &str) -> Line {
    let cells = text.chars().map(|c| Cell::for_char(c, false, false)).collect();
    Line::new(cells)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    logging::init();

    let cli = cli::Cli::parse();
    cli.validate()?;

    tracing::info!(log_dir = %logging::default_log_dir().display(), "cellglyph-harness starting");

    let medium = open_face(&cli.medium)?;
    let bold = cli.bold.as_deref().map(open_face).transpose()?;
    let italic = cli.italic.as_deref().map(open_face).transpose()?;

    let mut ctx = RenderContext::new();
    ctx.set_atlas_limits(cli.max_texture_size, cli.max_array_len);
    ctx.set_cell_height_adjustment(cli.cell_height_delta, cli.cell_height_scale);
    ctx.set_sink(sink::CountingSink::default());

    ctx.set_font(SetFontConfig {
        symbol_maps: Vec::new(),
        symbol_map_faces: Vec::new(),
        pt_size: cli.point_size,
        xdpi: cli.xdpi,
        ydpi: cli.ydpi,
        medium,
        bold,
        italic,
        bold_italic: None,
        fallback_provider: None,
        box_painter: None,
    })
    .context("configuring font roster")?;

    let (cell_w, cell_h) = ctx.cell_size();
    println!("cell size: {cell_w}x{cell_h}");

    let mut line = line_from_sample(&cli.sample);
    ctx.render_line(&mut line).context("rendering sample line")?;

    for cell in line.cells() {
        println!(
            "{:?} -> ({}, {}, {})",
            char::from_u32(cell.ch).unwrap_or('\u{FFFD}'),
            cell.sprite_x,
            cell.sprite_y,
            cell.sprite_z
        );
    }

    let (xnum, ynum, z) = ctx.current_layout();
    println!("atlas layout: {xnum} x {ynum} x {} (z={z})", z + 1);

    Ok(())
}
