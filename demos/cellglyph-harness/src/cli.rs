use std::path::PathBuf;

use clap::Parser;
use color_eyre::{eyre::eyre, Report};

#[derive(Parser, Debug)]
#[command(
    name = "cellglyph-harness",
    about = "Exercises the cellglyph text-rendering pipeline against a real font",
    long_about = "Opens a monospace font, configures the rendering pipeline, shapes and \
                  rasterizes a line of sample text, and reports the resulting sprite atlas \
                  layout. Useful for eyeballing sprite-cache and tracker behavior without a \
                  GPU present."
)]
pub struct Cli {
    /// Path to the TTF/OTF file providing the medium (regular) face
    #[arg(value_name = "FONT", value_parser = validate_file_exists)]
    pub medium: PathBuf,

    /// Path to the bold face, if distinct from the medium face
    #[arg(long, value_parser = validate_file_exists)]
    pub bold: Option<PathBuf>,

    /// Path to the italic face, if distinct from the medium face
    #[arg(long, value_parser = validate_file_exists)]
    pub italic: Option<PathBuf>,

    /// Font size in points
    #[arg(short = 's', long, default_value = "12.0", value_name = "POINTS")]
    pub point_size: f32,

    /// Horizontal resolution in dots per inch
    #[arg(long, default_value = "96.0", value_name = "DPI")]
    pub xdpi: f32,

    /// Vertical resolution in dots per inch
    #[arg(long, default_value = "96.0", value_name = "DPI")]
    pub ydpi: f32,

    /// Maximum GPU texture dimension, in pixels
    #[arg(long, default_value = "4096", value_name = "PIXELS")]
    pub max_texture_size: u32,

    /// Maximum number of texture array layers
    #[arg(long, default_value = "32", value_name = "LAYERS")]
    pub max_array_len: u32,

    /// Line of text to shape and render
    #[arg(long, default_value = "the quick brown fox", value_name = "TEXT")]
    pub sample: String,

    /// Additive pixel adjustment applied to the computed cell height
    #[arg(long, default_value = "0", value_name = "PIXELS")]
    pub cell_height_delta: i32,

    /// Multiplicative adjustment applied to the computed cell height after the additive delta
    #[arg(long, default_value = "1.0", value_name = "FACTOR")]
    pub cell_height_scale: f32,
}

fn validate_file_exists(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !path.exists() {
        Err(format!("font file does not exist: {s}"))
    } else if !path.is_file() {
        Err(format!("not a file: {s}"))
    } else {
        Ok(path)
    }
}

impl Cli {
    /// Validates argument combinations clap's own parsing can't express.
    pub fn validate(&self) -> Result<(), Report> {
        if self.point_size <= 0.0 {
            return Err(eyre!("point size must be positive"));
        }
        if self.xdpi <= 0.0 || self.ydpi <= 0.0 {
            return Err(eyre!("dpi must be positive"));
        }
        if self.max_texture_size == 0 {
            return Err(eyre!("max texture size must be nonzero"));
        }
        if self.max_array_len == 0 {
            return Err(eyre!("max array length must be nonzero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            medium: PathBuf::from("/dev/null"),
            bold: None,
            italic: None,
            point_size: 12.0,
            xdpi: 96.0,
            ydpi: 96.0,
            max_texture_size: 4096,
            max_array_len: 32,
            sample: "sample".to_string(),
            cell_height_delta: 0,
            cell_height_scale: 1.0,
        }
    }

    #[test]
    fn valid_defaults_pass_validation() {
        assert!(base_cli().validate().is_ok());
    }

    #[test]
    fn non_positive_point_size_is_rejected() {
        let mut cli = base_cli();
        cli.point_size = 0.0;
        assert!(cli.validate().is_err());
    }

    #[test]
    fn zero_atlas_limits_are_rejected() {
        let mut cli = base_cli();
        cli.max_array_len = 0;
        assert!(cli.validate().is_err());
    }
}
