use cellglyph_core::GpuSink;

/// A [`GpuSink`] standing in for a real GPU texture upload: just counts
/// calls and remembers the last atlas envelope it was asked to back.
#[derive(Debug, Default)]
pub struct CountingSink {
    pub uploads: usize,
    pub last_resize: Option<(u32, u32, u32)>,
}

impl GpuSink for CountingSink {
    fn upload_sprite(&mut self, x: u16, y: u16, z: u32, width: u32, height: u32, pixels: &[u8]) {
        self.uploads += 1;
        tracing::debug!(x, y, z, width, height, bytes = pixels.len(), "sprite uploaded");
    }

    fn resize_atlas(&mut self, width: u32, height: u32, layers: u32) {
        self.last_resize = Some((width, height, layers));
        tracing::info!(width, height, layers, "atlas texture (re)allocated");
    }
}
