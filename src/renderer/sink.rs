//! Render sinks: where each frame's path ends up

/// Receives the closed path once per frame
pub trait RenderSink {
    /// Clip the host content to `d` (only called when clipping is supported)
    fn set_clip_path(&mut self, d: &str);
    /// Stroke `d` as the outline
    fn set_outline_path(&mut self, d: &str);
}

/// Keeps the last path of each kind; used headless and in tests
#[derive(Debug, Clone, Default)]
pub struct PathRecorder {
    pub clip: Option<String>,
    pub outline: Option<String>,
}

impl RenderSink for PathRecorder {
    fn set_clip_path(&mut self, d: &str) {
        self.clip = Some(d.to_string());
    }

    fn set_outline_path(&mut self, d: &str) {
        self.outline = Some(d.to_string());
    }
}
