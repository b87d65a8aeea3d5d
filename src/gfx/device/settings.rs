//! Graphic settings consumed by the device context
//!
//! Loading and saving settings is left to the host; the engine only reads them.

/// Presentation and projection settings
///
/// Passed to [`DeviceContext::new`](super::DeviceContext::new) at start-up and
/// to [`DeviceContext::refresh`](super::DeviceContext::refresh) whenever the
/// window size or fullscreen state changes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicSettings {
    pub fullscreen: bool,
    pub vsync: bool,
    /// Near clip plane distance
    pub screen_near: f32,
    /// Far clip plane distance
    pub screen_depth: f32,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for GraphicSettings {
    fn default() -> Self {
        Self {
            fullscreen: true,
            vsync: false,
            screen_near: 0.1,
            screen_depth: 100.0,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

impl GraphicSettings {
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Sets the window size in physical pixels (builder pattern)
    ///
    /// # Arguments
    /// * `width` - Width in pixels, clamped to at least 1
    /// * `height` - Height in pixels, clamped to at least 1
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width.max(1);
        self.window_height = height.max(1);
        self
    }

    /// Sets the near and far clip planes (builder pattern)
    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.screen_near = near;
        self.screen_depth = far;
        self
    }

    /// Width over height of the configured window
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width.max(1) as f32 / self.window_height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_full_hd_fullscreen() {
        let settings = GraphicSettings::default();
        assert!(settings.fullscreen);
        assert!(!settings.vsync);
        assert_eq!((settings.window_width, settings.window_height), (1920, 1080));
        assert_eq!(settings.screen_near, 0.1);
        assert_eq!(settings.screen_depth, 100.0);
    }

    #[test]
    fn zero_sized_window_is_clamped() {
        let settings = GraphicSettings::default().with_size(0, 0);
        assert_eq!((settings.window_width, settings.window_height), (1, 1));
        assert_eq!(settings.aspect_ratio(), 1.0);
    }
}
