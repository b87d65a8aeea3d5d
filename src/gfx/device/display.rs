//! Display modes and the presentation state that survives a refresh

use super::{projection::Projections, settings::GraphicSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn distance(&self, other: &Resolution) -> u64 {
        u64::from(self.width.abs_diff(other.width)) + u64::from(self.height.abs_diff(other.height))
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Resolution {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Resolutions offered by the display, recorded once at start-up
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayModes {
    modes: Vec<Resolution>,
    selected: Resolution,
}

impl DisplayModes {
    /// Records the offered modes and selects the one closest to `requested`
    ///
    /// Duplicates (the same size at several refresh rates) are collapsed,
    /// keeping first-seen order. An empty list degrades to the requested size.
    pub fn new(offered: impl IntoIterator<Item = Resolution>, requested: Resolution) -> Self {
        let mut modes: Vec<Resolution> = Vec::new();
        for mode in offered {
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
        if modes.is_empty() {
            modes.push(requested);
        }

        let selected = modes
            .iter()
            .copied()
            .min_by_key(|mode| mode.distance(&requested))
            .unwrap_or(requested);

        Self { modes, selected }
    }

    /// Enumerates the video modes of the window's monitor
    pub fn from_window(window: &winit::window::Window, requested: Resolution) -> Self {
        let monitor = window.current_monitor().or_else(|| window.primary_monitor());
        match monitor {
            Some(monitor) => Self::new(
                monitor.video_modes().map(|mode| Resolution::from(mode.size())),
                requested,
            ),
            None => {
                log::warn!("no monitor reported; only the requested size is available");
                Self::new(std::iter::empty(), requested)
            }
        }
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.modes
    }

    pub fn selected(&self) -> Resolution {
        self.selected
    }
}

/// Surface-independent half of the device context
///
/// Holds what [`DeviceContext::refresh`](super::DeviceContext::refresh) must
/// keep (the display modes) next to what it must recompute (the projections).
#[derive(Debug, Clone)]
pub struct Presentation {
    display_modes: DisplayModes,
    settings: GraphicSettings,
    projections: Projections,
}

impl Presentation {
    pub fn new(display_modes: DisplayModes, settings: &GraphicSettings) -> Self {
        Self {
            display_modes,
            settings: settings.clone(),
            projections: Projections::new(settings),
        }
    }

    pub fn refresh(&mut self, settings: &GraphicSettings) {
        self.settings = settings.clone();
        self.projections = Projections::new(settings);
    }

    pub fn display_modes(&self) -> &DisplayModes {
        &self.display_modes
    }

    pub fn settings(&self) -> &GraphicSettings {
        &self.settings
    }

    pub fn projections(&self) -> &Projections {
        &self.projections
    }

    pub fn size(&self) -> Resolution {
        Resolution::new(
            self.settings.window_width.max(1),
            self.settings.window_height.max(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor_modes() -> Vec<Resolution> {
        vec![
            Resolution::new(1920, 1080),
            Resolution::new(1920, 1080),
            Resolution::new(1600, 900),
            Resolution::new(1280, 720),
            Resolution::new(800, 600),
        ]
    }

    #[test]
    fn closest_mode_is_selected() {
        let modes = DisplayModes::new(monitor_modes(), Resolution::new(1300, 700));
        assert_eq!(modes.selected(), Resolution::new(1280, 720));
        assert_eq!(modes.resolutions().len(), 4);
    }

    #[test]
    fn empty_mode_list_falls_back_to_request() {
        let modes = DisplayModes::new(Vec::new(), Resolution::new(1024, 768));
        assert_eq!(modes.resolutions(), &[Resolution::new(1024, 768)]);
        assert_eq!(modes.selected(), Resolution::new(1024, 768));
    }

    #[test]
    fn refresh_keeps_modes_and_updates_aspect() {
        let initial = GraphicSettings::default().with_size(1920, 1080);
        let modes = DisplayModes::new(monitor_modes(), Resolution::new(1920, 1080));
        let mut presentation = Presentation::new(modes, &initial);
        let before = presentation.display_modes().resolutions().to_vec();

        presentation.refresh(&initial.clone().with_size(1280, 720));

        assert_eq!(presentation.display_modes().resolutions(), before.as_slice());
        let aspect = presentation.projections().aspect_ratio();
        assert!((aspect - 1280.0 / 720.0).abs() < 1e-6);
        assert_eq!(presentation.size(), Resolution::new(1280, 720));
        assert_eq!(presentation.settings().window_width, 1280);
    }
}
