use crate::i18n::{DefaultStrings, Localizer, TextKey};
use crate::zoom::{DEFAULT_ZOOM_INDEX, DEFAULT_ZOOM_LEVELS};

/// Construction-time settings for a [`Viewer`](crate::Viewer).
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    /// Must be strictly ascending and positive; checked when the viewer is built.
    pub zoom_levels: Vec<f64>,
    pub default_zoom_index: usize,
    /// Byte budget for downscaled renders.
    pub cache_budget_bytes: u64,
    /// Warm the cache with the neighbouring images when zoomed out.
    pub prefetch: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: DefaultStrings.lookup(TextKey::WindowTitle).into_owned(),
            zoom_levels: DEFAULT_ZOOM_LEVELS.to_vec(),
            default_zoom_index: DEFAULT_ZOOM_INDEX,
            cache_budget_bytes: default_cache_budget(),
            prefetch: true,
        }
    }
}

/// A tenth of physical memory, with a 64 MB floor for hosts that report none.
pub fn default_cache_budget() -> u64 {
    const FLOOR: u64 = 64 * 1024 * 1024;
    let mut sys = sysinfo::System::new();
    sys.refresh_memory();
    (sys.total_memory() / 10).max(FLOOR)
}
