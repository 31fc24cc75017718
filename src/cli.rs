use clap::Parser;
use std::path::PathBuf;

use siv::ViewerConfig;

pub const HELP_KEYS: &str = "\
Key Bindings:
  Esc / q             : Quit
  Left / h            : Previous image
  Right / l / Space   : Next image
  + / =               : Zoom in
  -                   : Zoom out
  Drag / Wheel        : Scroll a zoomed image
  ?                   : Toggle help overlay
";

#[derive(Parser, Debug)]
#[command(name = "siv", about = "A simple image viewer", after_help = HELP_KEYS)]
pub struct Cli {
    /// Image files or directories to view
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Window title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Allowed magnifications, strictly ascending (e.g. 0.25,0.5,1,2,4)
    #[arg(long, value_delimiter = ',')]
    pub zoom_levels: Option<Vec<f64>>,

    /// Index into the zoom levels to start at
    #[arg(long)]
    pub default_zoom: Option<usize>,

    /// Memory budget for downscaled renders (e.g. 512MB, 2GB). Default: 10% of RAM.
    #[arg(short, long, value_parser = parse_memory_budget)]
    pub memory: Option<u64>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Do not pre-render neighbouring images when zoomed out
    #[arg(long)]
    pub no_prefetch: bool,
}

impl Cli {
    pub fn viewer_config(&self) -> ViewerConfig {
        let mut config = ViewerConfig::default();
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        match (&self.zoom_levels, self.default_zoom) {
            (Some(levels), index) => {
                config.zoom_levels = levels.clone();
                // Start at 100% when the custom set has it, else at the bottom.
                config.default_zoom_index = index.unwrap_or_else(|| {
                    levels.iter().position(|&v| v == 1.0).unwrap_or(0)
                });
            }
            (None, Some(index)) => config.default_zoom_index = index,
            (None, None) => {}
        }
        if let Some(bytes) = self.memory {
            config.cache_budget_bytes = bytes;
        }
        config.prefetch = !self.no_prefetch;
        config
    }
}

/// `512MB`, `2GB`, `1.5gb`; a bare number is megabytes.
pub fn parse_memory_budget(s: &str) -> Result<u64, String> {
    const MB: f64 = 1024.0 * 1024.0;
    let s = s.trim().to_uppercase();
    let (num, scale) = if let Some(num) = s.strip_suffix("GB") {
        (num, 1024.0 * MB)
    } else if let Some(num) = s.strip_suffix("MB") {
        (num, MB)
    } else {
        (s.as_str(), MB)
    };
    let value: f64 = num
        .trim()
        .parse()
        .map_err(|_| format!("invalid memory size '{}'", s))?;
    if !(value.is_finite() && value > 0.0) {
        return Err(format!("memory size must be positive, got '{}'", s));
    }
    Ok((value * scale) as u64)
}
