//! Core of a simple image viewer: stepping through an in-memory image
//! sequence, fixed zoom levels, and a cache of downscaled renders.
//!
//! ```
//! use image::RgbaImage;
//! use siv::{ImageHandle, Viewer};
//!
//! let images = vec![
//!     ImageHandle::new(RgbaImage::new(64, 48)),
//!     ImageHandle::new(RgbaImage::new(32, 32)),
//! ];
//! let mut viewer = Viewer::new(images)?;
//! viewer.add_display_change_listener(|status| println!("{}", status.indicator()));
//!
//! assert!(viewer.show_next());
//! assert!(!viewer.has_next());
//! viewer.zoom_out();
//! assert_eq!(viewer.magnification(), 0.5);
//! # Ok::<(), siv::ViewerError>(())
//! ```

pub mod bitmap;
pub mod cache;
pub mod config;
pub mod error;
pub mod i18n;
pub mod layout;
pub mod navigation;
pub mod observer;
pub mod viewer;
pub mod zoom;

pub use bitmap::{ImageHandle, ImageId};
pub use cache::{CacheStats, RenderCache};
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use layout::Size;
pub use observer::ListenerId;
pub use viewer::{DisplayStatus, FramePlan, PrefetchJob, Viewer};
pub use zoom::{ZoomLevels, ZoomModel};
