//! The viewer: an image sequence, a zoom model and a render cache behind one
//! set of operations for the surrounding UI.
//!
//! Every successful navigation or zoom change re-centres the scroll anchor,
//! raises a repaint request and notifies the display-change listeners with a
//! fresh [`DisplayStatus`]. Boundary moves are no-ops and notify nobody.

use image::RgbaImage;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

use crate::bitmap::{self, ImageHandle, ImageId};
use crate::cache::{CacheStats, RenderCache};
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::layout::{Layout, Size};
use crate::navigation::{ImageSequence, NavigationState, Position};
use crate::observer::{ListenerId, Listeners};
use crate::zoom::{ZoomLevels, ZoomModel};

const DEFAULT_VIEWPORT: Size = Size::new(1280, 720);

/// Cache key: which image, at which exact magnification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub image: ImageId,
    magnification_bits: u64,
}

impl RenderKey {
    pub fn new(image: ImageId, magnification: f64) -> Self {
        Self {
            image,
            magnification_bits: magnification.to_bits(),
        }
    }

    pub fn magnification(&self) -> f64 {
        f64::from_bits(self.magnification_bits)
    }
}

pub type ImageCache = RenderCache<RenderKey, Arc<RgbaImage>>;

/// Snapshot handed to display-change listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayStatus {
    pub current: usize,
    pub count: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub magnification: f64,
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
}

impl DisplayStatus {
    /// `"2 / 5 (50%)"`
    pub fn indicator(&self) -> String {
        format!(
            "{} / {} ({}%)",
            self.current + 1,
            self.count,
            (self.magnification * 100.0).round() as i64
        )
    }
}

/// What to paint for the current image.
#[derive(Debug, Clone)]
pub struct FramePlan {
    /// Either the cached downscale (already `size`) or the original bitmap,
    /// to be stretched to `size`.
    pub bitmap: Arc<RgbaImage>,
    pub size: Size,
    /// Top-left in viewport coordinates.
    pub origin: (i32, i32),
    pub from_cache: bool,
}

impl FramePlan {
    pub fn needs_scaling(&self) -> bool {
        self.bitmap.dimensions() != (self.size.width, self.size.height)
    }
}

/// Downscales the current image's neighbours into the shared cache.
/// `Send`, so hosts can run it off the UI thread.
#[derive(Debug, Clone)]
pub struct PrefetchJob {
    cache: Arc<ImageCache>,
    images: Vec<ImageHandle>,
    magnification: f64,
}

impl PrefetchJob {
    /// Returns how many images are now warm in the cache.
    pub fn run(&self) -> usize {
        let warmed = self
            .images
            .par_iter()
            .filter(|image| match downscaled(&self.cache, image, self.magnification) {
                Ok(_) => true,
                Err(err) => {
                    log::warn!("[prefetch] image {:?}: {}", image.id(), err);
                    false
                }
            })
            .count();
        log::debug!("[prefetch] warmed {}/{}", warmed, self.images.len());
        warmed
    }

    pub fn images(&self) -> &[ImageHandle] {
        &self.images
    }
}

fn downscaled(cache: &ImageCache, image: &ImageHandle, magnification: f64) -> Result<Arc<RgbaImage>> {
    let target = bitmap::magnified_size(image.size(), magnification);
    cache.compute_if_absent(RenderKey::new(image.id(), magnification), || {
        bitmap::downscale(image.pixels(), target).map(Arc::new)
    })
}

pub struct Viewer {
    title: String,
    nav: NavigationState,
    zoom: ZoomModel,
    cache: Arc<ImageCache>,
    layout: Layout,
    listeners: Listeners<DisplayStatus>,
    prefetch: bool,
    repaint_requested: bool,
}

impl Viewer {
    /// A viewer with default settings over `images`.
    pub fn new(images: impl IntoIterator<Item = ImageHandle>) -> Result<Self> {
        Self::with_config(images, &ViewerConfig::default())
    }

    pub fn with_config(
        images: impl IntoIterator<Item = ImageHandle>,
        config: &ViewerConfig,
    ) -> Result<Self> {
        Self::build(ImageSequence::new(images)?, config)
    }

    /// For collections that may contain absent images; any hole is an error.
    pub fn from_slots(
        slots: impl IntoIterator<Item = Option<ImageHandle>>,
        config: &ViewerConfig,
    ) -> Result<Self> {
        Self::build(ImageSequence::from_slots(slots)?, config)
    }

    fn build(images: ImageSequence, config: &ViewerConfig) -> Result<Self> {
        let levels = ZoomLevels::new(config.zoom_levels.clone())?;
        let zoom = ZoomModel::new(levels, config.default_zoom_index)?;
        log::info!(
            "[viewer] {} image(s), zoom {:?} at {}%",
            images.len(),
            zoom.levels().as_slice(),
            zoom.magnification() * 100.0
        );
        let mut viewer = Self {
            title: config.title.clone(),
            nav: NavigationState::new(images),
            zoom,
            cache: Arc::new(ImageCache::new(config.cache_budget_bytes)),
            layout: Layout::new(DEFAULT_VIEWPORT),
            listeners: Listeners::new(),
            prefetch: config.prefetch,
            repaint_requested: true,
        };
        viewer.layout.recenter(viewer.preferred_size());
        Ok(viewer)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    // -- navigation ---------------------------------------------------------

    pub fn current(&self) -> usize {
        self.nav.current()
    }

    pub fn count(&self) -> usize {
        self.nav.count()
    }

    pub fn has_next(&self) -> bool {
        self.nav.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.nav.has_previous()
    }

    pub fn position(&self) -> Position {
        self.nav.position()
    }

    pub fn current_image(&self) -> &ImageHandle {
        self.nav.current_image()
    }

    pub fn show_next(&mut self) -> bool {
        let moved = self.nav.show_next();
        if moved {
            self.image_changed();
        }
        moved
    }

    pub fn show_previous(&mut self) -> bool {
        let moved = self.nav.show_previous();
        if moved {
            self.image_changed();
        }
        moved
    }

    // -- zoom ---------------------------------------------------------------

    pub fn magnification(&self) -> f64 {
        self.zoom.magnification()
    }

    pub fn zoom(&self) -> &ZoomModel {
        &self.zoom
    }

    pub fn is_zoom_in_possible(&self) -> bool {
        self.zoom.is_zoom_in_possible()
    }

    pub fn is_zoom_out_possible(&self) -> bool {
        self.zoom.is_zoom_out_possible()
    }

    pub fn zoom_in(&mut self) -> bool {
        let before = self.preferred_size();
        let changed = self.zoom.zoom_in();
        if changed {
            self.zoom_changed(before);
        }
        changed
    }

    pub fn zoom_out(&mut self) -> bool {
        let before = self.preferred_size();
        let changed = self.zoom.zoom_out();
        if changed {
            self.zoom_changed(before);
        }
        changed
    }

    /// Jump to a configured level. Values outside the level set are an
    /// `InvalidArgument` and leave the zoom untouched.
    pub fn set_magnification(&mut self, value: f64) -> Result<()> {
        let before = self.preferred_size();
        if self.zoom.set_magnification(value)? {
            self.zoom_changed(before);
        }
        Ok(())
    }

    pub fn add_zoom_listener(&mut self, listener: impl FnMut(f64) + 'static) -> ListenerId {
        self.zoom.add_listener(listener)
    }

    pub fn remove_zoom_listener(&mut self, id: ListenerId) -> bool {
        self.zoom.remove_listener(id)
    }

    // -- display notifications ----------------------------------------------

    pub fn add_display_change_listener(
        &mut self,
        listener: impl FnMut(DisplayStatus) + 'static,
    ) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_display_change_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn status(&self) -> DisplayStatus {
        DisplayStatus {
            current: self.nav.current(),
            count: self.nav.count(),
            has_previous: self.nav.has_previous(),
            has_next: self.nav.has_next(),
            magnification: self.zoom.magnification(),
            can_zoom_in: self.zoom.is_zoom_in_possible(),
            can_zoom_out: self.zoom.is_zoom_out_possible(),
        }
    }

    /// Returns whether a repaint was requested since the last call.
    pub fn take_repaint_request(&mut self) -> bool {
        std::mem::take(&mut self.repaint_requested)
    }

    // -- layout ---------------------------------------------------------------

    /// Magnified size of the current image.
    pub fn preferred_size(&self) -> Size {
        bitmap::magnified_size(self.nav.current_image().size(), self.zoom.magnification())
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        if viewport == self.layout.viewport() {
            return;
        }
        let content = self.preferred_size();
        self.layout.set_viewport(viewport, content);
        self.repaint_requested = true;
    }

    pub fn scroll_by(&mut self, dx: i32, dy: i32) {
        let before = self.layout.scroll();
        let content = self.preferred_size();
        self.layout.scroll_by(dx, dy, content);
        if self.layout.scroll() != before {
            self.repaint_requested = true;
        }
    }

    // -- rendering ------------------------------------------------------------

    /// Decide what to draw. Below 100% the downscaled bitmap comes from (or
    /// goes into) the render cache; at or above 100% the original is
    /// stretched at paint time and nothing is cached.
    pub fn render_frame(&self) -> Result<FramePlan> {
        let image = self.nav.current_image();
        let magnification = self.zoom.magnification();
        let size = self.preferred_size();
        let origin = self.layout.origin(size);

        if magnification < 1.0 && !image.size().is_empty() {
            let bitmap = downscaled(&self.cache, image, magnification)?;
            return Ok(FramePlan {
                bitmap,
                size,
                origin,
                from_cache: true,
            });
        }
        Ok(FramePlan {
            bitmap: Arc::clone(image.pixels()),
            size,
            origin,
            from_cache: false,
        })
    }

    /// Work to warm the neighbours' downscales, if any is worth doing.
    pub fn prefetch_job(&self) -> Option<PrefetchJob> {
        let magnification = self.zoom.magnification();
        if !self.prefetch || magnification >= 1.0 {
            return None;
        }
        let images: Vec<ImageHandle> = self
            .nav
            .neighbours()
            .filter_map(|i| self.nav.images().get(i).cloned())
            .filter(|image| !image.size().is_empty())
            .filter(|image| !self.cache.contains_key(&RenderKey::new(image.id(), magnification)))
            .collect();
        if images.is_empty() {
            return None;
        }
        Some(PrefetchJob {
            cache: Arc::clone(&self.cache),
            images,
            magnification,
        })
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn image_changed(&mut self) {
        self.layout.recenter(self.preferred_size());
        self.display_changed();
    }

    fn zoom_changed(&mut self, before: Size) {
        self.layout.rescale(before, self.preferred_size());
        self.display_changed();
    }

    fn display_changed(&mut self) {
        self.repaint_requested = true;
        let status = self.status();
        self.listeners.notify(status);
    }
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("title", &self.title)
            .field("current", &self.nav.current())
            .field("count", &self.nav.count())
            .field("magnification", &self.zoom.magnification())
            .field("layout", &self.layout)
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn solid(w: u32, h: u32) -> ImageHandle {
        ImageHandle::new(RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])))
    }

    fn config() -> ViewerConfig {
        ViewerConfig {
            cache_budget_bytes: 1 << 24,
            ..ViewerConfig::default()
        }
    }

    fn viewer(n: usize) -> Viewer {
        Viewer::with_config((0..n).map(|_| solid(40, 20)), &config()).unwrap()
    }

    #[test]
    fn construction_validates_zoom_config() {
        let bad = ViewerConfig {
            zoom_levels: vec![1.0, 0.25, 2.5],
            ..config()
        };
        assert!(Viewer::with_config(vec![solid(1, 1)], &bad).unwrap_err().is_invalid_argument());

        let out_of_range = ViewerConfig {
            default_zoom_index: 9,
            ..config()
        };
        assert!(
            Viewer::with_config(vec![solid(1, 1)], &out_of_range)
                .unwrap_err()
                .is_invalid_argument()
        );
    }

    #[test]
    fn listeners_see_navigation_and_zoom_but_not_no_ops() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut viewer = viewer(2);
        {
            let seen = Rc::clone(&seen);
            viewer.add_display_change_listener(move |s: DisplayStatus| seen.borrow_mut().push(s.indicator()));
        }

        viewer.show_previous(); // no-op
        viewer.show_next();
        viewer.show_next(); // no-op
        viewer.zoom_out();
        viewer.set_magnification(0.5).unwrap(); // unchanged

        assert_eq!(*seen.borrow(), vec!["2 / 2 (100%)", "2 / 2 (50%)"]);
    }

    #[test]
    fn zoom_listeners_fire_before_display_listeners() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut viewer = viewer(1);
        {
            let order = Rc::clone(&order);
            viewer.add_display_change_listener(move |_| order.borrow_mut().push("display"));
        }
        {
            let order = Rc::clone(&order);
            viewer.add_zoom_listener(move |_| order.borrow_mut().push("zoom"));
        }
        viewer.zoom_in();
        assert_eq!(*order.borrow(), vec!["zoom", "display"]);
    }

    #[test]
    fn repaint_is_requested_after_changes_only() {
        let mut viewer = viewer(2);
        assert!(viewer.take_repaint_request());
        assert!(!viewer.take_repaint_request());

        viewer.show_previous();
        assert!(!viewer.take_repaint_request());

        viewer.show_next();
        assert!(viewer.take_repaint_request());
    }

    #[test]
    fn downscale_goes_through_cache_once() {
        let mut viewer = viewer(1);
        viewer.set_magnification(0.5).unwrap();

        let first = viewer.render_frame().unwrap();
        let second = viewer.render_frame().unwrap();

        assert!(first.from_cache);
        assert_eq!(first.bitmap.dimensions(), (20, 10));
        assert!(!first.needs_scaling());
        assert!(Arc::ptr_eq(&first.bitmap, &second.bitmap));
        let stats = viewer.cache_stats();
        assert_eq!((stats.misses, stats.hits), (1, 1));
    }

    #[test]
    fn upscale_draws_original_without_caching() {
        let mut viewer = viewer(1);
        viewer.zoom_in();
        let frame = viewer.render_frame().unwrap();

        assert!(!frame.from_cache);
        assert!(Arc::ptr_eq(&frame.bitmap, viewer.current_image().pixels()));
        assert_eq!(frame.size, Size::new(80, 40));
        assert!(frame.needs_scaling());
        assert!(viewer.cache().is_empty());
    }

    #[test]
    fn small_frames_are_centred_in_viewport() {
        let mut viewer = viewer(1);
        viewer.set_viewport(Size::new(100, 100));
        let frame = viewer.render_frame().unwrap();
        assert_eq!(frame.origin, (30, 40));
    }

    #[test]
    fn navigation_recentres_large_content() {
        let images = vec![solid(10, 10), solid(300, 300)];
        let mut viewer = Viewer::with_config(images, &config()).unwrap();
        viewer.set_viewport(Size::new(100, 100));
        viewer.show_next();
        assert_eq!(viewer.layout().scroll(), (100, 100));
        assert_eq!(viewer.render_frame().unwrap().origin, (-100, -100));
    }

    #[test]
    fn pixel_identical_images_are_cached_separately() {
        let mut viewer = Viewer::with_config(vec![solid(8, 8), solid(8, 8)], &config()).unwrap();
        viewer.zoom_out();
        viewer.render_frame().unwrap();
        viewer.show_next();
        viewer.render_frame().unwrap();
        assert_eq!(viewer.cache().len(), 2);
    }

    #[test]
    fn prefetch_warms_neighbours_when_zoomed_out() {
        let mut viewer = viewer(3);
        assert!(viewer.prefetch_job().is_none());

        viewer.show_next();
        viewer.zoom_out();
        let job = viewer.prefetch_job().expect("zoomed out with neighbours");
        assert_eq!(job.images().len(), 2);
        assert_eq!(job.run(), 2);
        assert_eq!(viewer.cache().len(), 2);
        assert!(viewer.prefetch_job().is_none());
    }

    #[test]
    fn prefetch_can_be_disabled() {
        let cfg = ViewerConfig {
            prefetch: false,
            default_zoom_index: 0,
            ..config()
        };
        let viewer = Viewer::with_config(vec![solid(4, 4), solid(4, 4)], &cfg).unwrap();
        assert!(viewer.prefetch_job().is_none());
    }

    #[test]
    fn empty_bitmap_renders_without_resampling() {
        let mut viewer = Viewer::with_config(vec![ImageHandle::new(RgbaImage::new(0, 0))], &config()).unwrap();
        viewer.zoom_out();
        let frame = viewer.render_frame().unwrap();
        assert!(!frame.from_cache);
        assert_eq!(frame.size, Size::new(0, 0));
    }
}
