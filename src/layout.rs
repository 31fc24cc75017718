//! Viewport geometry: where magnified content sits and how far it is scrolled.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Viewport size plus the scroll anchor (top-left of the visible part of
/// the content). The anchor never leaves `0..=content - viewport`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    viewport: Size,
    scroll: (u32, u32),
}

impl Layout {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            scroll: (0, 0),
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn scroll(&self) -> (u32, u32) {
        self.scroll
    }

    pub fn set_viewport(&mut self, viewport: Size, content: Size) {
        self.viewport = viewport;
        self.clamp(content);
    }

    /// Put the middle of `content` in the middle of the viewport.
    pub fn recenter(&mut self, content: Size) {
        let (max_x, max_y) = self.max_scroll(content);
        self.scroll = (max_x / 2, max_y / 2);
    }

    /// Keep the point under the viewport centre fixed while the content
    /// changes size (zoom).
    pub fn rescale(&mut self, old: Size, new: Size) {
        let axis = |scroll: u32, view: u32, old: u32, new: u32| -> u32 {
            if old == 0 {
                return 0;
            }
            let centre = (scroll as f64 + view as f64 / 2.0) / old as f64;
            let target = centre * new as f64 - view as f64 / 2.0;
            target.max(0.0).round() as u32
        };
        self.scroll = (
            axis(self.scroll.0, self.viewport.width, old.width, new.width),
            axis(self.scroll.1, self.viewport.height, old.height, new.height),
        );
        self.clamp(new);
    }

    pub fn scroll_by(&mut self, dx: i32, dy: i32, content: Size) {
        let (max_x, max_y) = self.max_scroll(content);
        let step = |pos: u32, delta: i32, max: u32| -> u32 {
            (pos as i64 + delta as i64).clamp(0, max as i64) as u32
        };
        self.scroll = (step(self.scroll.0, dx, max_x), step(self.scroll.1, dy, max_y));
    }

    /// Top-left of the content in viewport coordinates. Content smaller than
    /// the viewport is centred on that axis (never at a negative offset);
    /// larger content is shifted by the scroll anchor.
    pub fn origin(&self, content: Size) -> (i32, i32) {
        let axis = |view: u32, content: u32, scroll: u32| -> i32 {
            if content <= view {
                (view / 2 - content / 2) as i32
            } else {
                -(scroll.min(content - view) as i32)
            }
        };
        (
            axis(self.viewport.width, content.width, self.scroll.0),
            axis(self.viewport.height, content.height, self.scroll.1),
        )
    }

    fn max_scroll(&self, content: Size) -> (u32, u32) {
        (
            content.width.saturating_sub(self.viewport.width),
            content.height.saturating_sub(self.viewport.height),
        )
    }

    fn clamp(&mut self, content: Size) {
        let (max_x, max_y) = self.max_scroll(content);
        self.scroll = (self.scroll.0.min(max_x), self.scroll.1.min(max_y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_content_is_centred_non_negative() {
        let layout = Layout::new(Size::new(100, 80));
        assert_eq!(layout.origin(Size::new(40, 20)), (30, 30));
        assert_eq!(layout.origin(Size::new(100, 80)), (0, 0));
        assert_eq!(layout.origin(Size::new(41, 21)), (30, 30));
    }

    #[test]
    fn recenter_puts_large_content_middle_in_view() {
        let mut layout = Layout::new(Size::new(100, 100));
        let content = Size::new(300, 50);
        layout.recenter(content);
        assert_eq!(layout.scroll(), (100, 0));
        assert_eq!(layout.origin(content), (-100, 25));
    }

    #[test]
    fn scroll_by_clamps_to_content() {
        let mut layout = Layout::new(Size::new(100, 100));
        let content = Size::new(250, 120);
        layout.scroll_by(1000, -5, content);
        assert_eq!(layout.scroll(), (150, 0));
        layout.scroll_by(-20, 30, content);
        assert_eq!(layout.scroll(), (130, 20));
    }

    #[test]
    fn rescale_keeps_view_centre() {
        let mut layout = Layout::new(Size::new(100, 100));
        let small = Size::new(200, 200);
        layout.recenter(small);
        assert_eq!(layout.scroll(), (50, 50));

        layout.rescale(small, Size::new(400, 400));
        // centre was at 100/200; now at 200/400
        assert_eq!(layout.scroll(), (150, 150));

        layout.rescale(Size::new(400, 400), Size::new(50, 50));
        assert_eq!(layout.scroll(), (0, 0));
    }

    #[test]
    fn shrinking_viewport_keeps_anchor_in_range() {
        let mut layout = Layout::new(Size::new(50, 50));
        let content = Size::new(100, 100);
        layout.scroll_by(50, 50, content);
        layout.set_viewport(Size::new(90, 90), content);
        assert_eq!(layout.scroll(), (10, 10));
    }
}
