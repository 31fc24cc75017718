use winit::keyboard::{Key, NamedKey};

use siv::i18n::{Localizer, TextKey};
use siv::{DisplayStatus, Size, Viewer};

use crate::ui::render::{BG_COLOR, Canvas, GLYPH_HEIGHT, Rgba, text_width};

pub const FOOTER_HEIGHT: u32 = 28;
/// Pixels scrolled per wheel notch.
pub const WHEEL_LINE: f64 = 40.0;

const TEXT_SCALE: u32 = 2;
const FOOTER_BG: Rgba = (20, 20, 20, 255);
const TEXT: Rgba = (255, 255, 255, 255);
const TEXT_DISABLED: Rgba = (90, 90, 90, 255);
const ERROR_TEXT: Rgba = (255, 80, 80, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Previous,
    Next,
    ZoomIn,
    ZoomOut,
    ToggleHelp,
    Quit,
}

impl Command {
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Named(NamedKey::ArrowLeft) => Some(Command::Previous),
            Key::Named(NamedKey::ArrowRight | NamedKey::Space) => Some(Command::Next),
            Key::Named(NamedKey::Escape) => Some(Command::Quit),
            Key::Character(s) => match s.as_str() {
                "h" | "H" => Some(Command::Previous),
                "l" | "L" | " " => Some(Command::Next),
                "+" | "=" => Some(Command::ZoomIn),
                "-" => Some(Command::ZoomOut),
                "?" => Some(Command::ToggleHelp),
                "q" | "Q" => Some(Command::Quit),
                _ => None,
            },
            _ => None,
        }
    }
}

/// `"Simple Image Viewer - 2 / 5 (50%)"`
pub fn window_title(title: &str, status: &DisplayStatus) -> String {
    format!("{} - {}", title, status.indicator())
}

pub struct UiState {
    pub viewer: Viewer,
    strings: Box<dyn Localizer>,
    pub dragging: bool,
    pub mouse_pos: (f64, f64),
    pub show_help: bool,
    redraw: bool,
}

impl UiState {
    pub fn new(viewer: Viewer, strings: Box<dyn Localizer>) -> Self {
        Self {
            viewer,
            strings,
            dragging: false,
            mouse_pos: (0.0, 0.0),
            show_help: false,
            redraw: true,
        }
    }

    /// Returns true if the app should quit.
    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Previous => {
                self.viewer.show_previous();
            }
            Command::Next => {
                self.viewer.show_next();
            }
            Command::ZoomIn => {
                self.viewer.zoom_in();
            }
            Command::ZoomOut => {
                self.viewer.zoom_out();
            }
            Command::ToggleHelp => {
                self.show_help = !self.show_help;
                self.redraw = true;
            }
            Command::Quit => return true,
        }
        false
    }

    /// Whether anything visible changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        let viewer = self.viewer.take_repaint_request();
        std::mem::take(&mut self.redraw) || viewer
    }

    /// The image area is the window minus the footer.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewer
            .set_viewport(Size::new(width, height.saturating_sub(FOOTER_HEIGHT)));
        self.redraw = true;
    }

    pub fn start_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Dragging pulls the content along with the cursor.
    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        let (lx, ly) = self.mouse_pos;
        self.mouse_pos = (x, y);
        if self.dragging {
            self.viewer
                .scroll_by((lx - x).round() as i32, (ly - y).round() as i32);
        }
    }

    pub fn wheel(&mut self, dx: f64, dy: f64) {
        self.viewer.scroll_by(-dx.round() as i32, -dy.round() as i32);
    }

    /// Render into the softbuffer framebuffer (u32 per pixel, 0x00RRGGBB).
    pub fn render(&self, frame: &mut [u32], fb_w: u32, fb_h: u32) {
        let mut canvas = Canvas::new(frame, fb_w, fb_h);
        canvas.clear(BG_COLOR);

        match self.viewer.render_frame() {
            Ok(plan) => {
                let (x, y) = plan.origin;
                canvas.checkerboard(x, y, plan.size);
                canvas.blit(&plan.bitmap, plan.origin, plan.size);
            }
            Err(err) => {
                let msg = format!("{}: {}", self.strings.lookup(TextKey::RenderFailed), err);
                let y = canvas.height().saturating_sub(FOOTER_HEIGHT) as i32 / 2;
                canvas.draw_text(&msg, 20, y, TEXT_SCALE, ERROR_TEXT);
            }
        }

        self.draw_footer(&mut canvas);
        if self.show_help {
            self.draw_help(&mut canvas);
        }
    }

    /// `< 2 / 5 (50%) >`, with an arrow dimmed when there is nowhere to go.
    fn draw_footer(&self, canvas: &mut Canvas) {
        let status = self.viewer.status();
        let top = canvas.height().saturating_sub(FOOTER_HEIGHT) as i32;
        canvas.fill_rect(0, top, canvas.width(), FOOTER_HEIGHT, FOOTER_BG);

        let previous = self.strings.lookup(TextKey::Previous);
        let next = self.strings.lookup(TextKey::Next);
        let indicator = format!(" {} ", status.indicator());
        let total = text_width(&previous, TEXT_SCALE)
            + text_width(&indicator, TEXT_SCALE)
            + text_width(&next, TEXT_SCALE);

        let y = top + ((FOOTER_HEIGHT - GLYPH_HEIGHT * TEXT_SCALE) / 2) as i32;
        let x = (canvas.width() as i32 - total as i32) / 2;
        let shade = |enabled: bool| if enabled { TEXT } else { TEXT_DISABLED };

        let x = canvas.draw_text(&previous, x, y, TEXT_SCALE, shade(status.has_previous));
        let x = canvas.draw_text(&indicator, x, y, TEXT_SCALE, TEXT);
        canvas.draw_text(&next, x, y, TEXT_SCALE, shade(status.has_next));
    }

    fn draw_help(&self, canvas: &mut Canvas) {
        canvas.fill_rect(0, 0, canvas.width(), canvas.height(), (0, 0, 0, 200));
        let lines = [
            TextKey::HelpTitle,
            TextKey::HelpNavigate,
            TextKey::HelpZoom,
            TextKey::HelpQuit,
        ];
        let mut y = 20;
        for key in lines {
            canvas.draw_text(&self.strings.lookup(key), 20, y, TEXT_SCALE, TEXT);
            y += 24;
        }
    }
}
