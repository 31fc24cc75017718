//! User-visible text, looked up through an injected [`Localizer`].

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKey {
    WindowTitle,
    Previous,
    Next,
    HelpTitle,
    HelpNavigate,
    HelpZoom,
    HelpQuit,
    RenderFailed,
}

pub trait Localizer {
    fn lookup(&self, key: TextKey) -> Cow<'static, str>;
}

/// Built-in English strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrings;

impl Localizer for DefaultStrings {
    fn lookup(&self, key: TextKey) -> Cow<'static, str> {
        Cow::Borrowed(match key {
            TextKey::WindowTitle => "Simple Image Viewer",
            TextKey::Previous => "<",
            TextKey::Next => ">",
            TextKey::HelpTitle => "Key Bindings:",
            TextKey::HelpNavigate => "  Left / h, Right / l / Space : Previous / next image",
            TextKey::HelpZoom => "  + / -                       : Zoom in / out",
            TextKey::HelpQuit => "  Esc / q                     : Quit",
            TextKey::RenderFailed => "Could not render image",
        })
    }
}

impl<F> Localizer for F
where
    F: Fn(TextKey) -> Cow<'static, str>,
{
    fn lookup(&self, key: TextKey) -> Cow<'static, str> {
        self(key)
    }
}
