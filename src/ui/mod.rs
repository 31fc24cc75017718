use softbuffer::Surface;
use std::error::Error;
use std::num::NonZeroU32;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use crate::ui::state::{Command, UiState, WHEEL_LINE, window_title};

pub mod render;
pub mod state;

#[derive(Debug, Clone, Copy)]
pub enum UserEvent {
    /// A background prefetch finished; carries how many renders are warm.
    PrefetchComplete(usize),
}

pub struct App {
    pub state: UiState,
    proxy: EventLoopProxy<UserEvent>,
    window: Option<Arc<Window>>,
    _context: Option<softbuffer::Context<Arc<Window>>>,
    surface: Option<Surface<Arc<Window>, Arc<Window>>>,
}

impl App {
    pub fn new(state: UiState, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            state,
            proxy,
            window: None,
            _context: None,
            surface: None,
        }
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let status = self.state.viewer.status();
        let title = self.state.viewer.title().to_owned();
        let attrs = Window::default_attributes()
            .with_title(window_title(&title, &status))
            .with_inner_size(LogicalSize::new(1280u32, 720u32));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let context = softbuffer::Context::new(Arc::clone(&window))?;
        let mut surface = Surface::new(&context, Arc::clone(&window))?;
        let size = window.inner_size();
        if let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            surface.resize(w, h)?;
        }

        let listener_window = Arc::clone(&window);
        self.state
            .viewer
            .add_display_change_listener(move |status| {
                listener_window.set_title(&window_title(&title, &status));
                listener_window.request_redraw();
            });

        self.state.resize(size.width, size.height);
        window.request_redraw();
        self.window = Some(window);
        self._context = Some(context);
        self.surface = Some(surface);
        Ok(())
    }

    fn request_pending_redraw(&mut self) {
        if self.state.take_redraw() {
            if let Some(ref window) = self.window {
                window.request_redraw();
            }
        }
    }

    /// Warm the neighbours' downscales off the UI thread.
    fn prefetch(&self) {
        if let Some(job) = self.state.viewer.prefetch_job() {
            let proxy = self.proxy.clone();
            rayon::spawn(move || {
                let warmed = job.run();
                // The loop may already be gone on shutdown.
                let _ = proxy.send_event(UserEvent::PrefetchComplete(warmed));
            });
        }
    }

    fn redraw(&mut self) {
        let (Some(window), Some(surface)) = (self.window.as_ref(), self.surface.as_mut()) else {
            return;
        };
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.state.take_redraw();
        match surface.buffer_mut() {
            Ok(mut buffer) => {
                self.state.render(&mut buffer, size.width, size.height);
                if let Err(e) = buffer.present() {
                    log::warn!("Failed to present frame: {}", e);
                }
            }
            Err(e) => log::warn!("Failed to map frame buffer: {}", e),
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.open_window(event_loop) {
            log::error!("Could not open a window: {}", e);
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::PrefetchComplete(warmed) => {
                let stats = self.state.viewer.cache_stats();
                log::debug!(
                    "[prefetch] {} ready; cache {} entries, {:.1}/{:.1} MB, hit rate {:.2}",
                    warmed,
                    stats.entries,
                    stats.used_bytes as f64 / (1024.0 * 1024.0),
                    stats.budget as f64 / (1024.0 * 1024.0),
                    stats.hit_rate()
                );
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
                    return;
                };
                if let Some(ref mut surface) = self.surface {
                    if let Err(e) = surface.resize(w, h) {
                        log::warn!("Failed to resize surface: {}", e);
                    }
                }
                self.state.resize(width, height);
                self.request_pending_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let Some(command) = Command::from_key(&event.logical_key) else {
                    return;
                };
                if self.state.handle_command(command) {
                    event_loop.exit();
                    return;
                }
                self.request_pending_redraw();
                self.prefetch();
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    if state == ElementState::Pressed {
                        self.state.start_drag();
                    } else {
                        self.state.end_drag();
                    }
                }
            }

            WindowEvent::CursorMoved {
                position: PhysicalPosition { x, y },
                ..
            } => {
                self.state.cursor_moved(x, y);
                self.request_pending_redraw();
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (x as f64 * WHEEL_LINE, y as f64 * WHEEL_LINE),
                    MouseScrollDelta::PixelDelta(PhysicalPosition { x, y }) => (x, y),
                };
                self.state.wheel(dx, dy);
                self.request_pending_redraw();
            }

            WindowEvent::RedrawRequested => self.redraw(),

            _ => {}
        }
    }
}
