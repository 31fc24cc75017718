mod cli;
mod files;
mod loader;
mod ui;

use clap::Parser;
use std::process::ExitCode;
use winit::event_loop::{ControlFlow, EventLoop};

use siv::Viewer;
use siv::i18n::DefaultStrings;

use crate::cli::Cli;
use crate::files::collect_images;
use crate::loader::load_images;
use crate::ui::state::UiState;
use crate::ui::{App, UserEvent};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.viewer_config();

    let files = collect_images(&cli.paths, cli.recursive);
    if files.is_empty() {
        log::error!("No image files found.");
        return ExitCode::FAILURE;
    }

    let viewer = match Viewer::with_config(load_images(&files), &config) {
        Ok(viewer) => viewer,
        Err(e) => {
            log::error!("Cannot start viewer: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let event_loop = match EventLoop::<UserEvent>::with_user_event().build() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Cannot create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(
        UiState::new(viewer, Box::new(DefaultStrings)),
        event_loop.create_proxy(),
    );
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop failed: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
