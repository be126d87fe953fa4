// main.rs: window, event loop and start-up wiring

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use panorama_tour::app::App;
use panorama_tour::catalog::Catalog;
use panorama_tour::config::ViewerConfig;
use panorama_tour::i18n::{self, flag_value, tr};
use panorama_tour::renderer::Renderer;
use panorama_tour::viewer::PanoramaViewer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    i18n::init(i18n::resolve_lang(&args));

    let config = ViewerConfig::resolve(flag_value(&args, "--config").map(PathBuf::from).as_deref());
    let catalog = match flag_value(&args, "--catalog") {
        Some(path) => Catalog::load(Path::new(&path))
            .with_context(|| format!("loading room catalog {path}"))?,
        None => Catalog::builtin().context("parsing built-in room catalog")?,
    };
    log::info!("{} rooms in catalog", catalog.rooms().len());

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)
            .context("creating window")?,
    );

    let renderer = pollster::block_on(Renderer::new(window.clone()))?;
    let mut app = App::new(window.clone(), renderer, catalog, PanoramaViewer::new(config));

    if let Some(room) = flag_value(&args, "--room") {
        app.open_room(&room);
    }

    event_loop.run(move |event, _, control_flow| {
        // The render step only needs to run continuously while a tour is open.
        *control_flow = if app.viewer_open() {
            ControlFlow::Poll
        } else {
            ControlFlow::Wait
        };

        match event {
            Event::WindowEvent { event, .. } => {
                if matches!(event, WindowEvent::CloseRequested) {
                    app.shutdown();
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                app.handle_window_event(&event);
                window.request_redraw();
            }

            Event::RedrawRequested(_) => {
                if let Err(e) = app.redraw() {
                    app.handle_render_error(e);
                }
            }

            Event::MainEventsCleared => {
                if app.viewer_open() {
                    window.request_redraw();
                }
            }

            _ => {}
        }

        if app.exit_requested() {
            app.shutdown();
            *control_flow = ControlFlow::Exit;
        }
    });
}
