use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use model_showcase::cli::{Cli, Command};
use model_showcase::config::{ProcessEnv, ShowcaseConfig};
use model_showcase::core::control_input;
use model_showcase::controls::ControlInput;
use model_showcase::loaders::{spawn_load, LoadError, LoadedModel};
use model_showcase::newsletter::{
    spawn_submit, HttpTransport, MessageKind, NewsletterForm, SubmitError, SubmitState,
};
use model_showcase::renderer::Renderer;
use model_showcase::ui::{draw_overlay, PageText, UiAction};
use model_showcase::viewer::Viewer;

// === Constants ===

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 800;

/// Results coming back from worker threads
enum ShowcaseEvent {
    AssetSettled(std::result::Result<LoadedModel, LoadError>),
    NewsletterSettled(std::result::Result<(), SubmitError>),
}

struct App {
    proxy: EventLoopProxy<ShowcaseEvent>,
    config: ShowcaseConfig,
    page: PageText,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    viewer: Option<Viewer>,
    /// Absent with `--no-ui`
    form: Option<NewsletterForm>,
    transport: std::result::Result<Arc<HttpTransport>, String>,
}

impl App {
    fn new(proxy: EventLoopProxy<ShowcaseEvent>, cli: &Cli, config: ShowcaseConfig) -> Self {
        let page = PageText::from_params(&cli.launch_params());
        let form = (!cli.no_ui).then(|| endpoint_form(&config));
        let transport = HttpTransport::new()
            .map(Arc::new)
            .map_err(|e| e.to_string());

        Self {
            proxy,
            config,
            page,
            window: None,
            renderer: None,
            viewer: None,
            form,
            transport,
        }
    }

    fn start_load(&mut self) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        let Some(request) = viewer.begin_load(&self.config.asset.value) else {
            return;
        };

        log::info!("Loading model: {}", request.reference);
        let proxy = self.proxy.clone();
        spawn_load(request, move |outcome| {
            if proxy.send_event(ShowcaseEvent::AssetSettled(outcome)).is_err() {
                log::debug!("Event loop closed before the model settled");
            }
        });
    }

    fn submit(&mut self) {
        let Some(form) = &mut self.form else {
            return;
        };
        let Some(request) = form.begin_submit() else {
            return;
        };

        match &self.transport {
            Ok(transport) => {
                let proxy = self.proxy.clone();
                spawn_submit(transport.clone(), request, move |outcome| {
                    if proxy
                        .send_event(ShowcaseEvent::NewsletterSettled(outcome))
                        .is_err()
                    {
                        log::debug!("Event loop closed before the signup settled");
                    }
                });
            }
            Err(e) => form.settle(Err(SubmitError::transport(e.clone()))),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(window), Some(viewer)) =
            (&mut self.renderer, &self.window, &mut self.viewer)
        else {
            return;
        };

        viewer.frame();
        renderer.sync_model(viewer);
        let viewer: &Viewer = viewer;

        let mut action = None;
        let page = &self.page;
        let status = viewer.status();
        let form = &mut self.form;
        let outcome = renderer.render(window, viewer, &mut |ctx: &egui::Context| {
            if let Some(a) = draw_overlay(ctx, page, status, form.as_mut()) {
                action = Some(a);
            }
        });

        match outcome {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(window.inner_size(), window.scale_factor());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {}", e),
        }

        if action == Some(UiAction::Subscribe) {
            self.submit();
        }
    }
}

impl ApplicationHandler<ShowcaseEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(self.page.title.clone())
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(window.clone())) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.viewer = Some(Viewer::new(size.width, size.height));
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.start_load();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ShowcaseEvent) {
        match event {
            ShowcaseEvent::AssetSettled(outcome) => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.finish_load(outcome);
                }
            }
            ShowcaseEvent::NewsletterSettled(outcome) => {
                if let Some(form) = &mut self.form {
                    form.settle(outcome);
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Overlay gets first pick; releases still reach the controls so a
        // drag never sticks
        let consumed = match (&mut self.renderer, &self.window) {
            (Some(renderer), Some(window)) => renderer.handle_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
                    renderer.resize(size, window.scale_factor());
                }
                if let Some(viewer) = &mut self.viewer {
                    viewer.resize(size.width, size.height);
                }
                log::debug!("Resized to {}x{}", size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                let Some(input) = control_input(&other) else {
                    return;
                };
                let always = matches!(
                    input,
                    ControlInput::ButtonReleased(_)
                        | ControlInput::CursorLeft
                        | ControlInput::TouchEnded { .. }
                );
                if consumed && !always {
                    return;
                }
                if let Some(viewer) = &mut self.viewer {
                    viewer.handle_input(input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn endpoint_form(config: &ShowcaseConfig) -> NewsletterForm {
    NewsletterForm::new(config.newsletter_endpoint.as_ref().map(|e| e.value.clone()))
}

/// Headless sign-up through the same form state machine
fn subscribe(config: &ShowcaseConfig, email: &str) -> Result<ExitCode> {
    let transport = HttpTransport::new().context("Failed to build HTTP client")?;
    let mut form = endpoint_form(config);
    form.set_input(email);

    let state = form.submit(&transport);
    if let Some(message) = form.message() {
        match message.kind {
            MessageKind::Success => println!("{}", message.text),
            MessageKind::Error => eprintln!("{}", message.text),
        }
    }

    Ok(if state == SubmitState::Succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ShowcaseConfig::resolve(&cli.launch_params(), &ProcessEnv);

    if let Some(Command::Subscribe { email }) = &cli.command {
        return subscribe(&config, email);
    }

    let event_loop = EventLoop::<ShowcaseEvent>::with_user_event().build()?;
    let mut app = App::new(event_loop.create_proxy(), &cli, config);

    log::info!("Model Showcase - drag to rotate, scroll to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(ExitCode::SUCCESS)
}
