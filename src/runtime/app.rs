//! Application handler and command execution
//!
//! Owns the window, the three webviews (chrome, sandbox surface, floating
//! toolbar), and the mpsc channel async work reports back through. All side
//! effects described by `Cmd` are executed here; blocking work runs on
//! spawned threads and returns as messages.

use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{Key, ModifiersState};
use winit::window::Window;

use crate::cli::{StartupConfig, StartupMode};
use crate::commands::Cmd;
use crate::config::AppConfig;
use crate::messages::{AppMsg, EditorMsg, Msg, OutputMsg, PreviewMsg};
use crate::model::{ActiveTab, AppModel, ViewportPreset};
use crate::services::{GenerationService, RewriteService};
use crate::synthesis::bridge;
use crate::update::update;

use super::chrome::{ChromeView, TOP_BAR_HEIGHT};
use super::toolbar::ToolbarView;
use super::webview::{SandboxSurface, SurfaceBounds};

const INITIAL_WIDTH: u32 = 1280;
const INITIAL_HEIGHT: u32 = 860;

/// Shown in the sandbox surface before the first synthesis
const PLACEHOLDER_HTML: &str = "<!DOCTYPE html><html><body style=\"background:#11111b\"></body></html>";

pub struct App {
    model: AppModel,
    window: Option<Rc<Window>>,
    chrome: Option<ChromeView>,
    sandbox: Option<SandboxSurface>,
    toolbar: Option<ToolbarView>,
    msg_tx: Sender<Msg>,
    msg_rx: Receiver<Msg>,
    generation: Arc<dyn GenerationService>,
    rewrite: Arc<dyn RewriteService>,
    startup: Option<StartupConfig>,
    modifiers: ModifiersState,
    exit_requested: bool,
}

impl App {
    pub fn new(
        config: AppConfig,
        startup: StartupConfig,
        generation: Arc<dyn GenerationService>,
        rewrite: Arc<dyn RewriteService>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        let model = AppModel::new(INITIAL_WIDTH, INITIAL_HEIGHT, config);
        Self {
            model,
            window: None,
            chrome: None,
            sandbox: None,
            toolbar: None,
            msg_tx,
            msg_rx,
            generation,
            rewrite,
            startup: Some(startup),
            modifiers: ModifiersState::empty(),
            exit_requested: false,
        }
    }

    /// Run one message through the update loop and execute its commands
    ///
    /// Returns whether the chrome needs repainting.
    fn dispatch(&mut self, msg: Msg) -> bool {
        if let Some(cmd) = update(&mut self.model, msg) {
            let needs_redraw = cmd.needs_redraw();
            self.process_cmd(cmd);
            needs_redraw
        } else {
            false
        }
    }

    fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => {}
            Cmd::Redraw => {}
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }

            Cmd::SwapDocument { html } => {
                if let Some(sandbox) = &self.sandbox {
                    sandbox.swap_document(&html);
                }
            }
            Cmd::PostToSandbox(msg) => {
                if let Some(sandbox) = &self.sandbox {
                    sandbox.post(&msg);
                }
            }
            Cmd::ResizeSandbox { .. } => {
                self.position_sandbox();
            }
            Cmd::ScheduleReadyTimeout {
                generation,
                delay_ms,
            } => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    std::thread::sleep(Duration::from_millis(delay_ms));
                    let _ = tx.send(Msg::Preview(PreviewMsg::ReadyTimeout { generation }));
                });
            }

            Cmd::Generate { format, source } => {
                let service = Arc::clone(&self.generation);
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let result = service.generate(&source, format.label());
                    let _ = tx.send(Msg::Output(OutputMsg::GenerationCompleted {
                        format,
                        result,
                    }));
                });
            }
            Cmd::RewriteElement {
                outer_html,
                instruction,
            } => {
                let service = Arc::clone(&self.rewrite);
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let result = service.rewrite(&outer_html, &instruction);
                    let _ = tx.send(Msg::Editor(EditorMsg::RewriteCompleted { result }));
                });
            }

            Cmd::CopyToClipboard(text) => match arboard::Clipboard::new() {
                Ok(mut clipboard) => {
                    if let Err(e) = clipboard.set_text(text) {
                        tracing::warn!("Failed to set clipboard text: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Failed to open clipboard: {}", e),
            },

            Cmd::ShowOpenFileDialog => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let Some(path) = rfd::FileDialog::new()
                        .add_filter("Documents", &["md", "markdown", "txt"])
                        .pick_file()
                    else {
                        return;
                    };
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let msg = match std::fs::read_to_string(&path) {
                        Ok(content) => Msg::App(AppMsg::LoadSource { name, content }),
                        Err(e) => Msg::App(AppMsg::SourceLoadFailed(e.to_string())),
                    };
                    let _ = tx.send(msg);
                });
            }

            Cmd::ShowSaveFileDialog { suggested_name } => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let path = rfd::FileDialog::new()
                        .set_file_name(&suggested_name)
                        .save_file();
                    let _ = tx.send(Msg::App(AppMsg::SaveDialogResult { path }));
                });
            }

            Cmd::SaveFile { path, content } => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let result = std::fs::write(&path, content).map_err(|e| e.to_string());
                    let _ = tx.send(Msg::App(AppMsg::SaveCompleted(result)));
                });
            }
            Cmd::SaveBinaryFile { path, bytes } => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let result = std::fs::write(&path, bytes).map_err(|e| e.to_string());
                    let _ = tx.send(Msg::App(AppMsg::SaveCompleted(result)));
                });
            }

            Cmd::PrintPreview => {
                if let Some(sandbox) = &self.sandbox {
                    sandbox.print();
                }
            }
            Cmd::CaptureImage => {
                if let Some(sandbox) = &self.sandbox {
                    sandbox.evaluate(bridge::capture_image_script());
                }
            }

            Cmd::PersistConfig => {
                let config = self.model.config.clone();
                std::thread::spawn(move || {
                    if let Err(e) = config.save() {
                        tracing::warn!("Failed to persist config: {}", e);
                    }
                });
            }

            Cmd::Quit => {
                self.exit_requested = true;
            }
        }
    }

    /// Drain messages reported by worker threads and webview IPC
    fn process_async_messages(&mut self) -> bool {
        let mut needs_redraw = false;
        while let Ok(msg) = self.msg_rx.try_recv() {
            if self.dispatch(msg) {
                needs_redraw = true;
            }
        }
        needs_redraw
    }

    /// The sandbox surface's bounds in physical pixels
    fn sandbox_bounds(&self) -> SurfaceBounds {
        let Some(window) = &self.window else {
            return SurfaceBounds::default();
        };
        let scale = window.scale_factor();
        let size = window.inner_size();
        let top = TOP_BAR_HEIGHT * scale;
        let area_w = size.width as f64;
        let area_h = (size.height as f64 - top).max(0.0);

        let vp = self.model.preview.viewport;
        let (w, h) = if vp.preset == ViewportPreset::Responsive {
            (area_w, area_h)
        } else {
            (
                (vp.width as f64 * scale).min(area_w),
                (vp.height as f64 * scale).min(area_h),
            )
        };
        SurfaceBounds {
            x: ((area_w - w) / 2.0).max(0.0),
            y: top + ((area_h - h) / 2.0).max(0.0),
            width: w,
            height: h,
        }
    }

    fn position_sandbox(&self) {
        let (Some(window), Some(sandbox)) = (&self.window, &self.sandbox) else {
            return;
        };
        let bounds = self.sandbox_bounds();
        sandbox.set_bounds(bounds, window.scale_factor(), window.inner_size().height);
    }

    /// Repaint the chrome and sync the child views to the model
    fn render(&self) {
        let Some(window) = &self.window else { return };

        if let Some(chrome) = &self.chrome {
            chrome.render(&self.model);
        }

        let preview_visible = self.model.active_tab == ActiveTab::Preview;
        if let Some(sandbox) = &self.sandbox {
            sandbox.set_visible(preview_visible);
        }
        self.position_sandbox();

        if let Some(toolbar) = &self.toolbar {
            if preview_visible && self.model.preview.edit_mode {
                let bounds = self.sandbox_bounds();
                let scale = window.scale_factor();
                toolbar.render(&self.model, (bounds.x / scale, bounds.y / scale));
            } else {
                toolbar.hide();
            }
        }
    }

    /// Open whatever the command line pointed at
    fn apply_startup(&mut self, startup: StartupConfig) {
        match startup.mode {
            StartupMode::Empty => {}
            StartupMode::Source { path } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match std::fs::read_to_string(&path) {
                    Ok(content) => {
                        self.dispatch(Msg::App(AppMsg::LoadSource { name, content }));
                    }
                    Err(e) => {
                        self.dispatch(Msg::App(AppMsg::SourceLoadFailed(e.to_string())));
                    }
                }
            }
            StartupMode::Code { path, format } => match std::fs::read_to_string(&path) {
                Ok(code) => {
                    self.dispatch(Msg::Output(OutputMsg::GenerationCompleted {
                        format,
                        result: Ok(code),
                    }));
                }
                Err(e) => {
                    self.dispatch(Msg::App(AppMsg::SourceLoadFailed(e.to_string())));
                }
            },
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Markweave")
            .with_inner_size(LogicalSize::new(INITIAL_WIDTH, INITIAL_HEIGHT));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Rc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let chrome = ChromeView::new(&window, self.msg_tx.clone());
        let sandbox = SandboxSurface::new(
            &window,
            self.sandbox_bounds(),
            PLACEHOLDER_HTML,
            self.msg_tx.clone(),
        );
        let toolbar = ToolbarView::new(&window, self.msg_tx.clone());

        match (chrome, sandbox, toolbar) {
            (Ok(chrome), Ok(sandbox), Ok(toolbar)) => {
                self.chrome = Some(chrome);
                self.sandbox = Some(sandbox);
                self.toolbar = Some(toolbar);
            }
            (chrome, sandbox, toolbar) => {
                for e in [chrome.err(), sandbox.err(), toolbar.err()]
                    .into_iter()
                    .flatten()
                {
                    tracing::error!("Failed to create webview: {}", e);
                }
                event_loop.exit();
                return;
            }
        }

        let size = window.inner_size();
        self.model.window_size = (size.width, size.height);
        self.window = Some(window);

        if let Some(startup) = self.startup.take() {
            self.apply_startup(startup);
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window_id != window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.dispatch(Msg::resize(size.width, size.height));
                if let Some(chrome) = &self.chrome {
                    let scale = window.scale_factor();
                    chrome.set_bounds(wry::Rect {
                        position: wry::dpi::LogicalPosition::new(0.0, 0.0).into(),
                        size: wry::dpi::LogicalSize::new(
                            size.width as f64 / scale,
                            size.height as f64 / scale,
                        )
                        .into(),
                    });
                }
                self.position_sandbox();
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let command = self.modifiers.control_key() || self.modifiers.super_key();
                if event.state == ElementState::Pressed
                    && command
                    && event.logical_key == Key::Character("q".into())
                {
                    self.dispatch(Msg::App(AppMsg::Quit));
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        if self.process_async_messages() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}
