//! Application event loop.
//!
//! One render loop, driven by winit's redraw requests, does all GPU work. Around it:
//!
//! 1. Parameter updates arrive as user events (from a [`Controller`]) or from key presses and
//!    file drops, and are applied to the [`ParameterStore`] between frames. The store belongs to
//!    the app, so updates sent before the surface attaches are kept for the first scene.
//! 2. A texture identity change tears the current [`SceneHost`] down and builds the next
//!    generation, then starts its texture load off the render loop.
//! 3. A finished load comes back as a user event tagged with its [`LoadTicket`] and is handed
//!    to the scene, which drops it if the generation has moved on.
//! 4. Each redraw syncs uniforms, clears, draws the plane and presents.

use std::{fmt::Debug, iter, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::{
    config::MistConfig,
    context::Context,
    controls,
    data_structures::params::{Applied, ParamUpdate, ParameterSet, ParameterStore},
    error::{ControllerClosed, ResourceLoadError},
    resources::texture::{
        Generation, LoadOutcome, LoadTicket, TextureManager, TextureResource, TextureSource,
    },
    scene::SceneHost,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub(crate) enum MistEvent {
    #[cfg(target_arch = "wasm32")]
    Initialized(AppState),
    Param(ParamUpdate),
    TextureLoaded {
        ticket: LoadTicket,
        result: Result<TextureResource, ResourceLoadError>,
    },
    Exit,
}

impl Debug for MistEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Param(update) => f.debug_tuple("Param").field(update).finish(),
            Self::TextureLoaded { ticket, result } => f
                .debug_struct("TextureLoaded")
                .field("ticket", ticket)
                .field("ok", &result.is_ok())
                .finish(),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

/// Handle for changing parameters from outside the render loop.
///
/// Cheap to clone and usable from any thread. Updates are applied in arrival order, each
/// becoming visible from the next frame on.
#[derive(Clone, Debug)]
pub struct Controller(EventLoopProxy<MistEvent>);

impl Controller {
    pub fn set(&self, update: ParamUpdate) -> Result<(), ControllerClosed> {
        self.0
            .send_event(MistEvent::Param(update))
            .map_err(|_| ControllerClosed)
    }

    pub fn set_texture(&self, source: TextureSource) -> Result<(), ControllerClosed> {
        self.set(ParamUpdate::Texture(source))
    }

    /// Ask the loop to shut down after the current frame.
    pub fn exit(&self) -> Result<(), ControllerClosed> {
        self.0.send_event(MistEvent::Exit).map_err(|_| ControllerClosed)
    }
}

/// Everything that exists once a surface is attached.
#[derive(Debug)]
pub(crate) struct AppState {
    ctx: Context,
    scene: Option<SceneHost>,
    generation: Generation,
    is_surface_configured: bool,
    showing_loading: bool,
}

impl AppState {
    fn new(mut ctx: Context, config: &MistConfig) -> Self {
        ctx.clear_colour = config.clear_colour;
        Self {
            ctx,
            scene: None,
            generation: Generation::FIRST,
            is_surface_configured: false,
            showing_loading: false,
        }
    }

    /// Build the first generation. Returns the ticket of the load to start.
    fn mount(&mut self, config: &MistConfig, params: &ParameterSet) -> Option<LoadTicket> {
        match SceneHost::initialize(&self.ctx, config, params, self.generation) {
            Ok((scene, ticket)) => {
                self.scene = Some(scene);
                Some(ticket)
            }
            Err(_) => None,
        }
    }

    /// Replace the scene with a fresh generation for `source`.
    fn remount(
        &mut self,
        config: &MistConfig,
        params: &ParameterSet,
        source: TextureSource,
    ) -> Option<LoadTicket> {
        let result = match self.scene.take() {
            Some(scene) => scene.on_texture_identity_change(&self.ctx, config, params, source),
            None => SceneHost::initialize(&self.ctx, config, params, self.generation.next()),
        };
        self.generation = self.generation.next();
        match result {
            Ok((scene, ticket)) => {
                self.scene = Some(scene);
                Some(ticket)
            }
            Err(_) => None,
        }
    }

    fn complete_load(&mut self, ticket: LoadTicket, result: Result<TextureResource, ResourceLoadError>) {
        let Some(scene) = self.scene.as_mut() else {
            log::warn!(
                "Dropping texture {} for generation {:?}, no scene is mounted",
                ticket.source.label(),
                ticket.generation
            );
            return;
        };
        match scene.complete_load(&self.ctx, &ticket, result) {
            LoadOutcome::Ready(_) | LoadOutcome::Stale => (),
            LoadOutcome::FellBack(e) => {
                log::warn!("Showing the built-in texture instead of {}: {}", ticket.source.label(), e)
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
            if let Some(scene) = self.scene.as_mut() {
                scene.on_resize(&self.ctx.queue, width, height);
            }
        }
    }

    fn update_title(&mut self, title: &str) {
        let loading = self.scene.as_ref().is_some_and(SceneHost::is_loading);
        if loading != self.showing_loading {
            self.showing_loading = loading;
            if loading {
                self.ctx.window.set_title(&format!("{} (loading…)", title));
            } else {
                self.ctx.window.set_title(title);
            }
        }
    }

    fn render(&mut self, params: &ParameterSet) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        if let Some(scene) = self.scene.as_mut() {
            scene.per_frame(&self.ctx, params);
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if let Some(scene) = &self.scene {
                scene.draw(&mut render_pass);
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub(crate) struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<MistEvent>,
    config: MistConfig,
    params: ParameterStore,
    state: Option<AppState>,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<MistEvent>, config: MistConfig) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            params: ParameterStore::new(config.initial.clone()),
            config,
            state: None,
            fatal: None,
        })
    }

    /// Resolve the ticket's source off the render loop and post the result back.
    fn start_load(&self, ticket: LoadTicket) {
        let proxy = self.proxy.clone();
        let load = async move {
            let result = TextureManager::resolve(ticket.source.clone()).await;
            if proxy
                .send_event(MistEvent::TextureLoaded { ticket, result })
                .is_err()
            {
                log::debug!("Render loop closed before a texture load finished");
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.async_runtime.spawn(load);
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(load);
        }
    }

    fn apply(&mut self, update: ParamUpdate) {
        let Some(source) = route_update(&mut self.params, update, self.state.is_some()) else {
            return;
        };
        let ticket = match self.state.as_mut() {
            Some(state) => state.remount(&self.config, self.params.current(), source),
            None => None,
        };
        if let Some(ticket) = ticket {
            self.start_load(ticket);
        }
    }

    fn install(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        let ticket = state.mount(&self.config, self.params.current());
        state.update_title(&self.config.title);
        state.ctx.window.request_redraw();
        self.state = Some(state);
        if let Some(ticket) = ticket {
            self.start_load(ticket);
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.fatal = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler<MistEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(&self.config.title);

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, anyhow::anyhow!("cannot create a window: {e}")),
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(Context::attach(window)) {
                Ok(ctx) => {
                    let state = AppState::new(ctx, &self.config);
                    self.install(state);
                }
                Err(e) => self.fail(event_loop, e.into()),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match Context::attach(window).await {
                    Ok(ctx) => {
                        let state = AppState::new(ctx, &config);
                        if proxy.send_event(MistEvent::Initialized(state)).is_err() {
                            log::error!("Event loop closed during initialisation");
                        }
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        if proxy.send_event(MistEvent::Exit).is_err() {
                            log::debug!("Event loop closed before the surface error was reported");
                        }
                    }
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: MistEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            MistEvent::Initialized(state) => self.install(state),
            MistEvent::Param(update) => self.apply(update),
            MistEvent::TextureLoaded { ticket, result } => {
                if let Some(state) = self.state.as_mut() {
                    state.complete_load(ticket, result);
                }
            }
            MistEvent::Exit => event_loop.exit(),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.state.is_none() {
            return;
        }

        let updates =
            controls::updates_for_event(&event, self.params.current(), &self.config.initial);
        for update in updates {
            self.apply(update);
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                match state.render(self.params.current()) {
                    Ok(_) => state.update_title(&self.config.title),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        log::warn!("Surface lost, reconfiguring");
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Apply `update` to the store. Returns the texture to remount onto when a scene is live.
///
/// Before the surface attaches there is nothing to remount; the new texture is simply what the
/// first scene gets built with.
fn route_update(
    params: &mut ParameterStore,
    update: ParamUpdate,
    attached: bool,
) -> Option<TextureSource> {
    match params.apply(update) {
        Applied::Remount(source) if attached => Some(source),
        Applied::Remount(source) => {
            log::debug!("Texture set to {} before the surface attached", source.label());
            None
        }
        Applied::Scalar(_) | Applied::Unchanged | Applied::Rejected(_) => None,
    }
}

/// Open a window and run the warp until it is closed.
pub fn run(config: MistConfig) -> anyhow::Result<()> {
    run_with(config, |_| ())
}

/// Like [`run`], but hands a [`Controller`] to `setup` before the loop starts.
pub fn run_with(config: MistConfig, setup: impl FnOnce(Controller)) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<MistEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    setup(Controller(event_loop.create_proxy()));

    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_before_attach_are_kept_for_the_first_scene() {
        let mut params = ParameterStore::new(ParameterSet::default());
        let source = TextureSource::Url("https://example.com/sea.png".to_string());

        assert_eq!(route_update(&mut params, ParamUpdate::Speed(0.4), false), None);
        assert_eq!(route_update(&mut params, ParamUpdate::Distortion(0.2), false), None);
        assert_eq!(
            route_update(&mut params, ParamUpdate::Texture(source.clone()), false),
            None
        );

        assert_eq!(params.current().speed, 0.4);
        assert_eq!(params.current().distortion, 0.2);
        assert_eq!(params.current().texture, source);
    }

    #[test]
    fn texture_change_after_attach_asks_for_a_remount() {
        let mut params = ParameterStore::new(ParameterSet::default());
        let source = TextureSource::File("dunes.png".into());

        assert_eq!(route_update(&mut params, ParamUpdate::Frequency(3.0), true), None);
        assert_eq!(
            route_update(&mut params, ParamUpdate::Texture(source.clone()), true),
            Some(source.clone())
        );
        assert_eq!(route_update(&mut params, ParamUpdate::Texture(source), true), None);
    }
}
