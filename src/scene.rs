//! The scene host.
//!
//! One [`SceneHost`] is one generation of the scene: camera, plane, shader program, the
//! texture it samples and the clock the animation runs on. A texture identity change never
//! patches a live host. The old host is dropped, which releases its texture, and a new one
//! is built with the next [`Generation`]. Loads still in flight for the old generation are
//! recognised by their [`LoadTicket`] and discarded when they land.

use cgmath::Deg;

use crate::{
    camera::CameraRig,
    config::MistConfig,
    context::Context,
    data_structures::{
        clock::AnimationClock,
        params::ParameterSet,
        plane::PlaneGeometry,
        texture::Texture,
        uniforms::ShaderUniformSet,
    },
    error::{ResourceLoadError, ShaderCompileError},
    pipelines::warp::ShaderProgram,
    resources::texture::{
        Generation, LoadOutcome, LoadTicket, TextureManager, TextureResource, TextureSource,
    },
    sync::UniformSynchronizer,
};

#[derive(Debug)]
pub struct SceneHost {
    clock: AnimationClock,
    rig: CameraRig,
    plane: PlaneGeometry,
    program: Option<ShaderProgram>,
    textures: TextureManager,
    gpu_texture: Option<Texture>,
    synchronizer: UniformSynchronizer,
}

impl SceneHost {
    /// Build generation `generation` and return it with the ticket for its texture load.
    ///
    /// The caller starts the load; its result comes back through
    /// [`complete_load`](Self::complete_load).
    pub fn initialize(
        ctx: &Context,
        config: &MistConfig,
        params: &ParameterSet,
        generation: Generation,
    ) -> Result<(Self, LoadTicket), ShaderCompileError> {
        let rig = CameraRig::new(
            &ctx.device,
            ctx.size(),
            Deg(config.fov_degrees),
            config.camera_distance,
        );
        let program =
            match ShaderProgram::new(&ctx.device, ctx.config.format, &rig.bind_group_layout, params) {
                Ok(program) => program,
                Err(e) => {
                    log::error!("Scene generation {:?} cannot render: {}", generation, e);
                    return Err(e);
                }
            };
        let plane = PlaneGeometry::new(&ctx.device, config.plane_segments);
        let textures = TextureManager::new(generation)
            .with_max_dimension(ctx.device.limits().max_texture_dimension_2d);
        let ticket = textures.ticket(params.texture.clone());
        log::info!("Scene generation {:?} built, waiting for {}", generation, ticket.source.label());

        Ok((
            Self {
                clock: AnimationClock::start(),
                rig,
                plane,
                program: Some(program),
                textures,
                gpu_texture: None,
                synchronizer: UniformSynchronizer::new(),
            },
            ticket,
        ))
    }

    pub fn generation(&self) -> Generation {
        self.textures.generation()
    }

    pub fn is_loading(&self) -> bool {
        self.textures.is_loading()
    }

    pub fn uniforms(&self) -> Option<&ShaderUniformSet> {
        self.program.as_ref().map(ShaderProgram::uniforms)
    }

    /// Rescale the plane to a new viewport. Shader state is left alone.
    pub fn on_resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.rig.resize(queue, width, height);
    }

    /// Tear this generation down and build the next one around `source`.
    pub fn on_texture_identity_change(
        self,
        ctx: &Context,
        config: &MistConfig,
        params: &ParameterSet,
        source: TextureSource,
    ) -> Result<(Self, LoadTicket), ShaderCompileError> {
        let next = self.generation().next();
        log::info!(
            "Texture identity changed to {}, tearing down generation {:?}",
            source.label(),
            self.generation()
        );
        drop(self);
        let params = ParameterSet {
            texture: source,
            ..params.clone()
        };
        Self::initialize(ctx, config, &params, next)
    }

    /// Accept the result of a texture load started for `ticket`.
    pub fn complete_load(
        &mut self,
        ctx: &Context,
        ticket: &LoadTicket,
        result: Result<TextureResource, ResourceLoadError>,
    ) -> LoadOutcome {
        let outcome = self.textures.complete(ticket, result);
        if !matches!(outcome, LoadOutcome::Stale) {
            self.gpu_texture = self
                .textures
                .current()
                .map(|resource| Texture::from_resource(&ctx.device, &ctx.queue, resource));
        }
        outcome
    }

    /// Advance the animation and push this frame's uniforms to the GPU.
    pub fn per_frame(&mut self, ctx: &Context, params: &ParameterSet) {
        let elapsed = self.clock.elapsed();
        let available = self.gpu_texture.as_ref().map(|texture| texture.source);
        let bound = self.synchronizer.on_frame(
            self.program.as_mut().map(ShaderProgram::uniforms_mut),
            elapsed,
            params,
            available,
        );
        let Some(program) = self.program.as_mut() else {
            return;
        };
        if bound.is_some() {
            if let Some(texture) = &self.gpu_texture {
                program.bind_texture(&ctx.device, texture);
            }
        }
        program.upload(&ctx.queue);
    }

    /// Record the scene's draw. Draws nothing while the texture is still loading.
    pub fn draw<'pass>(&self, render_pass: &mut wgpu::RenderPass<'pass>) {
        if let Some(program) = &self.program {
            program.draw(render_pass, &self.plane, &self.rig.bind_group);
        }
    }
}

impl Drop for SceneHost {
    fn drop(&mut self) {
        self.program = None;
        self.gpu_texture = None;
        self.textures.release();
        log::debug!("Scene generation {:?} released", self.generation());
    }
}
