//! Texture manager: resolve a source into decoded pixels, configure sampling, own the result.

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::error::ResourceLoadError;

/// Where a texture comes from. All variants are loaded through the same path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TextureSource {
    /// The built-in image, generated in-process.
    #[default]
    Default,
    /// A file on disk. On the web it is fetched from the page's `assets/` directory.
    File(PathBuf),
    Url(String),
    /// Encoded image bytes handed over by the caller, e.g. a file the user picked.
    Bytes(Arc<[u8]>),
}

impl TextureSource {
    pub fn label(&self) -> String {
        match self {
            TextureSource::Default => "built-in".to_string(),
            TextureSource::File(path) => path.display().to_string(),
            TextureSource::Url(url) => url.clone(),
            TextureSource::Bytes(bytes) => format!("{} user bytes", bytes.len()),
        }
    }
}

/// Unique per decoded resource for the lifetime of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(u64);

impl TextureId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Wrap and filter state of a texture's sampler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingConfig {
    pub wrap_u: wgpu::AddressMode,
    pub wrap_v: wgpu::AddressMode,
    pub min_filter: wgpu::FilterMode,
    pub mag_filter: wgpu::FilterMode,
}

impl SamplingConfig {
    /// Mirrored repeat on both axes so displaced UVs reflect back into the image instead of
    /// tiling with a seam or smearing the border. Linear filtering keeps the continuous
    /// sub-texel motion smooth.
    pub const WARP: Self = Self {
        wrap_u: wgpu::AddressMode::MirrorRepeat,
        wrap_v: wgpu::AddressMode::MirrorRepeat,
        min_filter: wgpu::FilterMode::Linear,
        mag_filter: wgpu::FilterMode::Linear,
    };

    pub fn descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("warp sampler"),
            address_mode_u: self.wrap_u,
            address_mode_v: self.wrap_v,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: self.mag_filter,
            min_filter: self.min_filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        }
    }
}

/// A decoded image plus its sampling configuration.
#[derive(Debug)]
pub struct TextureResource {
    id: TextureId,
    label: String,
    image: image::RgbaImage,
    sampling: Option<SamplingConfig>,
}

impl TextureResource {
    pub fn from_image(image: image::RgbaImage, label: &str) -> Result<Self, ResourceLoadError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ResourceLoadError::Empty {
                label: label.to_string(),
            });
        }
        Ok(Self {
            id: TextureId::next(),
            label: label.to_string(),
            image,
            sampling: None,
        })
    }

    pub fn from_bytes(bytes: &[u8], label: &str) -> Result<Self, ResourceLoadError> {
        let image = image::load_from_memory(bytes).map_err(|source| ResourceLoadError::Decode {
            label: label.to_string(),
            source,
        })?;
        Self::from_image(image.to_rgba8(), label)
    }

    /// The built-in image: a warm-to-cool gradient crossed by soft rings and a fine grid,
    /// busy enough that any warp is visible.
    pub fn builtin() -> Self {
        const SIZE: u32 = 512;
        let image = image::RgbaImage::from_fn(SIZE, SIZE, |x, y| {
            let u = x as f32 / (SIZE - 1) as f32;
            let v = y as f32 / (SIZE - 1) as f32;
            let (du, dv) = (u - 0.5, v - 0.5);
            let ring = 0.5 + 0.5 * ((du * du + dv * dv).sqrt() * 48.0).cos();
            let grid = if x % 32 < 2 || y % 32 < 2 { 0.35 } else { 0.0 };
            let channel = |base: f32| ((base * (0.55 + 0.45 * ring) + grid).min(1.0) * 255.0) as u8;
            image::Rgba([
                channel(0.25 + 0.75 * u),
                channel(0.2 + 0.5 * v),
                channel(1.0 - 0.7 * u),
                255,
            ])
        });
        Self {
            id: TextureId::next(),
            label: TextureSource::Default.label(),
            image,
            sampling: None,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn image(&self) -> &image::RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn sampling(&self) -> Option<&SamplingConfig> {
        self.sampling.as_ref()
    }

    /// Downscale so neither side exceeds `max_dimension`, keeping the aspect ratio.
    /// Returns `true` if the image was resized.
    pub fn fit_within(&mut self, max_dimension: u32) -> bool {
        let max_dimension = max_dimension.max(1);
        let (width, height) = self.image.dimensions();
        if width <= max_dimension && height <= max_dimension {
            return false;
        }
        let scale = max_dimension as f32 / width.max(height) as f32;
        let fit = |side: u32| ((side as f32 * scale).round() as u32).clamp(1, max_dimension);
        let (fitted_width, fitted_height) = (fit(width), fit(height));
        log::warn!(
            "Texture {} is {}x{}, above the device limit of {}, downscaling to {}x{}",
            self.label,
            width,
            height,
            max_dimension,
            fitted_width,
            fitted_height
        );
        self.image = image::imageops::resize(
            &self.image,
            fitted_width,
            fitted_height,
            image::imageops::FilterType::Triangle,
        );
        true
    }

    /// Apply [`SamplingConfig::WARP`]. Returns `true` only on the call that changed anything.
    pub fn configure(&mut self) -> bool {
        if self.sampling == Some(SamplingConfig::WARP) {
            return false;
        }
        self.sampling = Some(SamplingConfig::WARP);
        true
    }
}

/// Result of handing a finished load to a [`TextureManager`].
#[derive(Debug)]
pub enum LoadOutcome {
    /// The texture is installed.
    Ready(TextureId),
    /// The load failed and the built-in texture was installed instead.
    FellBack(ResourceLoadError),
    /// The load belongs to an older generation and was dropped.
    Stale,
}

/// Generation marker of one scene instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const FIRST: Self = Self(0);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Identifies one pending load. Its generation is captured when the load starts.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadTicket {
    pub generation: Generation,
    pub source: TextureSource,
}

#[derive(Debug)]
enum Slot {
    Loading,
    Ready(Arc<TextureResource>),
}

/// Owns the texture of one scene generation.
///
/// Dropping the manager (or calling [`release`](Self::release)) frees the resource; the
/// shader program only ever sees the [`TextureId`]. Installed images are shrunk to the
/// device's texture size limit when one is set.
#[derive(Debug)]
pub struct TextureManager {
    generation: Generation,
    max_dimension: Option<u32>,
    slot: Slot,
}

impl TextureManager {
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            max_dimension: None,
            slot: Slot::Loading,
        }
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = Some(max_dimension);
        self
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn ticket(&self, source: TextureSource) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
            source,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.slot, Slot::Loading)
    }

    pub fn current(&self) -> Option<&Arc<TextureResource>> {
        match &self.slot {
            Slot::Ready(resource) => Some(resource),
            Slot::Loading => None,
        }
    }

    /// Resolve `source` into a decoded, not yet configured resource.
    ///
    /// Nothing here touches the render loop, so it is safe to run on any executor. A
    /// load that never finishes simply leaves its scene in the loading state.
    pub async fn resolve(source: TextureSource) -> Result<TextureResource, ResourceLoadError> {
        let label = source.label();
        match source {
            TextureSource::Default => Ok(TextureResource::builtin()),
            TextureSource::Bytes(bytes) => TextureResource::from_bytes(&bytes, &label),
            TextureSource::File(path) => {
                let bytes = load_file(&path).await?;
                TextureResource::from_bytes(&bytes, &label)
            }
            TextureSource::Url(url) => {
                let bytes = load_url(&url).await?;
                TextureResource::from_bytes(&bytes, &label)
            }
        }
    }

    /// Hand a finished load to this manager.
    ///
    /// A ticket from another generation is discarded without touching anything. A failed
    /// load installs the built-in texture so the scene never stays blank.
    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        result: Result<TextureResource, ResourceLoadError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            log::warn!(
                "Discarding texture {} from generation {:?}, scene is at {:?}",
                ticket.source.label(),
                ticket.generation,
                self.generation
            );
            return LoadOutcome::Stale;
        }
        match result {
            Ok(resource) => LoadOutcome::Ready(self.install(resource)),
            Err(e) => {
                log::warn!("Texture {} failed to load, using the built-in one: {}", ticket.source.label(), e);
                self.install(TextureResource::builtin());
                LoadOutcome::FellBack(e)
            }
        }
    }

    fn install(&mut self, mut resource: TextureResource) -> TextureId {
        if let Some(max_dimension) = self.max_dimension {
            resource.fit_within(max_dimension);
        }
        resource.configure();
        let id = resource.id();
        log::info!(
            "Texture {} ({}x{}) ready for generation {:?}",
            resource.label(),
            resource.image.width(),
            resource.image.height(),
            self.generation
        );
        self.slot = Slot::Ready(Arc::new(resource));
        id
    }

    pub fn release(&mut self) {
        self.slot = Slot::Loading;
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> Option<reqwest::Url> {
    let window = web_sys::window()?;
    let mut origin = window.location().origin().ok()?;
    origin = format!("{}/assets", origin);
    let base = reqwest::Url::parse(&format!("{}/", origin)).ok()?;
    base.join(file_name).ok()
}

async fn load_file(path: &std::path::Path) -> Result<Vec<u8>, ResourceLoadError> {
    #[cfg(target_arch = "wasm32")]
    {
        let url = format_url(&path.to_string_lossy()).ok_or_else(|| ResourceLoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no page origin"),
        })?;
        load_url(url.as_str()).await
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::fs::read(path).await.map_err(|source| ResourceLoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

async fn load_url(url: &str) -> Result<Vec<u8>, ResourceLoadError> {
    let fetch = |source| ResourceLoadError::Fetch {
        url: url.to_string(),
        source,
    };
    let response = reqwest::get(url).await.map_err(fetch)?;
    let response = response.error_for_status().map_err(fetch)?;
    let bytes = response.bytes().await.map_err(fetch)?;
    Ok(bytes.to_vec())
}
