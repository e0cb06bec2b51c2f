//! Off-screen render target for the deferred pipeline.
//!
//! A `GBuffer` owns one depth texture and an ordered list of color textures.
//! The geometry pass renders into all of them at once; the lighting pass
//! reads the color textures back with `textureLoad`.

use std::fmt;

pub const POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
pub const MATERIAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Uint;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Attachment order of [`GBuffer::deferred`].
pub const DEFERRED_FORMATS: [wgpu::TextureFormat; 3] =
    [POSITION_FORMAT, NORMAL_FORMAT, MATERIAL_FORMAT];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GBufferError {
    /// Nothing to render color into.
    NoColorAttachments,
    TooManyColorAttachments { count: usize, max: u32 },
    /// Width or height is zero.
    ZeroSize { width: u32, height: u32 },
    TooLarge { width: u32, height: u32, max: u32 },
    /// Combined color bytes per sample exceed the device limit.
    TooManyBytesPerSample { bytes: u32, max: u32 },
    /// Format cannot be a color render target.
    NotRenderable(wgpu::TextureFormat),
}

impl fmt::Display for GBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoColorAttachments => write!(f, "G-buffer has no color attachments"),
            Self::TooManyColorAttachments { count, max } => write!(
                f,
                "G-buffer has {count} color attachments, device allows {max}"
            ),
            Self::ZeroSize { width, height } => {
                write!(f, "G-buffer has zero size ({width}x{height})")
            }
            Self::TooLarge { width, height, max } => write!(
                f,
                "G-buffer size {width}x{height} exceeds the device maximum of {max}"
            ),
            Self::TooManyBytesPerSample { bytes, max } => write!(
                f,
                "G-buffer needs {bytes} color bytes per sample, device allows {max}"
            ),
            Self::NotRenderable(format) => {
                write!(f, "{format:?} cannot be used as a color attachment")
            }
        }
    }
}

impl std::error::Error for GBufferError {}

/// Color bytes per sample of an attachment list, following wgpu's rule:
/// each target starts at its component alignment.
pub fn color_bytes_per_sample(formats: &[wgpu::TextureFormat]) -> Result<u32, GBufferError> {
    let mut total = 0u32;
    for &format in formats {
        let (Some(cost), Some(align)) = (
            format.target_pixel_byte_cost(),
            format.target_component_alignment(),
        ) else {
            return Err(GBufferError::NotRenderable(format));
        };
        total = total.div_ceil(align) * align + cost;
    }
    Ok(total)
}

/// Completeness check for an attachment list of the given size.
pub fn verify_layout(
    formats: &[wgpu::TextureFormat],
    (width, height): (u32, u32),
    limits: &wgpu::Limits,
) -> Result<(), GBufferError> {
    if formats.is_empty() {
        return Err(GBufferError::NoColorAttachments);
    }
    if formats.len() > limits.max_color_attachments as usize {
        return Err(GBufferError::TooManyColorAttachments {
            count: formats.len(),
            max: limits.max_color_attachments,
        });
    }
    if width == 0 || height == 0 {
        return Err(GBufferError::ZeroSize { width, height });
    }
    let max = limits.max_texture_dimension_2d;
    if width > max || height > max {
        return Err(GBufferError::TooLarge { width, height, max });
    }

    let bytes = color_bytes_per_sample(formats)?;
    if bytes > limits.max_color_attachment_bytes_per_sample {
        return Err(GBufferError::TooManyBytesPerSample {
            bytes,
            max: limits.max_color_attachment_bytes_per_sample,
        });
    }
    Ok(())
}

/// One attachment: texture, full view and the format it was created with.
#[derive(Debug)]
pub struct GBufferTexture {
    pub format: wgpu::TextureFormat,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GBufferTexture {
    fn create(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
        (width, height): (u32, u32),
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            format,
            texture,
            view,
        }
    }
}

const COLOR_USAGE: wgpu::TextureUsages =
    wgpu::TextureUsages::RENDER_ATTACHMENT.union(wgpu::TextureUsages::TEXTURE_BINDING);

/// Depth texture plus ordered color textures of one size.
#[derive(Debug)]
pub struct GBuffer {
    size: (u32, u32),
    depth: GBufferTexture,
    colors: Vec<GBufferTexture>,
    generation: u64,
}

impl GBuffer {
    /// Depth attachment only; add color targets with
    /// [`add_color_texture`](Self::add_color_texture).
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = (width, height);
        Self {
            size,
            depth: Self::create_depth(device, size),
            colors: Vec::new(),
            generation: 0,
        }
    }

    /// Position, normal and material targets, in that order.
    pub fn deferred(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let mut gbuffer = Self::new(device, width, height);
        for format in DEFERRED_FORMATS {
            gbuffer.add_color_texture(device, format);
        }
        gbuffer
    }

    /// Appends a color attachment and returns its index.
    pub fn add_color_texture(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) -> usize {
        let index = self.colors.len();
        let label = format!("penumbra gbuffer color {index}");
        self.colors
            .push(GBufferTexture::create(device, &label, format, COLOR_USAGE, self.size));
        self.generation += 1;
        index
    }

    pub fn verify(&self, limits: &wgpu::Limits) -> Result<(), GBufferError> {
        verify_layout(&self.formats(), self.size, limits)
    }

    /// Recreates every texture at the new size with its recorded format.
    ///
    /// Returns `false` (and keeps the textures) when the size is unchanged or
    /// has a zero dimension, as while the window is minimized.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let size = (width, height);
        if size == self.size || width == 0 || height == 0 {
            return false;
        }

        self.size = size;
        self.depth = Self::create_depth(device, size);
        for (index, color) in self.colors.iter_mut().enumerate() {
            let label = format!("penumbra gbuffer color {index}");
            *color = GBufferTexture::create(device, &label, color.format, COLOR_USAGE, size);
        }
        self.generation += 1;
        log::debug!("gbuffer resized to {width}x{height}");
        true
    }

    /// Attachments for a pass that writes every color target, cleared to zero.
    ///
    /// Zero in the material target is the background sentinel.
    pub fn color_attachments(&self) -> Vec<Option<wgpu::RenderPassColorAttachment<'_>>> {
        self.colors
            .iter()
            .map(|c| {
                Some(wgpu::RenderPassColorAttachment {
                    view: &c.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })
            })
            .collect()
    }

    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }

    pub fn textures(&self) -> &[GBufferTexture] {
        &self.colors
    }

    pub fn formats(&self) -> Vec<wgpu::TextureFormat> {
        self.colors.iter().map(|c| c.format).collect()
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Bumped whenever a texture is (re)created; bind groups built against
    /// an older generation are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn create_depth(device: &wgpu::Device, size: (u32, u32)) -> GBufferTexture {
        GBufferTexture::create(
            device,
            "penumbra gbuffer depth",
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            size,
        )
    }
}
