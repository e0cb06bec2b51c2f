/// Color bytes per sample the G-buffer layout needs (two `Rgba32Float`
/// targets plus one `R8Uint` target, rounded up by alignment rules).
///
/// The wgpu default of 32 is one byte short, so devices are requested with
/// this raised limit.
pub const DEFERRED_BYTES_PER_SAMPLE: u32 = 64;

/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// Device creation fails early with a readable error when the adapter
    /// cannot satisfy `max_color_attachment_bytes_per_sample`.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Limits for the deferred pipeline: wgpu defaults with room for the
    /// G-buffer's color targets.
    pub fn deferred_limits() -> wgpu::Limits {
        wgpu::Limits {
            max_color_attachment_bytes_per_sample: DEFERRED_BYTES_PER_SAMPLE,
            ..wgpu::Limits::default()
        }
    }

    pub fn with_present_mode(mut self, present_mode: wgpu::PresentMode) -> Self {
        self.present_mode = present_mode;
        self
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: Self::deferred_limits(),
            desired_maximum_frame_latency: 2,
        }
    }
}
