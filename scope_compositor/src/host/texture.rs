/// Texture trait, texture descriptor, and texture info
///
/// Textures are host GPU resources. The compositor only ever holds them
/// through `Arc<dyn Texture>`: live targets are borrowed for one frame,
/// backups and scratch copies are created through the `GraphicsDevice`.

use std::fmt;

/// Pixel format of a texture or render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    R10G10B10A2_UNORM,
    R11G11B10_FLOAT,
    R16G16_FLOAT,
    R16G16B16A16_FLOAT,
    R32_FLOAT,
    R8_UNORM,
    D24_UNORM_S8_UINT,
    D32_FLOAT_S8X24_UINT,
}

impl TextureFormat {
    /// Whether this format carries a depth and a stencil channel
    pub fn is_depth_stencil(&self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_FLOAT_S8X24_UINT)
    }
}

/// Texture usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders (read-only backups)
    Sampled,
    /// Texture can be used as render target
    RenderTarget,
    /// Texture can be used for both
    SampledAndRenderTarget,
    /// Texture can be used as depth/stencil attachment
    DepthStencil,
}

/// Opaque identity of a texture, stable for the texture's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tex#{}", self.0)
    }
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    /// Debug name
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage
    pub usage: TextureUsage,
}

impl TextureDesc {
    /// Descriptor matching an existing texture, with a new name and usage
    pub fn matching(info: &TextureInfo, name: impl Into<String>, usage: TextureUsage) -> Self {
        Self {
            name: name.into(),
            width: info.width,
            height: info.height,
            format: info.format,
            usage,
        }
    }
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage
    pub usage: TextureUsage,
}

impl TextureInfo {
    /// (width, height)
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether two textures can be copied into each other
    pub fn copy_compatible(&self, other: &TextureInfo) -> bool {
        self.extent() == other.extent() && self.format == other.format
    }
}

// ===== TEXTURE TRAIT =====

/// Texture resource trait
///
/// Implemented by the host's texture wrapper. The resource is released when
/// the last `Arc` is dropped.
pub trait Texture: Send + Sync + fmt::Debug {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;

    /// Identity of the underlying resource
    fn id(&self) -> TextureId;
}
