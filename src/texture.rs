use gl::types::*;

use crate::bindless;
use crate::context::{GlContext, GlMarker};
use crate::error::report;

/// Storage parameters for a texture: sized internal format, dimensions,
/// pixel transfer format/type, requested mip level count and optional
/// per-object GL parameters. Plain value type, freely cloneable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureLayout {
    pub internal_format: GLenum,
    pub width: GLsizei,
    pub height: GLsizei,
    pub depth: GLsizei,
    pub format: GLenum,
    pub type_: GLenum,
    pub levels: GLsizei,
    pub int_parameters: Vec<(GLenum, GLint)>,
    pub float_parameters: Vec<(GLenum, GLfloat)>,
}

impl TextureLayout {
    pub fn new(
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
        format: GLenum,
        type_: GLenum,
        levels: GLsizei,
    ) -> Self {
        Self {
            internal_format,
            width,
            height,
            depth,
            format,
            type_,
            levels,
            int_parameters: Vec::new(),
            float_parameters: Vec::new(),
        }
    }

    pub fn with_int_parameters(mut self, parameters: Vec<(GLenum, GLint)>) -> Self {
        self.int_parameters = parameters;
        self
    }

    pub fn with_float_parameters(mut self, parameters: Vec<(GLenum, GLfloat)>) -> Self {
        self.float_parameters = parameters;
        self
    }
}

/// Largest usable mip chain length for the given base dimensions.
pub fn max_mipmap_levels(width: GLsizei, height: GLsizei) -> GLsizei {
    let largest = width.max(height).max(1);
    1 + (largest as f64).log2().floor() as GLsizei
}

/// Requested level count clamped to what the dimensions support.
pub fn clamped_levels(requested: GLsizei, width: GLsizei, height: GLsizei) -> GLsizei {
    requested.min(max_mipmap_levels(width, height)).max(1)
}

/// Capability set shared by the texture shapes (2D, 2D array).
pub trait Texture {
    /// Bind to the texture's target slot.
    fn bind_texture(&self);

    /// Regenerate the mip chain from level zero.
    fn update_mipmaps(&self);

    fn texture_layout(&self) -> TextureLayout;

    /// Sized internal format the storage was allocated with.
    fn internal_format(&self) -> GLenum;

    /// Pixel transfer format used for uploads.
    fn format(&self) -> GLenum;

    /// Pixel transfer component type used for uploads.
    fn type_(&self) -> GLenum;

    /// GL texture name. Handle with care.
    fn name(&self) -> GLuint;

    /// 64-bit bindless handle, zero when the extension is unavailable.
    fn texture_handle(&self) -> GLuint64;

    /// Make the bindless handle resident. The texture must stay alive for as
    /// long as any shader may dereference the handle; nothing checks this.
    fn make_resident(&self) {
        bindless::make_resident(self.texture_handle());
    }

    fn make_non_resident(&self) {
        bindless::make_non_resident(self.texture_handle());
    }
}

/// 2D texture with immutable storage.
///
/// Construction and reload are lenient paths: GL failures are logged together
/// with the texture's id and the object is left in a best-effort state.
pub struct Texture2D {
    id: String,
    name: GLuint,
    texture_handle: GLuint64,
    internal_format: GLenum,
    format: GLenum,
    type_: GLenum,
    levels: GLsizei,
    width: GLsizei,
    height: GLsizei,
    _marker: GlMarker,
}

impl Texture2D {
    /// Allocate storage per `layout`, optionally upload `data` into level
    /// zero and generate the mip chain. The requested level count is clamped
    /// to what the dimensions support.
    pub fn new(
        ctx: &GlContext,
        id: impl Into<String>,
        layout: &TextureLayout,
        data: Option<&[u8]>,
        generate_mipmap: bool,
    ) -> Self {
        let id = id.into();
        let levels = clamped_levels(layout.levels, layout.width, layout.height);

        let mut name = 0;
        unsafe { gl::CreateTextures(gl::TEXTURE_2D, 1, &mut name) };
        apply_parameters(name, layout);
        unsafe {
            gl::TextureStorage2D(
                name,
                levels,
                layout.internal_format,
                layout.width,
                layout.height,
            );
        }
        if let Some(data) = data {
            unsafe {
                gl::TextureSubImage2D(
                    name,
                    0,
                    0,
                    0,
                    layout.width,
                    layout.height,
                    layout.format,
                    layout.type_,
                    data.as_ptr().cast(),
                );
            }
        }
        if generate_mipmap {
            unsafe { gl::GenerateTextureMipmap(name) };
        }
        let texture_handle = bindless::texture_handle(name).unwrap_or(0);

        report(&format!("Texture2D::new - texture id: {id}"));

        Self {
            id,
            name,
            texture_handle,
            internal_format: layout.internal_format,
            format: layout.format,
            type_: layout.type_,
            levels,
            width: layout.width,
            height: layout.height,
            _marker: ctx.marker(),
        }
    }

    /// Replace the storage with a new size and, optionally, a new format.
    ///
    /// Only valid once the object owns allocated storage, i.e. after
    /// construction. The old texture name is deleted and a fresh one
    /// allocated; any bindless handle derived from the old name is dead
    /// afterwards.
    pub fn reload(&mut self, layout: &TextureLayout, data: Option<&[u8]>, generate_mipmap: bool) {
        unsafe { gl::DeleteTextures(1, &self.name) };

        let levels = clamped_levels(layout.levels, layout.width, layout.height);
        let mut name = 0;
        unsafe { gl::CreateTextures(gl::TEXTURE_2D, 1, &mut name) };
        apply_parameters(name, layout);
        unsafe {
            gl::TextureStorage2D(
                name,
                levels,
                layout.internal_format,
                layout.width,
                layout.height,
            );
        }
        if let Some(data) = data {
            unsafe {
                gl::TextureSubImage2D(
                    name,
                    0,
                    0,
                    0,
                    layout.width,
                    layout.height,
                    layout.format,
                    layout.type_,
                    data.as_ptr().cast(),
                );
            }
        }
        if generate_mipmap {
            unsafe { gl::GenerateTextureMipmap(name) };
        }

        self.name = name;
        self.texture_handle = bindless::texture_handle(name).unwrap_or(0);
        self.internal_format = layout.internal_format;
        self.format = layout.format;
        self.type_ = layout.type_;
        self.levels = levels;
        self.width = layout.width;
        self.height = layout.height;

        report(&format!("Texture2D::reload - texture id: {}", self.id));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> GLsizei {
        self.width
    }

    pub fn height(&self) -> GLsizei {
        self.height
    }
}

impl Texture for Texture2D {
    fn bind_texture(&self) {
        unsafe { gl::BindTexture(gl::TEXTURE_2D, self.name) };
    }

    fn update_mipmaps(&self) {
        unsafe { gl::GenerateTextureMipmap(self.name) };
    }

    fn texture_layout(&self) -> TextureLayout {
        TextureLayout::new(
            self.internal_format,
            self.width,
            self.height,
            1,
            self.format,
            self.type_,
            self.levels,
        )
    }

    fn internal_format(&self) -> GLenum {
        self.internal_format
    }

    fn format(&self) -> GLenum {
        self.format
    }

    fn type_(&self) -> GLenum {
        self.type_
    }

    fn name(&self) -> GLuint {
        self.name
    }

    fn texture_handle(&self) -> GLuint64 {
        self.texture_handle
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        unsafe { gl::DeleteTextures(1, &self.name) };
    }
}

/// Array of 2D layers with immutable storage; `layout.depth` is the layer
/// count. Same lenient error policy as [`Texture2D`].
pub struct Texture2DArray {
    id: String,
    name: GLuint,
    texture_handle: GLuint64,
    internal_format: GLenum,
    format: GLenum,
    type_: GLenum,
    levels: GLsizei,
    width: GLsizei,
    height: GLsizei,
    layers: GLsizei,
    _marker: GlMarker,
}

impl Texture2DArray {
    pub fn new(
        ctx: &GlContext,
        id: impl Into<String>,
        layout: &TextureLayout,
        data: Option<&[u8]>,
        generate_mipmap: bool,
    ) -> Self {
        let id = id.into();
        let levels = clamped_levels(layout.levels, layout.width, layout.height);

        let mut name = 0;
        unsafe { gl::CreateTextures(gl::TEXTURE_2D_ARRAY, 1, &mut name) };
        apply_parameters(name, layout);
        unsafe {
            gl::TextureStorage3D(
                name,
                levels,
                layout.internal_format,
                layout.width,
                layout.height,
                layout.depth,
            );
        }
        if let Some(data) = data {
            unsafe {
                gl::TextureSubImage3D(
                    name,
                    0,
                    0,
                    0,
                    0,
                    layout.width,
                    layout.height,
                    layout.depth,
                    layout.format,
                    layout.type_,
                    data.as_ptr().cast(),
                );
            }
        }
        if generate_mipmap {
            unsafe { gl::GenerateTextureMipmap(name) };
        }
        let texture_handle = bindless::texture_handle(name).unwrap_or(0);

        report(&format!("Texture2DArray::new - texture id: {id}"));

        Self {
            id,
            name,
            texture_handle,
            internal_format: layout.internal_format,
            format: layout.format,
            type_: layout.type_,
            levels,
            width: layout.width,
            height: layout.height,
            layers: layout.depth,
            _marker: ctx.marker(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> GLsizei {
        self.width
    }

    pub fn height(&self) -> GLsizei {
        self.height
    }

    pub fn layers(&self) -> GLsizei {
        self.layers
    }
}

impl Texture for Texture2DArray {
    fn bind_texture(&self) {
        unsafe { gl::BindTexture(gl::TEXTURE_2D_ARRAY, self.name) };
    }

    fn update_mipmaps(&self) {
        unsafe { gl::GenerateTextureMipmap(self.name) };
    }

    fn texture_layout(&self) -> TextureLayout {
        TextureLayout::new(
            self.internal_format,
            self.width,
            self.height,
            self.layers,
            self.format,
            self.type_,
            self.levels,
        )
    }

    fn internal_format(&self) -> GLenum {
        self.internal_format
    }

    fn format(&self) -> GLenum {
        self.format
    }

    fn type_(&self) -> GLenum {
        self.type_
    }

    fn name(&self) -> GLuint {
        self.name
    }

    fn texture_handle(&self) -> GLuint64 {
        self.texture_handle
    }
}

impl Drop for Texture2DArray {
    fn drop(&mut self) {
        unsafe { gl::DeleteTextures(1, &self.name) };
    }
}

/// Volume texture with immutable single-level storage; `layout.depth` is the
/// slice count. Same lenient error policy as [`Texture2D`].
pub struct Texture3D {
    id: String,
    name: GLuint,
    texture_handle: GLuint64,
    internal_format: GLenum,
    format: GLenum,
    type_: GLenum,
    width: GLsizei,
    height: GLsizei,
    depth: GLsizei,
    _marker: GlMarker,
}

impl Texture3D {
    pub fn new(
        ctx: &GlContext,
        id: impl Into<String>,
        layout: &TextureLayout,
        data: Option<&[u8]>,
    ) -> Self {
        let id = id.into();
        let name = create_storage_3d(layout, data);
        let texture_handle = bindless::texture_handle(name).unwrap_or(0);

        report(&format!("Texture3D::new - texture id: {id}"));

        Self {
            id,
            name,
            texture_handle,
            internal_format: layout.internal_format,
            format: layout.format,
            type_: layout.type_,
            width: layout.width,
            height: layout.height,
            depth: layout.depth,
            _marker: ctx.marker(),
        }
    }

    /// Replace the storage with a new size and, optionally, a new format.
    ///
    /// The old texture name is deleted and a fresh one allocated; any
    /// bindless handle derived from the old name is dead afterwards.
    pub fn reload(&mut self, layout: &TextureLayout, data: Option<&[u8]>) {
        unsafe { gl::DeleteTextures(1, &self.name) };

        self.name = create_storage_3d(layout, data);
        self.texture_handle = bindless::texture_handle(self.name).unwrap_or(0);
        self.internal_format = layout.internal_format;
        self.format = layout.format;
        self.type_ = layout.type_;
        self.width = layout.width;
        self.height = layout.height;
        self.depth = layout.depth;

        report(&format!("Texture3D::reload - texture id: {}", self.id));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> GLsizei {
        self.width
    }

    pub fn height(&self) -> GLsizei {
        self.height
    }

    pub fn depth(&self) -> GLsizei {
        self.depth
    }
}

fn create_storage_3d(layout: &TextureLayout, data: Option<&[u8]>) -> GLuint {
    let mut name = 0;
    unsafe { gl::CreateTextures(gl::TEXTURE_3D, 1, &mut name) };
    apply_parameters(name, layout);
    unsafe {
        gl::TextureStorage3D(
            name,
            1,
            layout.internal_format,
            layout.width,
            layout.height,
            layout.depth,
        );
    }
    if let Some(data) = data {
        unsafe {
            gl::TextureSubImage3D(
                name,
                0,
                0,
                0,
                0,
                layout.width,
                layout.height,
                layout.depth,
                layout.format,
                layout.type_,
                data.as_ptr().cast(),
            );
        }
    }
    name
}

impl Texture for Texture3D {
    fn bind_texture(&self) {
        unsafe { gl::BindTexture(gl::TEXTURE_3D, self.name) };
    }

    fn update_mipmaps(&self) {
        unsafe { gl::GenerateTextureMipmap(self.name) };
    }

    fn texture_layout(&self) -> TextureLayout {
        TextureLayout::new(
            self.internal_format,
            self.width,
            self.height,
            self.depth,
            self.format,
            self.type_,
            1,
        )
    }

    fn internal_format(&self) -> GLenum {
        self.internal_format
    }

    fn format(&self) -> GLenum {
        self.format
    }

    fn type_(&self) -> GLenum {
        self.type_
    }

    fn name(&self) -> GLuint {
        self.name
    }

    fn texture_handle(&self) -> GLuint64 {
        self.texture_handle
    }
}

impl Drop for Texture3D {
    fn drop(&mut self) {
        unsafe { gl::DeleteTextures(1, &self.name) };
    }
}

fn apply_parameters(name: GLuint, layout: &TextureLayout) {
    for &(pname, value) in &layout.int_parameters {
        unsafe { gl::TextureParameteri(name, pname, value) };
    }
    for &(pname, value) in &layout.float_parameters {
        unsafe { gl::TextureParameterf(name, pname, value) };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn full_chain_for_square_power_of_two() {
        assert_eq!(max_mipmap_levels(256, 256), 9);
        assert_eq!(max_mipmap_levels(1, 1), 1);
        assert_eq!(max_mipmap_levels(1024, 512), 11);
    }

    #[test]
    fn requested_levels_clamp_to_dimensions() {
        // 256x256 supports 9 levels; asking for 10 yields 9.
        assert_eq!(clamped_levels(10, 256, 256), 9);
        assert_eq!(clamped_levels(4, 256, 256), 4);
        assert_eq!(clamped_levels(4, 1, 1), 1);
        assert_eq!(clamped_levels(20, 1024, 512), 11);
    }

    #[test]
    fn non_power_of_two_rounds_down() {
        assert_eq!(max_mipmap_levels(300, 200), 9);
        assert_eq!(clamped_levels(12, 300, 200), 9);
    }

    #[test]
    fn format_getters_mirror_the_stored_layout() {
        // Handle 0 is never a live texture, so skip the drop glue.
        let ctx = unsafe { GlContext::assume_current() };
        let tex = std::mem::ManuallyDrop::new(Texture3D {
            id: "volume".into(),
            name: 0,
            texture_handle: 0,
            internal_format: gl::R32F,
            format: gl::RED,
            type_: gl::FLOAT,
            width: 32,
            height: 32,
            depth: 16,
            _marker: ctx.marker(),
        });
        assert_eq!(tex.internal_format(), gl::R32F);
        assert_eq!(tex.format(), gl::RED);
        assert_eq!(tex.type_(), gl::FLOAT);
        assert_eq!(tex.depth(), 16);

        let layout = tex.texture_layout();
        assert_eq!(layout.depth, 16);
        assert_eq!(layout.levels, 1);
    }

    #[test]
    fn layouts_compare_by_value() {
        let a = TextureLayout::new(gl::RGBA8, 64, 64, 1, gl::RGBA, gl::UNSIGNED_BYTE, 1);
        let b = TextureLayout::new(gl::RGBA8, 64, 64, 1, gl::RGBA, gl::UNSIGNED_BYTE, 1);
        assert_eq!(a, b);

        let c = TextureLayout::new(gl::RGBA8, 64, 32, 1, gl::RGBA, gl::UNSIGNED_BYTE, 1);
        assert_ne!(a, c);
    }
}
