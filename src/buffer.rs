use std::ptr;

use gl::types::*;

use crate::context::{GlContext, GlMarker};
use crate::error::report;
use crate::{has_handle, transmutable_u32};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessFrequency {
    /// Modified once, used a few times
    Stream,
    /// Modified once, used many times
    Static,
    /// Modified many times, used many times
    #[default]
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessNature {
    /// Modified by app, used in draw and spec commands
    #[default]
    Draw,
    /// Modified by reading from GL, used to return data to app
    Read,
    /// Modified by reading from GL, used in draw and spec commands
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataUsage {
    frequency: AccessFrequency,
    nature: AccessNature,
}

use AccessFrequency as Freq;
use AccessNature as Nat;

impl DataUsage {
    /// Default usage of the buffer object family.
    pub const DYNAMIC_DRAW: Self = Self::new(Freq::Dynamic, Nat::Draw);
    pub const STATIC_DRAW: Self = Self::new(Freq::Static, Nat::Draw);

    pub const fn new(frequency: Freq, nature: Nat) -> Self {
        Self { frequency, nature }
    }

    pub const fn to_u32(self) -> u32 {
        match (self.frequency, self.nature) {
            (Freq::Stream, Nat::Draw) => gl::STREAM_DRAW,
            (Freq::Static, Nat::Draw) => gl::STATIC_DRAW,
            (Freq::Dynamic, Nat::Draw) => gl::DYNAMIC_DRAW,

            (Freq::Stream, Nat::Copy) => gl::STREAM_COPY,
            (Freq::Static, Nat::Copy) => gl::STATIC_COPY,
            (Freq::Dynamic, Nat::Copy) => gl::DYNAMIC_COPY,

            (Freq::Stream, Nat::Read) => gl::STREAM_READ,
            (Freq::Static, Nat::Read) => gl::STATIC_READ,
            (Freq::Dynamic, Nat::Read) => gl::DYNAMIC_READ,
        }
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// Vertex attributes
    ArrayBuffer = gl::ARRAY_BUFFER,
    /// Atomic counter storage
    AtomicCounter = gl::ATOMIC_COUNTER_BUFFER,
    /// Buffer copy source
    CopyRead = gl::COPY_READ_BUFFER,
    /// Buffer copy destination
    CopyWrite = gl::COPY_WRITE_BUFFER,
    /// Indirect compute dispatch commands
    DispatchIndirect = gl::DISPATCH_INDIRECT_BUFFER,
    /// Indirect command arguments
    DrawIndirect = gl::DRAW_INDIRECT_BUFFER,
    /// Vertex array indices
    ElementArray = gl::ELEMENT_ARRAY_BUFFER,
    /// Pixel read target
    PixelPack = gl::PIXEL_PACK_BUFFER,
    /// Texture data source
    PixelUnpack = gl::PIXEL_UNPACK_BUFFER,
    /// Query result buffer
    QueryBuffer = gl::QUERY_BUFFER,
    /// Read-write storage for shaders
    ShaderStorage = gl::SHADER_STORAGE_BUFFER,
    /// Texture data buffer
    Texture = gl::TEXTURE_BUFFER,
    /// Transform feedback buffer
    TransformFeedback = gl::TRANSFORM_FEEDBACK_BUFFER,
    /// Uniform block storage
    Uniform = gl::UNIFORM_BUFFER,
}
transmutable_u32!(BufferTarget);

impl BufferTarget {
    pub const fn can_bind_base(self) -> bool {
        matches!(
            self,
            Self::ShaderStorage | Self::Uniform | Self::AtomicCounter | Self::TransformFeedback
        )
    }
}

/// Generic buffer object with mutable, fully reallocatable storage.
///
/// There is deliberately no sub-range update at this layer: `reload` replaces
/// the whole store, size included.
pub struct BufferObject {
    handle: GLuint,
    target: BufferTarget,
    byte_size: GLsizeiptr,
    usage: DataUsage,
    _marker: GlMarker,
}
has_handle!(BufferObject);

impl BufferObject {
    /// Allocate `byte_size` bytes, initialized from `data` when given.
    pub fn new(
        ctx: &GlContext,
        target: BufferTarget,
        data: Option<&[u8]>,
        byte_size: usize,
        usage: DataUsage,
    ) -> Self {
        let mut handle = 0;
        let data_ptr = data.map_or(ptr::null(), |d| d.as_ptr().cast());
        unsafe {
            gl::CreateBuffers(1, &mut handle);
            gl::NamedBufferData(handle, byte_size as GLsizeiptr, data_ptr, usage.to_u32());
        }
        Self {
            handle,
            target,
            byte_size: byte_size as GLsizeiptr,
            usage,
            _marker: ctx.marker(),
        }
    }

    /// Allocate from a typed slice, sized to hold exactly its bytes.
    pub fn from_slice<T: Copy>(
        ctx: &GlContext,
        target: BufferTarget,
        data: &[T],
        usage: DataUsage,
    ) -> Self {
        let mut handle = 0;
        let byte_size = size_of_val(data) as GLsizeiptr;
        unsafe {
            gl::CreateBuffers(1, &mut handle);
            gl::NamedBufferData(handle, byte_size, data.as_ptr().cast(), usage.to_u32());
        }
        Self {
            handle,
            target,
            byte_size,
            usage,
            _marker: ctx.marker(),
        }
    }

    /// Replace the entire store with new contents and size.
    ///
    /// Lenient path: a GL failure is logged and the buffer is left in a
    /// best-effort state.
    pub fn reload(&mut self, data: Option<&[u8]>, byte_size: usize) {
        self.byte_size = byte_size as GLsizeiptr;
        let data_ptr = data.map_or(ptr::null(), |d| d.as_ptr().cast());
        unsafe {
            gl::NamedBufferData(self.handle, self.byte_size, data_ptr, self.usage.to_u32());
        }
        report("BufferObject::reload");
    }

    /// Typed-slice variant of [`reload`](Self::reload).
    pub fn reload_slice<T: Copy>(&mut self, data: &[T]) {
        self.byte_size = size_of_val(data) as GLsizeiptr;
        unsafe {
            gl::NamedBufferData(
                self.handle,
                self.byte_size,
                data.as_ptr().cast(),
                self.usage.to_u32(),
            );
        }
        report("BufferObject::reload_slice");
    }

    /// Bind to the target's current global slot.
    pub fn bind(&self) {
        unsafe { gl::BindBuffer(self.target.to_u32(), self.handle) };
    }

    /// Bind to an indexed slot of the target, for targets that have them.
    pub fn bind_index(&self, index: GLuint) {
        assert!(self.target.can_bind_base());
        unsafe { gl::BindBufferBase(self.target.to_u32(), index, self.handle) };
    }

    /// Copy `src`'s full contents into `dst`. Refuses (with a logged error)
    /// when the destination is smaller.
    pub fn copy(src: &Self, dst: &Self) {
        if src.byte_size > dst.byte_size {
            log::error!("BufferObject::copy: target buffer smaller than source");
            return;
        }
        unsafe {
            gl::CopyNamedBufferSubData(src.handle, dst.handle, 0, 0, src.byte_size);
        }
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn byte_size(&self) -> usize {
        self.byte_size as usize
    }
}

impl Drop for BufferObject {
    fn drop(&mut self) {
        unsafe { gl::DeleteBuffers(1, &self.handle) };
    }
}

/// Convenience wrapper fixing the target to `GL_SHADER_STORAGE_BUFFER`.
pub struct ShaderStorageBufferObject(BufferObject);

impl ShaderStorageBufferObject {
    pub fn new(ctx: &GlContext, data: Option<&[u8]>, byte_size: usize) -> Self {
        Self(BufferObject::new(
            ctx,
            BufferTarget::ShaderStorage,
            data,
            byte_size,
            DataUsage::DYNAMIC_DRAW,
        ))
    }

    pub fn from_slice<T: Copy>(ctx: &GlContext, data: &[T]) -> Self {
        Self(BufferObject::from_slice(
            ctx,
            BufferTarget::ShaderStorage,
            data,
            DataUsage::DYNAMIC_DRAW,
        ))
    }

    pub fn reload(&mut self, data: Option<&[u8]>, byte_size: usize) {
        self.0.reload(data, byte_size);
    }

    pub fn bind(&self) {
        self.0.bind();
    }

    pub fn bind_index(&self, index: GLuint) {
        self.0.bind_index(index);
    }

    pub fn byte_size(&self) -> usize {
        self.0.byte_size()
    }

    pub fn as_buffer(&self) -> &BufferObject {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn usage_matrix_maps_to_gl_enums() {
        assert_eq!(DataUsage::DYNAMIC_DRAW.to_u32(), gl::DYNAMIC_DRAW);
        assert_eq!(DataUsage::STATIC_DRAW.to_u32(), gl::STATIC_DRAW);
        assert_eq!(
            DataUsage::new(Freq::Stream, Nat::Read).to_u32(),
            gl::STREAM_READ
        );
        assert_eq!(
            DataUsage::new(Freq::Static, Nat::Copy).to_u32(),
            gl::STATIC_COPY
        );
    }

    #[test]
    fn default_usage_is_dynamic_draw() {
        assert_eq!(DataUsage::default(), DataUsage::DYNAMIC_DRAW);
    }

    #[test]
    fn only_indexed_targets_can_bind_base() {
        assert!(BufferTarget::ShaderStorage.can_bind_base());
        assert!(BufferTarget::Uniform.can_bind_base());
        assert!(BufferTarget::AtomicCounter.can_bind_base());
        assert!(BufferTarget::TransformFeedback.can_bind_base());
        assert!(!BufferTarget::ArrayBuffer.can_bind_base());
        assert!(!BufferTarget::ElementArray.can_bind_base());
    }
}
