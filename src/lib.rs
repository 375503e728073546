//! RAII wrappers over OpenGL 4.5 direct-state-access objects.
//!
//! Every type in this crate owns exactly one GL handle, acquires it at
//! construction and releases it on drop. Construction requires a [`GlContext`]
//! token witnessing that a context is current on the calling thread; the
//! wrappers themselves are neither `Send` nor `Sync`, so a handle can never
//! outlive its thread affinity.
//!
//! Shader program and vertex array construction report driver failures as
//! [`ObjectError`] values. Texture and buffer reload paths instead log to the
//! diagnostic stream and leave the object in a best-effort state; see the
//! per-method docs.

pub mod bindless;
mod buffer;
mod context;
mod error;
pub mod info;
mod program;
mod texture;
mod vertex;

#[cfg(feature = "binary")]
pub mod glfw;

pub use buffer::{
    AccessFrequency, AccessNature, BufferObject, BufferTarget, DataUsage,
    ShaderStorageBufferObject,
};
pub use context::GlContext;
pub use error::{GlError, ObjectError};
pub use program::{ShaderProgram, ShaderStage};
pub use texture::{
    Texture, Texture2D, Texture2DArray, Texture3D, TextureLayout, clamped_levels,
    max_mipmap_levels,
};
pub use vertex::{
    Attribute, IndexType, Primitive, VertexArrayObject, VertexLayout, attribute_byte_size,
    compute_byte_size,
};

pub use gl;

#[macro_export]
macro_rules! transmutable_u32 {
    ($name: ident) => {
        impl $name {
            pub const fn to_u32(self) -> u32 {
                unsafe { std::mem::transmute(self) }
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.to_u32()
            }
        }
    };
}

#[macro_export]
macro_rules! has_handle {
    ($name: ident) => {
        impl $name {
            pub fn as_handle(&self) -> GLuint {
                self.handle
            }
        }
    };
}
