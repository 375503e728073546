use std::ptr;

use gl::types::*;

use crate::context::{GlContext, GlMarker};
use crate::error::{ObjectError, check};
use crate::{has_handle, transmutable_u32};

/// One vertex attribute inside a buffer: component count, stored component
/// type, byte offset relative to the vertex, and the type the shader input
/// consumes it as (float, integer or double path).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// Components per vertex: 1, 2, 3 or 4.
    pub size: GLint,
    /// Stored component type, e.g. `gl::FLOAT` or `gl::UNSIGNED_SHORT`.
    pub type_: GLenum,
    /// Whether integer data is normalized on the float path.
    pub normalized: bool,
    /// Byte offset of the first component relative to the vertex start.
    pub offset: GLuint,
    /// Shader-side input type: `gl::FLOAT`, `gl::INT`, `gl::UNSIGNED_INT`
    /// or `gl::DOUBLE`. Selects the attribute registration call.
    pub shader_input_type: GLenum,
}

impl Attribute {
    /// Attribute consumed through the float path.
    pub fn new(size: GLint, type_: GLenum, normalized: bool, offset: GLuint) -> Self {
        Self {
            size,
            type_,
            normalized,
            offset,
            shader_input_type: gl::FLOAT,
        }
    }

    pub fn with_shader_input_type(mut self, shader_input_type: GLenum) -> Self {
        self.shader_input_type = shader_input_type;
        self
    }
}

/// Describes the attributes sourced from one vertex buffer.
///
/// `stride` is the actual per-vertex byte stride; DSA does not accept 0 for
/// tightly packed data. Equality compares stride and attributes only —
/// which buffer the layout points at is not part of the layout.
#[derive(Debug, Clone, Default)]
pub struct VertexLayout {
    pub stride: GLsizei,
    pub buffer_start_offset: GLintptr,
    pub buffer_name: GLuint,
    pub attributes: Vec<Attribute>,
}

impl VertexLayout {
    pub fn new(stride: GLsizei, attributes: Vec<Attribute>) -> Self {
        Self {
            stride,
            buffer_start_offset: 0,
            buffer_name: 0,
            attributes,
        }
    }

    /// Layout sourcing its attributes from `buffer_name` starting at
    /// `buffer_start_offset`. No buffer is created here.
    pub fn for_buffer(
        buffer_name: GLuint,
        stride: GLsizei,
        buffer_start_offset: GLintptr,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            stride,
            buffer_start_offset,
            buffer_name,
            attributes,
        }
    }
}

impl PartialEq for VertexLayout {
    fn eq(&self, other: &Self) -> bool {
        self.stride == other.stride && self.attributes == other.attributes
    }
}

/// Byte size of one component of the given stored type, 0 for types the
/// vertex fetch stage does not support.
pub const fn compute_byte_size(value_type: GLenum) -> usize {
    match value_type {
        gl::BYTE | gl::UNSIGNED_BYTE => 1,
        gl::SHORT | gl::UNSIGNED_SHORT | gl::HALF_FLOAT => 2,
        gl::INT | gl::UNSIGNED_INT | gl::FIXED | gl::FLOAT => 4,
        gl::INT_2_10_10_10_REV | gl::UNSIGNED_INT_2_10_10_10_REV => 4,
        gl::UNSIGNED_INT_10F_11F_11F_REV => 4,
        gl::DOUBLE => 8,
        _ => 0,
    }
}

pub const fn attribute_byte_size(attribute: &Attribute) -> usize {
    compute_byte_size(attribute.type_) * attribute.size as usize
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Primitive {
    Points = gl::POINTS,
    Lines = gl::LINES,
    LineStrip = gl::LINE_STRIP,
    #[default]
    Triangles = gl::TRIANGLES,
    TriangleStrip = gl::TRIANGLE_STRIP,
    TriangleFan = gl::TRIANGLE_FAN,
}
transmutable_u32!(Primitive);

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    U8 = gl::UNSIGNED_BYTE,
    U16 = gl::UNSIGNED_SHORT,
    #[default]
    U32 = gl::UNSIGNED_INT,
}
transmutable_u32!(IndexType);

/// Which attribute registration call a shader input type routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttribKind {
    Float,
    Integer,
    Double,
}

impl AttribKind {
    fn classify(shader_input_type: GLenum) -> Result<Self, ObjectError> {
        match shader_input_type {
            gl::FLOAT => Ok(Self::Float),
            gl::INT | gl::UNSIGNED_INT => Ok(Self::Integer),
            gl::DOUBLE => Ok(Self::Double),
            other => Err(ObjectError::InvalidShaderInputType { type_: other }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawPath {
    Indexed,
    Arrays,
}

fn draw_path(index_buffer_name: GLuint, draw_items_count: GLsizei) -> DrawPath {
    if index_buffer_name != 0 && draw_items_count != 0 {
        DrawPath::Indexed
    } else {
        DrawPath::Arrays
    }
}

/// Vertex array wiring N buffer bindings and their attributes into the
/// vertex fetch stage, with enough cached draw state for a parameterless
/// per-frame draw call.
pub struct VertexArrayObject {
    handle: GLuint,
    layouts: Vec<VertexLayout>,
    primitive: Primitive,
    /// Index count when an index buffer is attached, vertex count otherwise.
    draw_items_count: GLsizei,
    index_type: IndexType,
    index_buffer_name: GLuint,
    _marker: GlMarker,
}
has_handle!(VertexArrayObject);

impl VertexArrayObject {
    /// Non-indexed vertex array over the given layouts.
    pub fn new(
        ctx: &GlContext,
        layouts: &[VertexLayout],
        draw_items_count: GLsizei,
        primitive: Primitive,
    ) -> Result<Self, ObjectError> {
        Self::new_indexed(
            ctx,
            layouts,
            draw_items_count,
            0,
            IndexType::default(),
            primitive,
        )
    }

    /// Vertex array with an optional index buffer (`index_buffer_name == 0`
    /// means none). Attribute indices are assigned globally in layout order;
    /// each layout's buffer is attached at its position's binding index.
    pub fn new_indexed(
        ctx: &GlContext,
        layouts: &[VertexLayout],
        draw_items_count: GLsizei,
        index_buffer_name: GLuint,
        index_type: IndexType,
        primitive: Primitive,
    ) -> Result<Self, ObjectError> {
        let mut handle = 0;
        unsafe { gl::CreateVertexArrays(1, &mut handle) };

        if let Err(err) = configure(handle, layouts, index_buffer_name) {
            unsafe { gl::DeleteVertexArrays(1, &handle) };
            return Err(err);
        }

        Ok(Self {
            handle,
            layouts: layouts.to_vec(),
            primitive,
            draw_items_count,
            index_type,
            index_buffer_name,
            _marker: ctx.marker(),
        })
    }

    pub fn bind(&self) {
        unsafe { gl::BindVertexArray(self.handle) };
    }

    /// Instanced draw using the cached topology, item count and index type.
    /// Dispatches the indexed path iff an index buffer was configured.
    pub fn draw(&self, instance_count: GLsizei) {
        unsafe { gl::BindVertexArray(self.handle) };
        match draw_path(self.index_buffer_name, self.draw_items_count) {
            DrawPath::Indexed => unsafe {
                gl::DrawElementsInstanced(
                    self.primitive.to_u32(),
                    self.draw_items_count,
                    self.index_type.to_u32(),
                    ptr::null(),
                    instance_count,
                );
            },
            DrawPath::Arrays => unsafe {
                gl::DrawArraysInstanced(
                    self.primitive.to_u32(),
                    0,
                    self.draw_items_count,
                    instance_count,
                );
            },
        }
        unsafe { gl::BindVertexArray(0) };
    }

    pub fn vertex_layouts(&self) -> &[VertexLayout] {
        &self.layouts
    }

    pub fn draw_items_count(&self) -> GLsizei {
        self.draw_items_count
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }
}

impl Drop for VertexArrayObject {
    fn drop(&mut self) {
        unsafe { gl::DeleteVertexArrays(1, &self.handle) };
    }
}

fn configure(
    handle: GLuint,
    layouts: &[VertexLayout],
    index_buffer_name: GLuint,
) -> Result<(), ObjectError> {
    let mut attrib_index: GLuint = 0;
    for (binding_index, layout) in layouts.iter().enumerate() {
        let binding_index = binding_index as GLuint;
        unsafe {
            gl::VertexArrayVertexBuffer(
                handle,
                binding_index,
                layout.buffer_name,
                layout.buffer_start_offset,
                layout.stride,
            );
        }

        for attribute in &layout.attributes {
            unsafe { gl::EnableVertexArrayAttrib(handle, attrib_index) };
            match AttribKind::classify(attribute.shader_input_type)? {
                AttribKind::Float => unsafe {
                    gl::VertexArrayAttribFormat(
                        handle,
                        attrib_index,
                        attribute.size,
                        attribute.type_,
                        attribute.normalized as GLboolean,
                        attribute.offset,
                    );
                },
                AttribKind::Integer => unsafe {
                    gl::VertexArrayAttribIFormat(
                        handle,
                        attrib_index,
                        attribute.size,
                        attribute.type_,
                        attribute.offset,
                    );
                },
                AttribKind::Double => unsafe {
                    gl::VertexArrayAttribLFormat(
                        handle,
                        attrib_index,
                        attribute.size,
                        attribute.type_,
                        attribute.offset,
                    );
                },
            }
            unsafe { gl::VertexArrayAttribBinding(handle, attrib_index, binding_index) };
            attrib_index += 1;
        }
    }

    if index_buffer_name != 0 {
        unsafe { gl::VertexArrayElementBuffer(handle, index_buffer_name) };
    }

    check("VertexArrayObject::new")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn byte_size_table_matches_documented_sizes() {
        assert_eq!(compute_byte_size(gl::BYTE), 1);
        assert_eq!(compute_byte_size(gl::UNSIGNED_BYTE), 1);
        assert_eq!(compute_byte_size(gl::SHORT), 2);
        assert_eq!(compute_byte_size(gl::UNSIGNED_SHORT), 2);
        assert_eq!(compute_byte_size(gl::HALF_FLOAT), 2);
        assert_eq!(compute_byte_size(gl::INT), 4);
        assert_eq!(compute_byte_size(gl::UNSIGNED_INT), 4);
        assert_eq!(compute_byte_size(gl::FIXED), 4);
        assert_eq!(compute_byte_size(gl::FLOAT), 4);
        assert_eq!(compute_byte_size(gl::INT_2_10_10_10_REV), 4);
        assert_eq!(compute_byte_size(gl::UNSIGNED_INT_2_10_10_10_REV), 4);
        assert_eq!(compute_byte_size(gl::UNSIGNED_INT_10F_11F_11F_REV), 4);
        assert_eq!(compute_byte_size(gl::DOUBLE), 8);
    }

    #[test]
    fn unsupported_types_have_size_zero() {
        assert_eq!(compute_byte_size(gl::FLOAT_VEC2), 0);
        assert_eq!(compute_byte_size(0), 0);
    }

    #[test]
    fn attribute_byte_size_scales_with_components() {
        let attr = Attribute::new(3, gl::FLOAT, false, 0);
        assert_eq!(attribute_byte_size(&attr), 12);
        let attr = Attribute::new(4, gl::UNSIGNED_SHORT, true, 0);
        assert_eq!(attribute_byte_size(&attr), 8);
    }

    #[test]
    fn layout_equality_ignores_buffer_identity() {
        let attributes = vec![
            Attribute::new(3, gl::FLOAT, false, 0),
            Attribute::new(2, gl::FLOAT, false, 12),
        ];
        let a = VertexLayout::for_buffer(7, 20, 0, attributes.clone());
        let b = VertexLayout::for_buffer(42, 20, 128, attributes.clone());
        assert_eq!(a, b);

        let c = VertexLayout::for_buffer(7, 24, 0, attributes.clone());
        assert_ne!(a, c);

        let mut shifted = attributes;
        shifted[1].offset = 16;
        let d = VertexLayout::for_buffer(7, 20, 0, shifted);
        assert_ne!(a, d);
    }

    #[test]
    fn attribute_equality_covers_all_format_fields() {
        let a = Attribute::new(4, gl::UNSIGNED_BYTE, true, 0);
        let b = a.with_shader_input_type(gl::UNSIGNED_INT);
        assert_ne!(a, b);
    }

    #[test]
    fn shader_input_type_routes_three_ways() {
        assert_eq!(AttribKind::classify(gl::FLOAT).unwrap(), AttribKind::Float);
        assert_eq!(AttribKind::classify(gl::INT).unwrap(), AttribKind::Integer);
        assert_eq!(
            AttribKind::classify(gl::UNSIGNED_INT).unwrap(),
            AttribKind::Integer
        );
        assert_eq!(
            AttribKind::classify(gl::DOUBLE).unwrap(),
            AttribKind::Double
        );
    }

    #[test]
    fn unknown_shader_input_type_is_a_typed_error() {
        match AttribKind::classify(gl::HALF_FLOAT) {
            Err(ObjectError::InvalidShaderInputType { type_ }) => {
                assert_eq!(type_, gl::HALF_FLOAT)
            }
            other => panic!("expected InvalidShaderInputType, got {other:?}"),
        }
    }

    #[test]
    fn index_buffer_presence_selects_the_draw_path() {
        assert_eq!(draw_path(5, 36), DrawPath::Indexed);
        assert_eq!(draw_path(0, 36), DrawPath::Arrays);
        // A configured index buffer with nothing to draw falls back to the
        // arrays path with a zero count, mirroring the draw call semantics.
        assert_eq!(draw_path(5, 0), DrawPath::Arrays);
    }

    #[test]
    fn defaults_match_the_common_case() {
        assert_eq!(Primitive::default(), Primitive::Triangles);
        assert_eq!(IndexType::default(), IndexType::U32);
        assert_eq!(Primitive::Triangles.to_u32(), gl::TRIANGLES);
        assert_eq!(IndexType::U16.to_u32(), gl::UNSIGNED_SHORT);
    }
}
