use color_eyre::{Result as EyreResult, eyre::OptionExt};
use glam::Vec2;

use gl_objects::glfw::{self, Window};
use gl_objects::info::GlString;
use gl_objects::{
    Attribute, BufferObject, BufferTarget, DataUsage, IndexType, Primitive, ShaderProgram,
    ShaderStage, VertexArrayObject, VertexLayout, bindless,
};

const VERTEX_SRC: &str = r"
#version 450 core
layout(location = 0) in vec2 a_pos;
layout(location = 1) in vec3 a_color;
uniform vec2 u_offset;
out vec3 v_color;
void main() {
    v_color = a_color;
    gl_Position = vec4(a_pos + u_offset, 0.0, 1.0);
}
";

const FRAGMENT_SRC: &str = r"
#version 450 core
in vec3 v_color;
out vec4 o_color;
void main() {
    o_color = vec4(v_color, 1.0);
}
";

// x, y, r, g, b per vertex
const VERTICES: [f32; 15] = [
    -0.5, -0.5, 1.0, 0.0, 0.0, //
    0.5, -0.5, 0.0, 1.0, 0.0, //
    0.0, 0.5, 0.0, 0.0, 1.0, //
];
const INDICES: [u32; 3] = [0, 1, 2];

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::init();

    glfw::install_errors();
    glfw::init().ok_or_eyre("glfw init failed")?;

    let window = Window::create(1000, 800, "gl_objects demo")?;
    let ctx = window.make_current();

    log::info!("vendor:   {}", GlString::Vendor.get(&ctx));
    log::info!("renderer: {}", GlString::Renderer.get(&ctx));
    log::info!("version:  {}", GlString::Version.get(&ctx));
    log::info!("bindless: {}", bindless::is_loaded());

    let program = ShaderProgram::new(
        &ctx,
        &[
            (ShaderStage::Vertex, VERTEX_SRC),
            (ShaderStage::Fragment, FRAGMENT_SRC),
        ],
    )?;
    program.log_active_uniforms();
    program.log_active_attributes();

    let vertex_buffer = BufferObject::from_slice(
        &ctx,
        BufferTarget::ArrayBuffer,
        &VERTICES,
        DataUsage::STATIC_DRAW,
    );
    let index_buffer = BufferObject::from_slice(
        &ctx,
        BufferTarget::ElementArray,
        &INDICES,
        DataUsage::STATIC_DRAW,
    );

    let layout = VertexLayout::for_buffer(
        vertex_buffer.as_handle(),
        20,
        0,
        vec![
            Attribute::new(2, gl::FLOAT, false, 0),
            Attribute::new(3, gl::FLOAT, false, 8),
        ],
    );
    let vao = VertexArrayObject::new_indexed(
        &ctx,
        &[layout],
        INDICES.len() as i32,
        index_buffer.as_handle(),
        IndexType::U32,
        Primitive::Triangles,
    )?;

    while !window.should_close() {
        let size = window.get_framebuffer_size();
        unsafe {
            gl::Viewport(0, 0, size.x, size.y);
            gl::ClearColor(0.1, 0.1, 0.1, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }

        program.use_program();
        program.set_uniform_vec2("u_offset", Vec2::ZERO);
        vao.draw(1);

        window.swap_buffers();
        glfw::poll_events();
    }

    Ok(())
}
