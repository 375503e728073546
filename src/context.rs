use std::marker::PhantomData;

/// Witness that an OpenGL context is current on the calling thread.
///
/// Wrapper constructors take `&GlContext` instead of relying on an ambient,
/// undocumented precondition. The token is neither `Send` nor `Sync`, and
/// every wrapper built from it inherits that, so GL objects stay on the
/// thread their context lives on.
pub struct GlContext {
    _not_send: PhantomData<*const ()>,
}

impl GlContext {
    /// Assert that a context is current and its symbols are loaded.
    ///
    /// # Safety
    ///
    /// An OpenGL 4.5 context must be current on this thread and
    /// [`gl::load_with`] must already have run against it. The windowing
    /// layer that made the context current is the right place to call this;
    /// see `glfw::Window::make_current` for the crate's own use.
    pub unsafe fn assume_current() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }

    pub(crate) fn marker(&self) -> GlMarker {
        GlMarker {
            _not_send: PhantomData,
        }
    }
}

/// Thread-affinity marker embedded in every wrapper type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GlMarker {
    _not_send: PhantomData<*const ()>,
}
