//! Bindless texture entry points (`ARB_bindless_texture`).
//!
//! The extension is not part of any core profile, so the `gl` crate does not
//! generate bindings for it. The three functions this crate needs are loaded
//! here through the same proc-address mechanism as the core symbols; call
//! [`load_with`] right after `gl::load_with` (the glfw layer does both).

use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};

use gl::types::{GLuint, GLuint64};

type GetTextureHandleFn = unsafe extern "system" fn(GLuint) -> GLuint64;
type ResidencyFn = unsafe extern "system" fn(GLuint64);

static GET_TEXTURE_HANDLE: AtomicUsize = AtomicUsize::new(0);
static MAKE_RESIDENT: AtomicUsize = AtomicUsize::new(0);
static MAKE_NON_RESIDENT: AtomicUsize = AtomicUsize::new(0);

/// Load the bindless entry points. Unsupported drivers yield null pointers,
/// which leaves the module in its unloaded state.
pub fn load_with(mut loader: impl FnMut(&str) -> *const c_void) {
    GET_TEXTURE_HANDLE.store(loader("glGetTextureHandleARB") as usize, Ordering::Release);
    MAKE_RESIDENT.store(
        loader("glMakeTextureHandleResidentARB") as usize,
        Ordering::Release,
    );
    MAKE_NON_RESIDENT.store(
        loader("glMakeTextureHandleNonResidentARB") as usize,
        Ordering::Release,
    );
}

pub fn is_loaded() -> bool {
    GET_TEXTURE_HANDLE.load(Ordering::Acquire) != 0
        && MAKE_RESIDENT.load(Ordering::Acquire) != 0
        && MAKE_NON_RESIDENT.load(Ordering::Acquire) != 0
}

/// 64-bit bindless handle for a texture name, or `None` when the extension
/// is unavailable.
pub(crate) fn texture_handle(name: GLuint) -> Option<GLuint64> {
    let ptr = GET_TEXTURE_HANDLE.load(Ordering::Acquire);
    (ptr != 0).then(|| {
        let func = unsafe { std::mem::transmute::<usize, GetTextureHandleFn>(ptr) };
        unsafe { func(name) }
    })
}

pub(crate) fn make_resident(handle: GLuint64) {
    call_residency(&MAKE_RESIDENT, handle, "glMakeTextureHandleResidentARB");
}

pub(crate) fn make_non_resident(handle: GLuint64) {
    call_residency(
        &MAKE_NON_RESIDENT,
        handle,
        "glMakeTextureHandleNonResidentARB",
    );
}

fn call_residency(slot: &AtomicUsize, handle: GLuint64, name: &str) {
    let ptr = slot.load(Ordering::Acquire);
    if ptr == 0 {
        log::warn!("{name} called but bindless texture entry points are not loaded");
        return;
    }
    let func = unsafe { std::mem::transmute::<usize, ResidencyFn>(ptr) };
    unsafe { func(handle) };
}
