//! Minimal GLFW layer for the demo binary.
//!
//! Only what the demo needs: init with an error callback, a 4.5-core window,
//! making its context current (which also loads the GL and bindless symbols
//! and hands out the [`GlContext`] token), buffer swapping and event polling.

use std::ffi::{CStr, CString, c_char, c_void};
use std::ptr::{self, NonNull};

use color_eyre::{Result as EyreResult, eyre::eyre};
use glam::IVec2;
use glfw::ffi;

use crate::context::GlContext;

#[repr(i32)]
#[derive(Debug, Clone, Copy)]
pub enum GlfwError {
    NotInitialized,
    NoCurrentContext,
    InvalidEnum,
    InvalidValue,
    OutOfMemory,
    ApiUnavailable,
    VersionUnavailable,
    PlatformError,
    FormatUnavailable,
    NoWindowContext,
    CursorUnavailable,
    FeatureUnavailable,
    FeatureUnimplemented,
    PlatformUnavailable,
}

impl GlfwError {
    /// `None` for no-error and for codes this build does not know about;
    /// the error callback logs the raw code in that case.
    pub fn from_num(err: i32) -> Option<Self> {
        Some(match err {
            0x00010001 => Self::NotInitialized,
            0x00010002 => Self::NoCurrentContext,
            0x00010003 => Self::InvalidEnum,
            0x00010004 => Self::InvalidValue,
            0x00010005 => Self::OutOfMemory,
            0x00010006 => Self::ApiUnavailable,
            0x00010007 => Self::VersionUnavailable,
            0x00010008 => Self::PlatformError,
            0x00010009 => Self::FormatUnavailable,
            0x0001000a => Self::NoWindowContext,
            0x0001000b => Self::CursorUnavailable,
            0x0001000c => Self::FeatureUnavailable,
            0x0001000d => Self::FeatureUnimplemented,
            0x0001000e => Self::PlatformUnavailable,
            _ => return None,
        })
    }
}

extern "C" fn err_callback(err: i32, desc: *const c_char) {
    let desc = unsafe { CStr::from_ptr(desc) }.to_string_lossy();
    match GlfwError::from_num(err) {
        Some(err) => log::error!("GLFW error {err:?}: {desc}"),
        None => log::error!("GLFW error {err:#x}: {desc}"),
    }
}

pub fn init() -> Option<()> {
    let err = unsafe { ffi::glfwInit() };
    (err == 1).then_some(())
}

pub fn install_errors() {
    unsafe { ffi::glfwSetErrorCallback(Some(err_callback)) };
}

pub fn get_proc_address(name: &str) -> *const c_void {
    let Ok(name) = CString::new(name) else {
        return ptr::null();
    };
    unsafe { ffi::glfwGetProcAddress(name.as_ptr()) }
}

pub fn poll_events() {
    unsafe { ffi::glfwPollEvents() }
}

pub struct Window {
    window: NonNull<ffi::GLFWwindow>,
}

impl Window {
    /// Create a window requesting a 4.5 core context (DSA minimum).
    pub fn create(width: i32, height: i32, title: &str) -> EyreResult<Self> {
        let as_c_str = CString::new(title)?;
        let window = unsafe {
            ffi::glfwWindowHint(ffi::CONTEXT_VERSION_MAJOR, 4);
            ffi::glfwWindowHint(ffi::CONTEXT_VERSION_MINOR, 5);
            ffi::glfwWindowHint(ffi::OPENGL_PROFILE, ffi::OPENGL_CORE_PROFILE);
            ffi::glfwCreateWindow(
                width,
                height,
                as_c_str.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };

        NonNull::new(window)
            .map(|window| Self { window })
            .ok_or_else(|| eyre!("Window creation failed: nullptr"))
    }

    /// Make the window's context current on this thread, load the GL and
    /// bindless symbols through it, and hand out the context token.
    pub fn make_current(&self) -> GlContext {
        unsafe { ffi::glfwMakeContextCurrent(self.window.as_ptr()) };
        gl::load_with(get_proc_address);
        crate::bindless::load_with(get_proc_address);
        unsafe { GlContext::assume_current() }
    }

    pub fn should_close(&self) -> bool {
        (unsafe { ffi::glfwWindowShouldClose(self.window.as_ptr()) }) > 0
    }

    pub fn swap_buffers(&self) {
        unsafe { ffi::glfwSwapBuffers(self.window.as_ptr()) }
    }

    pub fn get_framebuffer_size(&self) -> IVec2 {
        let mut result = IVec2::ZERO;
        unsafe { ffi::glfwGetFramebufferSize(self.window.as_ptr(), &mut result.x, &mut result.y) };
        result
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        unsafe { ffi::glfwDestroyWindow(self.window.as_ptr()) };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn known_error_codes_map_to_variants() {
        assert!(matches!(
            GlfwError::from_num(0x00010001),
            Some(GlfwError::NotInitialized)
        ));
        assert!(matches!(
            GlfwError::from_num(0x0001000e),
            Some(GlfwError::PlatformUnavailable)
        ));
    }

    #[test]
    fn unknown_error_codes_do_not_panic() {
        // Codes from newer GLFW releases arrive through the C callback,
        // where unwinding is not an option.
        assert_eq!(GlfwError::from_num(0).map(|e| e as i32), None);
        assert_eq!(GlfwError::from_num(0x0001000f).map(|e| e as i32), None);
        assert_eq!(GlfwError::from_num(-1).map(|e| e as i32), None);
    }
}
