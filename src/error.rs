use thiserror::Error;

use crate::program::ShaderStage;
use crate::transmutable_u32;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlError {
    InvalidEnum = gl::INVALID_ENUM,
    InvalidValue = gl::INVALID_VALUE,
    InvalidOperation = gl::INVALID_OPERATION,
    InvalidFramebufferOperation = gl::INVALID_FRAMEBUFFER_OPERATION,
    OutOfMemory = gl::OUT_OF_MEMORY,
    StackUnderflow = gl::STACK_UNDERFLOW,
    StackOverflow = gl::STACK_OVERFLOW,
}
transmutable_u32!(GlError);

impl GlError {
    /// Pops the next error off the context's error queue, if any.
    pub fn try_get() -> Option<Self> {
        let err_num = unsafe { gl::GetError() };
        Some(match err_num {
            gl::NO_ERROR => return None,
            gl::INVALID_ENUM => GlError::InvalidEnum,
            gl::INVALID_VALUE => GlError::InvalidValue,
            gl::INVALID_OPERATION => GlError::InvalidOperation,
            gl::INVALID_FRAMEBUFFER_OPERATION => GlError::InvalidFramebufferOperation,
            gl::OUT_OF_MEMORY => GlError::OutOfMemory,
            gl::STACK_UNDERFLOW => GlError::StackUnderflow,
            gl::STACK_OVERFLOW => GlError::StackOverflow,
            _ => unreachable!(),
        })
    }
}

/// Failure raised by the strict construction paths (shader programs, vertex
/// arrays). The lenient texture/buffer paths log instead; see crate docs.
#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("no shader source given for {stage:?} stage")]
    EmptyShaderSource { stage: ShaderStage },
    #[error("{stage:?} shader compilation failed:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("program link failed:\n{log}")]
    ProgramLink { log: String },
    #[error("invalid vertex shader input type {type_:#x} (use float, double or int)")]
    InvalidShaderInputType { type_: u32 },
    #[error("{context}: GL error {error:?}")]
    Gl {
        context: &'static str,
        error: GlError,
    },
}

/// Strict-path error query: turns a pending GL error into an `ObjectError`.
pub(crate) fn check(context: &'static str) -> Result<(), ObjectError> {
    match GlError::try_get() {
        Some(error) => Err(ObjectError::Gl { context, error }),
        None => Ok(()),
    }
}

/// Lenient-path error query: logs a pending GL error and carries on.
pub(crate) fn report(context: &str) {
    if let Some(error) = GlError::try_get() {
        log::error!("{context}: GL error {error:?}");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn gl_error_round_trips_to_u32() {
        assert_eq!(GlError::InvalidEnum.to_u32(), gl::INVALID_ENUM);
        assert_eq!(GlError::OutOfMemory.to_u32(), gl::OUT_OF_MEMORY);
    }

    #[test]
    fn object_error_messages_carry_diagnostics() {
        let err = ObjectError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "0:1: syntax error".into(),
        };
        let text = err.to_string();
        assert!(text.contains("Fragment"));
        assert!(text.contains("syntax error"));

        let err = ObjectError::InvalidShaderInputType { type_: 0x1400 };
        assert!(err.to_string().contains("0x1400"));
    }
}
