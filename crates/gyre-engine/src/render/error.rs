use std::fmt;

/// Failure category reported through [`RenderError`] and the error callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RenderErrorKind {
    /// Used before a successful `initialize`, or init failed for another reason.
    InitializationFailed,
    /// A stage failed to compile, the program failed to link, or a source
    /// could not be read.
    ShaderCompilationFailed,
    /// Vertex data was empty or the GPU refused a vertex array/buffer.
    BufferCreationFailed,
}

impl fmt::Display for RenderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RenderErrorKind::InitializationFailed => "initialization failed",
            RenderErrorKind::ShaderCompilationFailed => "shader compilation failed",
            RenderErrorKind::BufferCreationFailed => "buffer creation failed",
        };
        f.write_str(s)
    }
}

/// Error returned by [`Renderer`](super::Renderer) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    pub kind: RenderErrorKind,
    pub message: String,
}

impl RenderError {
    pub fn new(kind: RenderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RenderError {}

/// Callback invoked with every reported renderer failure.
pub type ErrorCallback = Box<dyn FnMut(RenderErrorKind, &str)>;
