/// Error types for the render pipeline
use thiserror::Error;

/// Render pipeline errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A single mesh part produced more triangles than one 16-bit indexed
    /// draw can address. The frame is abandoned.
    #[error(
        "mesh [{mesh}] of model [{model}] renders {triangles} triangles in one part, \
         exceeding the maximum of {limit}; split it into more mesh parts or models"
    )]
    TriangleLimitExceeded {
        model: String,
        mesh: String,
        triangles: usize,
        limit: usize,
    },

    #[error("texture of {width}x{height} needs {expected} texels, got {texels}")]
    InvalidTexture {
        width: usize,
        height: usize,
        expected: usize,
        texels: usize,
    },

    #[error("render targets cannot be {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;
