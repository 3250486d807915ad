/// Errors reported by a rendering backend.
///
/// Geometry problems never show up here; degenerate input is skipped while
/// rasterizing. These are failures of the GPU collaborator and are fatal for
/// the context that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrataError {
    /// The backend could not be initialized.
    BackendInit(String),

    /// Shader compilation or pipeline creation failed.
    ShaderCompile(String),

    /// Uploading vertex or index data failed.
    BufferUpload {
        /// Which buffer failed ("vertex" or "index").
        buffer: &'static str,
        /// Number of bytes that were being uploaded.
        size: usize,
    },

    /// A texture could not be created.
    TextureCreation {
        width: u32,
        height: u32,
        reason: String,
    },

    /// An offscreen render target could not be created.
    RenderTargetCreation {
        width: u32,
        height: u32,
        reason: String,
    },

    /// Pixel data does not match the declared dimensions.
    InvalidPixmap {
        width: u32,
        height: u32,
        len: usize,
    },
}

impl std::fmt::Display for StrataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrataError::BackendInit(msg) => write!(f, "Backend initialization failed: {}", msg),
            StrataError::ShaderCompile(msg) => write!(f, "Shader compilation failed: {}", msg),
            StrataError::BufferUpload { buffer, size } => {
                write!(f, "Failed to upload {} bytes of {} data", size, buffer)
            }
            StrataError::TextureCreation {
                width,
                height,
                reason,
            } => write!(f, "Failed to create {}x{} texture: {}", width, height, reason),
            StrataError::RenderTargetCreation {
                width,
                height,
                reason,
            } => write!(
                f,
                "Failed to create {}x{} render target: {}",
                width, height, reason
            ),
            StrataError::InvalidPixmap { width, height, len } => write!(
                f,
                "Pixmap of {}x{} needs {} bytes but has {}",
                width,
                height,
                (*width as usize) * (*height as usize) * 4,
                len
            ),
        }
    }
}

impl std::error::Error for StrataError {}

/// Result type for backend operations.
pub type StrataResult<T> = Result<T, StrataError>;
