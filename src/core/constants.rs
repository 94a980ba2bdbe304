//! Constants used throughout the recognition pipeline.

/// Height in pixels the model input expects.
pub const MODEL_INPUT_HEIGHT: u32 = 224;

/// Width in pixels the model input expects.
pub const MODEL_INPUT_WIDTH: u32 = 224;

/// Number of color channels the model input expects.
pub const MODEL_INPUT_CHANNELS: usize = 3;

/// Default number of images per inference batch.
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// Default number of pooled ONNX Runtime sessions.
pub const DEFAULT_SESSION_POOL_SIZE: usize = 1;

/// Number of images above which batch loading goes parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

/// Upper bound accepted for configured image dimensions.
pub const MAX_IMAGE_DIMENSION: u32 = 10_000;
