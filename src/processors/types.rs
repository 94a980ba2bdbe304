//! Shared processor types.

use serde::{Deserialize, Serialize};

/// Memory layout of the image tensor handed to the model.
///
/// Keras-trained models take HWC (height, width, channels); most
/// PyTorch-exported models take CHW. The shipped recipe model is HWC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelOrder {
    /// Channels-last layout, shape (batch, height, width, channels).
    #[default]
    HWC,
    /// Channels-first layout, shape (batch, channels, height, width).
    CHW,
}
