//! Compute device selection.

use candle_core::Device;
use tracing::info;

/// Picks the device used for both landmarker inference and classifier
/// training.
///
/// Prefers a GPU when the corresponding feature is enabled (Metal on
/// macOS, CUDA elsewhere) and falls back to CPU, which is plenty for the
/// small models in this pipeline.
#[must_use]
pub fn get_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            info!("Running on Metal");
            return device;
        }
    }

    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Running on CUDA");
            return device;
        }
    }

    info!("Running on CPU");
    Device::Cpu
}
