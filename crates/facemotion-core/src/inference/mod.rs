//! ML inference engine using Candle.
//!
//! Implements the face landmarker stack used for blendshape extraction:
//! - anchor-based face detector (128x128 input)
//! - face-mesh landmark regressor (192x192 ROI crops)
//! - blendshape scoring head over the mesh landmarks
//!
//! All three models load from a single safetensors bundle.

mod blendshapes;
mod detector;
mod device;
mod face_landmarker;
mod loader;
mod mesh;

pub use blendshapes::BlendshapeHead;
pub use detector::{FaceDetection, FaceDetector};
pub use device::get_device;
pub use face_landmarker::FaceLandmarker;
pub use loader::load_safetensors;
pub use mesh::{FaceMesh, MeshRegressor};
pub(crate) use detector::sigmoid;
