#[cfg(feature = "engine-tesseract")]
pub mod tesseract;

#[cfg(feature = "engine-cloud")]
pub mod google_vision;
