pub mod config;

pub use config::CameraConfig;

use log::{debug, info};

use crate::capture::VideoCapture;
use crate::device::SimulatedCamera;
use crate::error::Result;

/// Open the camera at `config.index`, then apply the configured properties.
pub fn open(config: &CameraConfig) -> Result<VideoCapture<SimulatedCamera>> {
    info!("Opening camera {}", config.index);
    let mut cap = VideoCapture::new(SimulatedCamera::open(config.index)?);
    config.apply(&mut cap)?;

    let names = cap.node_names()?;
    debug!("Camera exposes {} nodes", names.len());
    Ok(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, CameraError};

    #[test]
    fn test_open_applies_config() {
        let mut cap = open(&CameraConfig::new().with_exposure(2500.0)).unwrap();
        assert!(cap.is_opened());
        assert_eq!(
            cap.get(crate::property::PropertyId::Exposure).unwrap(),
            crate::property::PropertyValue::Float(2500.0)
        );
    }

    #[test]
    fn test_open_unknown_index() {
        let result = open(&CameraConfig::new().with_index(2));
        assert!(matches!(
            result,
            Err(AppError::Camera(CameraError::Device(_)))
        ));
    }
}
