use candle_core::Device;

use crate::core::{DeviceChoice, Result, SubstituteError};

/// Request for a specific device, used by pipeline builders.
#[derive(Clone, Default)]
pub enum DeviceRequest {
    /// Use CUDA 0 if available, otherwise CPU.
    #[default]
    Default,
    /// Force CPU even if CUDA is available.
    Cpu,
    /// Select a specific CUDA device by index.
    Cuda(usize),
    /// Provide an already constructed device.
    Explicit(Device),
}

impl DeviceRequest {
    /// Resolve the request into an actual [`Device`].
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Default => Device::cuda_if_available(0)
                .map_err(|e| SubstituteError::Device(e.to_string())),
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => {
                Device::new_cuda(i).map_err(|e| SubstituteError::Device(format!("cuda:{i}: {e}")))
            }
            DeviceRequest::Explicit(d) => Ok(d),
        }
    }
}

impl From<DeviceChoice> for DeviceRequest {
    fn from(choice: DeviceChoice) -> Self {
        match choice {
            DeviceChoice::Auto => DeviceRequest::Default,
            DeviceChoice::Cpu => DeviceRequest::Cpu,
            DeviceChoice::Cuda(i) => DeviceRequest::Cuda(i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_request_resolves_to_cpu() -> Result<()> {
        assert!(DeviceRequest::Cpu.resolve()?.is_cpu());
        assert!(DeviceRequest::from(DeviceChoice::Cpu).resolve()?.is_cpu());
        Ok(())
    }
}
