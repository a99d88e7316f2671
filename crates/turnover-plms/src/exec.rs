//! Execution context: the device and compute dtype for one predict call,
//! resolved once rather than re-derived per batch.
use crate::device;
use candle_core::{DType, Device, Result};

#[derive(Debug, Clone)]
pub struct ExecContext {
    pub device: Device,
    pub dtype: DType,
}

impl ExecContext {
    /// Device priority is CUDA, then Metal, then CPU. Reduced precision only
    /// applies on accelerators; on CPU the flag is a no-op.
    pub fn resolve(cpu: bool, use_amp: bool) -> Result<Self> {
        let device = device(cpu)?;
        let dtype = if use_amp && !matches!(device, Device::Cpu) {
            DType::F16
        } else {
            DType::F32
        };
        Ok(Self { device, dtype })
    }
}
