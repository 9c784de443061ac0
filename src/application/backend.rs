// ============================================================
// Layer 2 — Compute Backend Selection
// ============================================================
// The device is chosen once per run and every tensor is created
// on it:
//
//   cpu → NdArray               (always available)
//   gpu → Wgpu                  (cargo feature `wgpu`)
//
// Training wraps either in Autodiff; dev evaluation and
// prediction run on the plain backend.

use serde::{Deserialize, Serialize};

pub type CpuBackend      = burn::backend::NdArray;
pub type CpuTrainBackend = burn::backend::Autodiff<CpuBackend>;

#[cfg(feature = "wgpu")]
pub type GpuBackend = burn::backend::Wgpu;
#[cfg(feature = "wgpu")]
pub type GpuTrainBackend = burn::backend::Autodiff<GpuBackend>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Cpu,
    Gpu,
}

pub fn cpu_device() -> burn::backend::ndarray::NdArrayDevice {
    burn::backend::ndarray::NdArrayDevice::Cpu
}

#[cfg(feature = "wgpu")]
pub fn gpu_device() -> burn::backend::wgpu::WgpuDevice {
    burn::backend::wgpu::WgpuDevice::default()
}

/// Error for `--device gpu` in a build without the `wgpu` feature.
#[cfg(not(feature = "wgpu"))]
pub fn gpu_unavailable() -> anyhow::Error {
    anyhow::anyhow!("this build has no GPU backend; rebuild with `--features wgpu` or use `--device cpu`")
}
