//! Drawing surfaces and the per-slide frame renderer.

/// CPU raster surface (`vello_cpu` + `parley`).
pub mod cpu;
/// Slide compositing.
pub mod frame;
/// The `Surface` seam and a recording test surface.
pub mod surface;
