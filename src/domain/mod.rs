// Domain layer: core models and ports (interfaces). No dependencies on the HTTP or process layers.

pub mod model;
pub mod ports;
