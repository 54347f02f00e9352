// Domain layer: record models and the ports (traits) the core consumes.

pub mod model;
pub mod ports;
