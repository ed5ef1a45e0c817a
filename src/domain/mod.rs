// Domain layer: job model and the ports the engine, storage and vision backend meet at.

pub mod model;
pub mod ports;
