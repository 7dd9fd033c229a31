// Domain layer: core models and ports (interfaces) for the collaborators the triage core reads from.

pub mod model;
pub mod ports;
