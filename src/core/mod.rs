pub mod advisor;
pub mod aggregator;
pub mod doctor_search;
pub mod facility;
pub mod geo;
pub mod specialization;

pub use crate::domain::model::{AggregateResult, Coordinate, DoctorMatch, Facility, Suggestion};
pub use crate::domain::ports::{ChatBackend, ConfigProvider, FacilitySource, PractitionerStore};
pub use crate::utils::error::Result;
