//! Schedule handling: parsing user-entered time specifications, keeping the
//! periodic-trigger store in step with schedule entries, and the beat loop
//! that fires due triggers.

pub mod beat;
pub mod synchronizer;
pub mod time_spec;
