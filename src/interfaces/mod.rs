//! Intake and reply formats at the edge of the service.

pub mod csv;
