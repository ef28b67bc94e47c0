//! Domain types and the ports the batching core consumes.

pub mod notification;
pub mod ports;
pub mod work;
