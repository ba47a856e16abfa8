//! Host-facing surfaces: the operation dispatcher and the CSV script format.

pub mod csv;
pub mod dispatch;
