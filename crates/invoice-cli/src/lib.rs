//! Library components of the `invoice-mapper` command.

pub mod headers;
pub mod logging;
