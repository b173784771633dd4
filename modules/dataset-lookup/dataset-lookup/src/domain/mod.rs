pub mod batch;
pub mod classify;
pub mod error;
pub mod model;
pub mod ports;
pub mod service;
pub mod status;

#[cfg(test)]
pub mod test_support;
