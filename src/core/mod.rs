pub mod arn;
pub mod domain;
pub mod error;
pub mod ports;
pub mod toggler;

#[cfg(test)]
pub mod testing;
