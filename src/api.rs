pub mod client;
mod error;
#[cfg(test)]
pub mod fake;
pub mod kraken;
pub mod rest;
mod source;

pub use self::{
    error::Error,
    kraken::{Api, Capability, Credentials, Meters, Region},
    source::{DataSource, PERIODS_PER_DAY},
};
