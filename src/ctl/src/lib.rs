#[macro_use]
extern crate async_trait;

pub mod bit;
pub mod check;
pub mod classify;
pub mod cluster;
pub mod error;
pub mod inspect;
pub mod sort;

pub use error::{Error, Result};
