#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod constants;
pub mod merge;
pub mod models;

pub use crate::constants::*;
pub use crate::merge::*;
pub use crate::models::*;
