#![forbid(unsafe_code)]

mod account;
mod action;
mod aggregate;
mod consumer;
mod error;
mod projection;
mod query;
mod read_model;

pub use account::*;
pub use action::*;
pub use aggregate::*;
pub use consumer::*;
pub use error::*;
pub use projection::*;
pub use query::*;
pub use read_model::*;
