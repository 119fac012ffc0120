mod pending;
mod request;

pub use pending::Pending;
pub use request::{Outcome, Request};
