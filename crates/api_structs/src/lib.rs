mod certification;
mod status;

pub mod dtos {
    pub use crate::certification::dtos::*;
}

pub use crate::certification::api::*;
pub use crate::status::api::*;
