pub mod fill;
pub mod inspect;
pub mod status;
pub mod update;
