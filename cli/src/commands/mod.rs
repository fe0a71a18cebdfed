pub mod diff;
pub mod info;
