//! Demonstration models shipped with the checker.

mod abp;
mod bank;
mod wgc;

pub use abp::Abp;
pub use bank::Bank;
pub use wgc::Wgc;
