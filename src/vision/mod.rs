pub mod camera;
pub mod client;
pub mod handoff;
pub mod types;
pub mod worker;
