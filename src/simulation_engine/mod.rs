// simulation_engine/mod.rs
pub mod profiles;
pub mod sample_generator;
