// src/handlers/mod.rs

pub mod attempt;
pub mod quiz;
pub mod submission;
pub mod user;
