// src/models/mod.rs

pub mod attempt;
pub mod quiz;
pub mod quiz_record;
pub mod submission;
pub mod user;
