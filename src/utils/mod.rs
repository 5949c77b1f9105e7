// src/utils/mod.rs

pub mod endpoint;
pub mod html;
