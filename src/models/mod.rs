// src/models/mod.rs

pub mod exercise;
pub mod language;
pub mod leaderboard;
pub mod lesson;
pub mod progress;
pub mod question;
pub mod quiz;
pub mod user;
