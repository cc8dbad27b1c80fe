// src/services/mod.rs

pub mod leaderboard;
pub mod submission;
