//! Small line-oriented building blocks shared by the dashboard panels.

pub mod filter_bar;
pub mod header;
pub mod leaderboard;
pub mod legend;
