pub mod distribution;
pub mod moments;
pub mod multitest;
