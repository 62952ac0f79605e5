pub mod answer;
pub mod fall;
pub mod schedule;
pub mod scoring;
