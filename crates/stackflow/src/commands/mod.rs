pub mod graph;
pub mod jobs;
pub mod synth;
pub mod validate;
