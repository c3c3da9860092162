pub mod synth;
pub mod validate;
