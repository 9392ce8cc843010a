#[allow(clippy::module_inception)]
mod sample;
mod sample_row;

pub use {sample::Sample, sample_row::SampleRow};
