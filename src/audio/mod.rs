//! Audio containers produced by the pipeline.

pub mod wav;

pub use wav::{PcmFormat, WavAudio, WavInfo, encode, encode_default, encode_file};
