pub mod capture;
pub mod encoder;
pub mod playback;
pub mod resample;
