pub mod encoder;
pub mod math;
pub mod scaler;
pub mod sort;
