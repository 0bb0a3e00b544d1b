use crate::error::Result;

/// Anything that produces variates on [0, 1).
///
/// The validation harness is written against this trait so the Mersenne
/// Twister and the linear congruential generator are assessed identically.
pub trait UniformSource {
    fn next_uniform(&mut self) -> Result<f64>;
}

impl<S: UniformSource + ?Sized> UniformSource for &mut S {
    fn next_uniform(&mut self) -> Result<f64> {
        (**self).next_uniform()
    }
}
