mod error;
mod lcg;
mod mersenne;
mod source;

pub use error::*;
pub use lcg::*;
pub use mersenne::*;
pub use source::*;
