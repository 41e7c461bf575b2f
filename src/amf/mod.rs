// Access mapping functions for dense structured storage

pub mod imf;
pub mod polynomial;
pub mod storage;
pub mod view;

pub use imf::Imf;
pub use polynomial::{BivariateQuadratic, Coefficients, Substitution};
pub use storage::{Orientation, Storage, StructuredMatrix};
pub use view::{Amf, AmfView};
