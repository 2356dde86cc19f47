pub mod bitmap;
pub mod drawing;
pub mod fill;
pub mod hwb;
pub mod mask;
pub mod palette;
