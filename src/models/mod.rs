pub mod batch;
pub mod common;
pub mod image;
pub mod prompt;

pub use batch::*;
pub use common::*;
pub use image::*;
pub use prompt::*;
