mod image;

pub use image::ModuleImageBuilder;
pub use reader::FakeReader;
