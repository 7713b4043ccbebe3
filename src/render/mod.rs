pub mod native;
mod shared;

pub use native::Renderer;
