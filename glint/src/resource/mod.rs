pub mod buffer;
pub mod texture;
pub mod vertex_array;

pub use buffer::{Buffer, BufferCreateInfo};
pub use texture::{Filter, ImageData, Sampling, Texture, TextureCreateInfo, Wrap};
pub use vertex_array::{AttributeFormat, VertexArray, VertexAttribute};
