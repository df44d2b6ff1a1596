mod io;
mod layer;
mod proj;

pub use layer::Layer;
