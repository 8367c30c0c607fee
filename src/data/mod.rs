mod dataset;
mod loader;
mod minibatch;

pub use dataset::Dataset;
pub use loader::{load_mnist, IMAGE_PIXELS, IMAGE_SIZE, NUM_CLASSES};
pub use minibatch::Minibatcher;
