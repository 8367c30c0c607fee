mod store;
mod weight_gen;

pub use store::{BackCursor, FrontCursor, ParamStore};
pub use weight_gen::{ChainedWeightGen, ConstWeightGen, RandWeightGen, WeightGen};
