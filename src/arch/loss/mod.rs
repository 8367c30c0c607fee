mod loss_fn;
mod softmax_cross_entropy;

pub use loss_fn::LossFn;
pub use softmax_cross_entropy::SoftmaxCrossEntropy;
