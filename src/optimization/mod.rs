mod gradient_descent_with_momentum;
mod optimizer;

pub use gradient_descent_with_momentum::GradientDescentWithMomentum;
pub use optimizer::Optimizer;
