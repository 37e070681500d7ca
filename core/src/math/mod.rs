pub mod convolution;

pub use convolution::ConvolutionHelper;
