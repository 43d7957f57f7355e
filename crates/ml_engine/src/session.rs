//! Runtime-agnostic inference seam.
//!
//! Every model input and output is a dense `f32` tensor. Inputs are passed
//! positionally (`args_0`, `args_1`, ...). Outputs keep the names the graph
//! gives them so multi-head models can be read by name.

/// Dense `f32` tensor fed to a session.
#[derive(Clone, Debug, PartialEq)]
pub struct InputTensor {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl InputTensor {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { shape, data }
    }
}

/// Named output of a forward pass.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputTensor {
    pub name: String,
    pub data: Vec<f32>,
}

impl OutputTensor {
    pub fn new(name: impl Into<String>, data: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// A loaded network. Implementations must be usable from several threads at once.
pub trait Inference: Send + Sync {
    fn run(&self, inputs: Vec<InputTensor>) -> Result<Vec<OutputTensor>, String>;
}

/// Session that answers every call with the same outputs.
///
/// Useful for dry runs and for exercising decoding without model files.
#[derive(Clone, Debug, Default)]
pub struct StaticSession {
    outputs: Vec<OutputTensor>,
}

impl StaticSession {
    pub fn new(outputs: Vec<OutputTensor>) -> Self {
        Self { outputs }
    }

    /// Single unnamed policy head.
    pub fn policy(scores: Vec<f32>) -> Self {
        Self::new(vec![OutputTensor::new("output_0", scores)])
    }

    /// Single scalar value head.
    pub fn value(value: f32) -> Self {
        Self::new(vec![OutputTensor::new("output_0", vec![value])])
    }
}

impl Inference for StaticSession {
    fn run(&self, _inputs: Vec<InputTensor>) -> Result<Vec<OutputTensor>, String> {
        Ok(self.outputs.clone())
    }
}
