//! ONNX model loading and inference through tract.
//!
//! Requires the `onnx` feature to be enabled.

use std::path::Path;

use tract_onnx::prelude::*;

use crate::session::{Inference, InputTensor, OutputTensor};

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A tract plan with its output names. Runs take `&self`, so one session
/// serves every lane at once.
pub struct TractSession {
    plan: Plan,
    output_names: Vec<String>,
}

impl TractSession {
    /// Loads and optimizes the graph at `path`. `input_shapes` pins every input
    /// to a concrete `f32` shape so symbolic batch dimensions are resolved up front.
    pub fn load(path: &Path, input_shapes: &[Vec<usize>]) -> Result<Self, String> {
        let mut model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| format!("failed to read ONNX graph: {e}"))?;
        for (ix, shape) in input_shapes.iter().enumerate() {
            model = model
                .with_input_fact(ix, f32::fact(shape.clone()).into())
                .map_err(|e| format!("input {ix} rejects shape {shape:?}: {e}"))?;
        }

        let plan = model
            .into_optimized()
            .map_err(|e| format!("failed to optimize model: {e}"))?
            .into_runnable()
            .map_err(|e| format!("failed to make model runnable: {e}"))?;
        Self::from_plan(plan)
    }

    fn from_plan(plan: Plan) -> Result<Self, String> {
        let graph = plan.model();
        let output_names = graph
            .output_outlets()
            .map_err(|e| format!("failed to list outputs: {e}"))?
            .iter()
            .map(|outlet| {
                graph
                    .outlet_label(*outlet)
                    .map(str::to_string)
                    .unwrap_or_else(|| graph.node(outlet.node).name.clone())
            })
            .collect();

        Ok(Self { plan, output_names })
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }
}

impl Inference for TractSession {
    fn run(&self, inputs: Vec<InputTensor>) -> Result<Vec<OutputTensor>, String> {
        let values: TVec<TValue> = inputs
            .into_iter()
            .map(|input| {
                tract_ndarray::ArrayD::from_shape_vec(input.shape, input.data)
                    .map(|array| Tensor::from(array).into())
                    .map_err(|e| format!("bad input shape: {e}"))
            })
            .collect::<Result<_, _>>()?;

        let outputs = self.plan.run(values).map_err(|e| e.to_string())?;

        outputs
            .iter()
            .zip(&self.output_names)
            .map(|(value, name)| {
                let view = value
                    .to_array_view::<f32>()
                    .map_err(|e| format!("output `{name}` is not f32: {e}"))?;
                Ok(OutputTensor::new(name.clone(), view.iter().copied().collect()))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "onnx_engine_tests.rs"]
mod onnx_engine_tests;
