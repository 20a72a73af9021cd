// ============================================================
// Layer 5 — Feed-Forward Activation Strategy
// ============================================================
// The nonlinearity between the two feed-forward linears is a
// selectable strategy: configs and the CLI name one of the
// variants below, and the feed-forward module applies it to
// whatever backend it runs on.
//
// A backend-polymorphic function value cannot be stored in a
// Burn Module (a stored fn pointer could not cross the
// autodiff → inference backend boundary that `.valid()`
// performs), so the strategy is a closed enum: adding a
// nonlinearity means adding a variant here. The enum carries
// no tensors, so it rides inside modules via `Ignored`.

use anyhow::{bail, Result};
use burn::prelude::*;
use burn::tensor::activation;
use serde::{Deserialize, Serialize};

/// Named nonlinearity applied inside the feed-forward network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Gelu,
    Silu,
    LeakyRelu,
}

impl Activation {
    /// Apply this nonlinearity elementwise.
    pub fn apply<B: Backend>(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        match self {
            Activation::Relu      => activation::relu(x),
            Activation::Gelu      => activation::gelu(x),
            Activation::Silu      => activation::silu(x),
            Activation::LeakyRelu => activation::leaky_relu(x, 0.01),
        }
    }

    /// Parse a user-facing name ("relu", "gelu", ...).
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "relu"       => Ok(Activation::Relu),
            "gelu"       => Ok(Activation::Gelu),
            "silu"       => Ok(Activation::Silu),
            "leaky_relu" => Ok(Activation::LeakyRelu),
            other => bail!(
                "Unknown activation '{other}' — expected one of: relu, gelu, silu, leaky_relu"
            ),
        }
    }
}
