use anyhow::Result;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

/// Feed-forward demand model: QoS features in, per-kind resource demand
/// out. Layer shapes follow the reference architecture (6 -> 64 -> 32 ->
/// 16 -> 3) with ReLU activations and a linear output head.
#[derive(Debug, Clone)]
pub struct DemandNet {
    pub model_version: String,
    pub input_size: usize,
    pub output_size: usize,
    pub weights: NetWeights,
}

#[derive(Debug, Clone)]
pub struct NetWeights {
    pub hidden: Vec<(DMatrix<f64>, DVector<f64>)>,
    pub output: (DMatrix<f64>, DVector<f64>),
}

const HIDDEN_SIZES: [usize; 3] = [64, 32, 16];
const INPUT_SIZE: usize = 6;
const OUTPUT_SIZE: usize = 3;

impl DemandNet {
    pub async fn load_from_file(path: &str) -> Result<Self> {
        info!("Loading demand model from {}", path);

        // Mock loader: the serving path only needs a forward pass, so a
        // randomly initialized network stands in for trained weights.
        use rand::Rng;
        let mut rng = rand::thread_rng();

        let mut hidden = Vec::with_capacity(HIDDEN_SIZES.len());
        let mut fan_in = INPUT_SIZE;
        for size in HIDDEN_SIZES {
            let weights = DMatrix::from_fn(size, fan_in, |_, _| rng.gen_range(-0.1..0.1));
            let biases = DVector::from_fn(size, |_, _| rng.gen_range(-0.1..0.1));
            hidden.push((weights, biases));
            fan_in = size;
        }

        let output_weights = DMatrix::from_fn(OUTPUT_SIZE, fan_in, |_, _| rng.gen_range(-0.1..0.1));
        let output_biases = DVector::from_fn(OUTPUT_SIZE, |_, _| rng.gen_range(-0.1..0.1));

        Ok(Self {
            model_version: "v1.0.0".to_string(),
            input_size: INPUT_SIZE,
            output_size: OUTPUT_SIZE,
            weights: NetWeights {
                hidden,
                output: (output_weights, output_biases),
            },
        })
    }

    pub fn forward(&self, features: &DVector<f64>) -> DVector<f64> {
        debug!("Running demand model inference");

        let mut activation = features.clone();
        for (weights, biases) in &self.weights.hidden {
            activation = (weights * activation + biases).map(relu);
        }

        let (output_weights, output_biases) = &self.weights.output;
        output_weights * activation + output_biases
    }
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}
