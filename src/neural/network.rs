//! Network structure and forward propagation.

use crate::error::{Result, SimError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A scalar neuron with outgoing weights into the next layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    /// Activation from the most recent forward pass
    pub value: f32,
    /// One weight per neuron of the next layer; empty in the output layer
    pub weights: Vec<f32>,
}

impl Neuron {
    /// Neuron with `fan_out` weights drawn uniformly from [-1, 1]
    pub fn random<R: Rng + ?Sized>(fan_out: usize, rng: &mut R) -> Self {
        Self {
            value: 0.0,
            weights: (0..fan_out).map(|_| rng.gen_range(-1.0f32..=1.0)).collect(),
        }
    }

    pub fn with_weights(weights: Vec<f32>) -> Self {
        Self { value: 0.0, weights }
    }
}

/// One layer of neurons
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub neurons: Vec<Neuron>,
}

impl Layer {
    pub fn new(neurons: Vec<Neuron>) -> Self {
        Self { neurons }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.neurons.len()
    }
}

/// Variable-topology feedforward network
///
/// Layer 0 takes the raw inputs, the last layer holds the outputs. The
/// layer widths are fixed once the network exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct Network {
    layers: Vec<Layer>,
}

/// Unchecked serialized form, validated on the way in
#[derive(Deserialize)]
struct RawNetwork {
    layers: Vec<Layer>,
}

impl TryFrom<RawNetwork> for Network {
    type Error = SimError;

    fn try_from(raw: RawNetwork) -> Result<Self> {
        Network::from_layers(raw.layers)
    }
}

impl Network {
    /// Build a network with random weights from a list of layer widths
    pub fn new<R: Rng + ?Sized>(widths: &[usize], rng: &mut R) -> Result<Self> {
        check_widths(widths)?;

        let layers = widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let fan_out = widths.get(i + 1).copied().unwrap_or(0);
                Layer::new((0..width).map(|_| Neuron::random(fan_out, rng)).collect())
            })
            .collect();

        Ok(Self { layers })
    }

    /// Build a network from explicit layers, checking every weight vector
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        let shape: Vec<usize> = layers.iter().map(Layer::width).collect();
        check_widths(&shape)?;

        for (i, layer) in layers.iter().enumerate() {
            let fan_out = shape.get(i + 1).copied().unwrap_or(0);
            if let Some(j) = layer.neurons.iter().position(|n| n.weights.len() != fan_out) {
                return Err(SimError::Shape(format!(
                    "neuron {} of layer {} has {} weights, expected {}",
                    j,
                    i,
                    layer.neurons[j].weights.len(),
                    fan_out
                )));
            }
        }

        Ok(Self { layers })
    }

    pub(super) fn from_parts_unchecked(layers: Vec<Layer>) -> Self {
        debug_assert!(!layers.is_empty());
        Self { layers }
    }

    /// Pick a founder layout: fixed input and output widths around
    /// zero or more random hidden layers.
    pub fn random_shape<R: Rng + ?Sized>(
        n_inputs: usize,
        n_outputs: usize,
        max_layers: usize,
        max_width: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        // floor(u * max_layers) - 1, so half of all founders start without hidden layers
        let hidden = rng.gen_range(0..max_layers.max(1)).saturating_sub(1);

        let mut shape = Vec::with_capacity(hidden + 2);
        shape.push(n_inputs);
        shape.extend((0..hidden).map(|_| rng.gen_range(1..=max_width.max(1))));
        shape.push(n_outputs);
        shape
    }

    /// Forward pass. Stores activations on the neurons and returns the
    /// output layer.
    pub fn predict(&mut self, inputs: &[f32]) -> Result<Vec<f32>> {
        let expected = self.n_inputs();
        if inputs.len() != expected {
            return Err(SimError::InputMismatch {
                expected,
                actual: inputs.len(),
            });
        }

        for (neuron, &input) in self.layers[0].neurons.iter_mut().zip(inputs) {
            neuron.value = input;
        }

        for i in 1..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(i);
            let prev = &done[i - 1];
            for (j, neuron) in rest[0].neurons.iter_mut().enumerate() {
                let sum: f32 = prev.neurons.iter().map(|p| p.value * p.weights[j]).sum();
                neuron.value = sum.tanh();
            }
        }

        Ok(self.outputs())
    }

    /// Output layer activations from the last forward pass
    pub fn outputs(&self) -> Vec<f32> {
        self.layers
            .last()
            .map(|l| l.neurons.iter().map(|n| n.value).collect())
            .unwrap_or_default()
    }

    /// Layer widths, input first
    pub fn shape(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::width).collect()
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn n_inputs(&self) -> usize {
        self.layers[0].width()
    }

    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.layers[self.layers.len() - 1].width()
    }

    /// Number of hidden neurons
    pub fn complexity(&self) -> usize {
        let n = self.layers.len();
        if n <= 2 {
            0
        } else {
            self.layers[1..n - 1].iter().map(Layer::width).sum()
        }
    }

    /// Total number of weights
    pub fn parameter_count(&self) -> usize {
        self.layers.windows(2).map(|w| w[0].width() * w[1].width()).sum()
    }

    /// Check if network is valid (no NaN/Inf)
    pub fn is_valid(&self) -> bool {
        self.layers
            .iter()
            .flat_map(|l| &l.neurons)
            .all(|n| n.weights.iter().all(|w| w.is_finite()))
    }
}

fn check_widths(widths: &[usize]) -> Result<()> {
    if widths.is_empty() {
        return Err(SimError::Shape("network needs at least one layer".to_string()));
    }
    if let Some(i) = widths.iter().position(|&w| w == 0) {
        return Err(SimError::Shape(format!("layer {} has zero width", i)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_construct_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let net = Network::new(&[8, 3, 5, 4], &mut rng).unwrap();

        assert_eq!(net.shape(), vec![8, 3, 5, 4]);
        assert_eq!(net.complexity(), 8);
        assert_eq!(net.parameter_count(), 8 * 3 + 3 * 5 + 5 * 4);

        let widths = net.shape();
        for (i, layer) in net.layers().iter().enumerate() {
            let fan_out = widths.get(i + 1).copied().unwrap_or(0);
            for neuron in &layer.neurons {
                assert_eq!(neuron.weights.len(), fan_out);
                assert!(neuron.weights.iter().all(|w| (-1.0..=1.0).contains(w)));
            }
        }
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!(matches!(Network::new(&[], &mut rng), Err(SimError::Shape(_))));
        assert!(matches!(Network::new(&[8, 0, 4], &mut rng), Err(SimError::Shape(_))));
    }

    #[test]
    fn test_from_layers_checks_weights() {
        let layers = vec![
            Layer::new(vec![Neuron::with_weights(vec![1.0, 2.0])]),
            Layer::new(vec![Neuron::with_weights(vec![])]),
        ];
        assert!(matches!(Network::from_layers(layers), Err(SimError::Shape(_))));
    }

    #[test]
    fn test_predict_zero_vector() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for shape in [vec![8, 4], vec![8, 1, 4], vec![8, 8, 8, 4], vec![3]] {
            let mut net = Network::new(&shape, &mut rng).unwrap();
            let outputs = net.predict(&vec![0.0; shape[0]]).unwrap();
            assert_eq!(outputs.len(), *shape.last().unwrap());
        }
    }

    #[test]
    fn test_predict_hand_wired() {
        // 2 -> 1: tanh(0.5 * 1.0 + 2.0 * -0.25) = tanh(0.0)
        let layers = vec![
            Layer::new(vec![
                Neuron::with_weights(vec![1.0]),
                Neuron::with_weights(vec![-0.25]),
            ]),
            Layer::new(vec![Neuron::with_weights(vec![])]),
        ];
        let mut net = Network::from_layers(layers).unwrap();
        assert_eq!(net.predict(&[0.5, 2.0]).unwrap(), vec![0.0]);
        assert_eq!(net.predict(&[1.0, 0.0]).unwrap(), vec![1.0f32.tanh()]);
    }

    #[test]
    fn test_predict_deterministic() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut net = Network::new(&[8, 6, 4], &mut rng).unwrap();
        let inputs = [0.3, -1.2, 1.0, 50.0, 2.0, 11.5, 3.0, -20.0];

        let first = net.predict(&inputs).unwrap();
        let second = net.predict(&inputs).unwrap();
        let mut copy = net.clone();
        let third = copy.predict(&inputs).unwrap();

        let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
        assert_eq!(bits(&first), bits(&third));
        assert!(first.iter().all(|&x| (-1.0..=1.0).contains(&x)));
    }

    #[test]
    fn test_input_mismatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut net = Network::new(&[8, 4], &mut rng).unwrap();
        match net.predict(&[1.0; 5]) {
            Err(SimError::InputMismatch { expected, actual }) => {
                assert_eq!(expected, 8);
                assert_eq!(actual, 5);
            }
            other => panic!("expected input mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_random_shape_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        for _ in 0..200 {
            let shape = Network::random_shape(8, 4, 4, 8, &mut rng);
            assert!(shape.len() >= 2 && shape.len() <= 4);
            assert_eq!(shape[0], 8);
            assert_eq!(*shape.last().unwrap(), 4);
            assert!(shape[1..shape.len() - 1].iter().all(|&w| (1..=8).contains(&w)));
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let net = Network::new(&[8, 3, 4], &mut rng).unwrap();
        let json = serde_json::to_string(&net).unwrap();
        let back: Network = serde_json::from_str(&json).unwrap();
        assert_eq!(back.shape(), net.shape());
        assert_eq!(back.parameter_count(), net.parameter_count());

        // Input neurons with no weights into the output layer
        let broken = r#"{"layers":[
            {"neurons":[{"value":0.0,"weights":[]},{"value":0.0,"weights":[]}]},
            {"neurons":[{"value":0.0,"weights":[]}]}
        ]}"#;
        assert!(serde_json::from_str::<Network>(broken).is_err());

        let empty = r#"{"layers":[]}"#;
        assert!(serde_json::from_str::<Network>(empty).is_err());
    }
}
