//! Single-parent reproduction with weight mutation.

use super::network::{Layer, Network, Neuron};
use rand::Rng;

impl Network {
    /// Copy this network with every weight nudged by
    /// `(u - 0.5) * mutation_rate`, `u` uniform in [0, 1).
    ///
    /// The child keeps the parent's shape; the parent is left untouched.
    pub fn reproduce<R: Rng + ?Sized>(&self, mutation_rate: f32, rng: &mut R) -> Network {
        let layers = self
            .layers()
            .iter()
            .map(|layer| {
                Layer::new(
                    layer
                        .neurons
                        .iter()
                        .map(|neuron| {
                            Neuron::with_weights(
                                neuron
                                    .weights
                                    .iter()
                                    .map(|&w| w + (rng.gen::<f32>() - 0.5) * mutation_rate)
                                    .collect(),
                            )
                        })
                        .collect(),
                )
            })
            .collect();

        // Same widths and fan-outs as a network that already passed validation
        Network::from_parts_unchecked(layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_reproduce_preserves_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        for _ in 0..20 {
            let shape = Network::random_shape(8, 4, 4, 8, &mut rng);
            let parent = Network::new(&shape, &mut rng).unwrap();
            let child = parent.reproduce(0.15, &mut rng);
            assert_eq!(child.shape(), parent.shape());
            assert!(child.is_valid());
        }
    }

    #[test]
    fn test_mutation_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let rate = 0.15;
        let parent = Network::new(&[8, 5, 4], &mut rng).unwrap();
        let child = parent.reproduce(rate, &mut rng);

        for (pl, cl) in parent.layers().iter().zip(child.layers()) {
            for (pn, cn) in pl.neurons.iter().zip(&cl.neurons) {
                assert_eq!(pn.weights.len(), cn.weights.len());
                for (pw, cw) in pn.weights.iter().zip(&cn.weights) {
                    assert!((cw - pw).abs() <= rate / 2.0 + 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_parent_untouched() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let parent = Network::new(&[8, 3, 4], &mut rng).unwrap();
        let before = parent.clone();
        let child = parent.reproduce(0.15, &mut rng);

        assert_eq!(parent, before);
        assert_ne!(child, parent);
    }

    #[test]
    fn test_zero_rate_copies_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let parent = Network::new(&[8, 4], &mut rng).unwrap();
        let child = parent.reproduce(0.0, &mut rng);
        assert_eq!(child, parent);
    }
}
