//! Feed-forward multi-label classifier.
//!
//! A small dense network with ReLU hidden layers and an output layer of
//! independent sigmoid units, one per label. Labels are not mutually
//! exclusive, so each output unit is its own binary classifier sharing the
//! hidden representation; the loss is the sum over labels of binary
//! cross-entropy, averaged over the batch. Training uses mini-batch Adam
//! for a fixed epoch count. Non-convergence is a quality signal surfaced
//! through the per-epoch metrics, not an error.

use crate::batch::Batcher;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;
const PROB_FLOOR: f64 = 1e-10;

/// One dense layer with its Adam moment estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Dense {
    // out x in
    w: Array2<f64>,
    b: Array1<f64>,
    m_w: Array2<f64>,
    v_w: Array2<f64>,
    m_b: Array1<f64>,
    v_b: Array1<f64>,
}

impl Dense {
    fn new(n_in: usize, n_out: usize, rng: &mut StdRng) -> Self {
        // He initialization for the ReLU stack
        let std = (2.0 / n_in as f64).sqrt();
        let w = Array2::from_shape_fn((n_out, n_in), |_| rng.gen_range(-std..std));
        Dense {
            w,
            b: Array1::zeros(n_out),
            m_w: Array2::zeros((n_out, n_in)),
            v_w: Array2::zeros((n_out, n_in)),
            m_b: Array1::zeros(n_out),
            v_b: Array1::zeros(n_out),
        }
    }
}

/// Multi-label MLP: input -> hidden layers (ReLU) -> V sigmoid outputs.
///
/// Parameters are mutated only by [`MultiLabelNet::train`]; prediction
/// takes `&self`, so a trained network can be shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiLabelNet {
    layers: Vec<Dense>,
    learning_rate: f64,
    timestep: usize,
}

fn relu(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|v| v.max(0.0))
}

fn sigmoid(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

/// Summed-over-labels binary cross-entropy, averaged over the batch.
fn bce_loss(probs: &Array2<f64>, targets: &Array2<f64>) -> f64 {
    let batch_n = probs.nrows() as f64;
    let mut total = 0.0;
    for (&p, &t) in probs.iter().zip(targets.iter()) {
        let p = p.clamp(PROB_FLOOR, 1.0 - PROB_FLOOR);
        total -= t * p.ln() + (1.0 - t) * (1.0 - p).ln();
    }
    total / batch_n
}

/// Bitwise accuracy at a 0.5 threshold: fraction of the V x N individual
/// predictions matching ground truth.
fn binary_accuracy(probs: &Array2<f64>, targets: &Array2<f64>) -> (usize, usize) {
    let correct = probs
        .iter()
        .zip(targets.iter())
        .filter(|(&p, &t)| (p >= 0.5) == (t >= 0.5))
        .count();
    (correct, probs.len())
}

impl MultiLabelNet {
    /// Build an untrained network. `output_dim` is the label-vocabulary
    /// size V.
    pub fn new(
        input_dim: usize,
        hidden_dims: &[usize],
        output_dim: usize,
        learning_rate: f64,
        rng: &mut StdRng,
    ) -> Self {
        let mut sizes = vec![input_dim];
        sizes.extend_from_slice(hidden_dims);
        sizes.push(output_dim);

        let layers = sizes
            .windows(2)
            .map(|pair| Dense::new(pair[0], pair[1], rng))
            .collect();
        MultiLabelNet {
            layers,
            learning_rate,
            timestep: 0,
        }
    }

    pub fn output_dim(&self) -> usize {
        self.layers.last().map(|l| l.w.nrows()).unwrap_or(0)
    }

    /// Per-label probabilities for a batch of feature rows.
    pub fn predict(&self, features: &Array2<f64>) -> Array2<f64> {
        let last = self.layers.len() - 1;
        let mut activation = features.clone();
        for (idx, layer) in self.layers.iter().enumerate() {
            let z = activation.dot(&layer.w.t()) + &layer.b;
            activation = if idx < last { relu(&z) } else { sigmoid(&z) };
        }
        activation
    }

    /// Per-label probabilities for a single feature vector.
    pub fn predict_one(&self, features: &[f64]) -> Vec<f64> {
        let row = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .expect("row vector shape is consistent by construction");
        self.predict(&row).row(0).to_vec()
    }

    /// Forward-only loss and binary accuracy on a held-out partition.
    pub fn evaluate(&self, features: &Array2<f64>, targets: &Array2<f64>) -> (f64, f64) {
        let probs = self.predict(features);
        let loss = bce_loss(&probs, targets);
        let (correct, total) = binary_accuracy(&probs, targets);
        (loss, correct as f64 / total.max(1) as f64)
    }

    /// One Adam step over a mini-batch. Returns the batch loss and the
    /// correct/total bit counts from the forward pass.
    fn train_batch(&mut self, features: &Array2<f64>, targets: &Array2<f64>) -> (f64, usize, usize) {
        let last = self.layers.len() - 1;

        // Forward, keeping activations and pre-activations for backprop
        let mut activations: Vec<Array2<f64>> = vec![features.clone()];
        let mut pre_activations: Vec<Array2<f64>> = Vec::with_capacity(self.layers.len());
        for (idx, layer) in self.layers.iter().enumerate() {
            let z = activations.last().unwrap().dot(&layer.w.t()) + &layer.b;
            let a = if idx < last { relu(&z) } else { sigmoid(&z) };
            pre_activations.push(z);
            activations.push(a);
        }

        let probs = activations.last().unwrap();
        let loss = bce_loss(probs, targets);
        let (correct, total) = binary_accuracy(probs, targets);
        let batch_n = features.nrows() as f64;

        // Sigmoid + binary cross-entropy collapses the output delta to p - y
        let mut delta = probs - targets;
        self.timestep += 1;
        let timestep = self.timestep;
        for idx in (0..self.layers.len()).rev() {
            let grad_w = delta.t().dot(&activations[idx]) / batch_n;
            let grad_b = delta.sum_axis(Axis(0)) / batch_n;

            let next_delta = if idx > 0 {
                let back = delta.dot(&self.layers[idx].w);
                let mask = pre_activations[idx - 1].mapv(|z| if z > 0.0 { 1.0 } else { 0.0 });
                Some(back * mask)
            } else {
                None
            };

            self.adam_step(idx, &grad_w, &grad_b, timestep);
            if let Some(d) = next_delta {
                delta = d;
            }
        }

        (loss, correct, total)
    }

    fn adam_step(&mut self, idx: usize, grad_w: &Array2<f64>, grad_b: &Array1<f64>, timestep: usize) {
        let lr = self.learning_rate;
        let bc1 = 1.0 - BETA1.powi(timestep as i32);
        let bc2 = 1.0 - BETA2.powi(timestep as i32);
        let layer = &mut self.layers[idx];

        layer.m_w = &layer.m_w * BETA1 + grad_w * (1.0 - BETA1);
        layer.v_w = &layer.v_w * BETA2 + &grad_w.mapv(|g| g * g) * (1.0 - BETA2);
        let m_hat = &layer.m_w / bc1;
        let v_hat = &layer.v_w / bc2;
        layer.w = &layer.w - &(m_hat * lr / (v_hat.mapv(f64::sqrt) + EPSILON));

        layer.m_b = &layer.m_b * BETA1 + grad_b * (1.0 - BETA1);
        layer.v_b = &layer.v_b * BETA2 + &grad_b.mapv(|g| g * g) * (1.0 - BETA2);
        let m_hat_b = &layer.m_b / bc1;
        let v_hat_b = &layer.v_b / bc2;
        layer.b = &layer.b - &(m_hat_b * lr / (v_hat_b.mapv(f64::sqrt) + EPSILON));
    }

    /// Train for a fixed number of epochs, printing loss and binary
    /// accuracy on train (and validation, when present) every epoch.
    pub fn train(
        &mut self,
        batcher: &Batcher,
        validation: Option<(&Array2<f64>, &Array2<f64>)>,
        epochs: usize,
        rng: &mut StdRng,
    ) {
        println!(
            "Training multi-label MLP: {} epochs, batch size {}, {} records",
            epochs,
            batcher.batch_size(),
            batcher.num_records()
        );

        for epoch in 0..epochs {
            let mut weighted_loss = 0.0;
            let mut correct = 0usize;
            let mut total = 0usize;
            for (features, targets) in batcher.epoch(rng) {
                let n = features.nrows() as f64;
                let (loss, batch_correct, batch_total) = self.train_batch(&features, &targets);
                weighted_loss += loss * n;
                correct += batch_correct;
                total += batch_total;
            }
            let train_loss = weighted_loss / batcher.num_records().max(1) as f64;
            let train_acc = correct as f64 / total.max(1) as f64;

            match validation {
                Some((features, targets)) => {
                    let (val_loss, val_acc) = self.evaluate(features, targets);
                    println!(
                        "  Epoch {:>3}/{}: loss={:.4} bin_acc={:.2}% | val_loss={:.4} val_bin_acc={:.2}%",
                        epoch + 1,
                        epochs,
                        train_loss,
                        train_acc * 100.0,
                        val_loss,
                        val_acc * 100.0
                    );
                }
                None => println!(
                    "  Epoch {:>3}/{}: loss={:.4} bin_acc={:.2}%",
                    epoch + 1,
                    epochs,
                    train_loss,
                    train_acc * 100.0
                ),
            }
        }
    }
}
