use rand::{rngs::StdRng, Rng, SeedableRng};

use handgrad::{Dataset, Matrix, NetworkSpec, NullSink, OptimizerKind, TrainConfig, Trainer};

/// Two noisy clusters in the plane, centred at (-1, -1) and (1, 1).
fn blobs(n: usize, rng: &mut StdRng) -> Dataset {
    let mut features = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let class = i % 2;
        let centre = if class == 0 { -1.0 } else { 1.0 };
        features.push(vec![
            centre + rng.gen_range(-0.8..0.8),
            centre + rng.gen_range(-0.8..0.8),
        ]);
        labels.push(class);
    }
    Dataset::new(features, labels).expect("generated samples are well formed")
}

fn main() {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(3);
    let train = blobs(400, &mut rng);
    let test = blobs(100, &mut rng);

    let spec = NetworkSpec { input_size: 2, output_size: 2, hidden_layers: vec![8] };
    let network = spec.build().expect("valid network spec");

    for optimiser in ["sgd", "momentum", "nesterov", "rmsprop", "adam", "nadam"] {
        let config = TrainConfig {
            epochs: 20,
            learning_rate: if optimiser == "sgd" { 0.05 } else { 0.01 },
            batch_size: 16,
            optimiser: optimiser.parse::<OptimizerKind>().expect("known optimiser"),
            seed: Some(7),
            metrics_interval: 25,
            ..TrainConfig::default()
        };

        let mut trainer = Trainer::new(network.clone(), NullSink);
        let history = trainer.train(&train, &config).expect("training succeeds");
        let last_loss = history.train_loss.last().copied().unwrap_or(f64::NAN);

        let eval = trainer.network().evaluate(&test, 0.0).expect("evaluation succeeds");
        println!(
            "{optimiser:>8}: train loss {last_loss:.4}, test accuracy {:.3}",
            eval.accuracy
        );
    }

    let mut trainer = Trainer::new(network, NullSink);
    trainer.train(&train, &TrainConfig { epochs: 20, seed: Some(7), ..TrainConfig::default() })
        .expect("training succeeds");
    for point in [[-1.0, -1.0], [0.2, 0.1], [1.0, 1.0]] {
        let probs = trainer.network()
            .predict(&Matrix::column_vector(&point))
            .expect("input matches the network");
        println!("{point:?} -> P(class 1) = {:.4}", probs.data[1][0]);
    }
}
