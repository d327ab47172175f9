use std::{env, fs::File, io::BufWriter};

use anyhow::{bail, Context, Result};
use log::{info, warn};

use handgrad::{JsonLinesSink, LogSink, MetricsSink, RunConfig, Trainer};

fn main() -> Result<()> {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        bail!("usage: handgrad <config.json>");
    };
    let config = RunConfig::load_json(&path).with_context(|| format!("loading {path}"))?;

    let Some(paths) = &config.dataset else {
        bail!("{path} names no dataset to train on");
    };
    let train = paths.load_train().context("loading the training set")?;
    let test = paths.load_test().context("loading the test set")?;

    let mut sinks: Vec<Box<dyn MetricsSink>> = vec![Box::new(LogSink)];
    if let Some(metrics_path) = &config.metrics_path {
        let file = File::create(metrics_path).with_context(|| format!("creating {metrics_path}"))?;
        sinks.push(Box::new(JsonLinesSink::new(BufWriter::new(file))));
    }

    let network = config.network.build()?;
    let mut trainer = Trainer::new(network, sinks);
    if let Some(names) = &config.class_names {
        trainer = trainer.with_class_names(names.clone());
    }
    trainer.train(&train, &config.training)?;

    match test {
        Some(test) => {
            let eval = trainer.network().evaluate(&test, config.training.l2_reg_param)?;
            info!("test accuracy {:.4}, loss {:.4} over {} samples", eval.accuracy, eval.loss, test.len());
        }
        None => warn!("no test set configured, skipping evaluation"),
    }

    if let Some(model_path) = &config.model_path {
        trainer.network().save_json(model_path)?;
        info!("saved parameters to {model_path}");
    }

    Ok(())
}
