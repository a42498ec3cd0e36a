extern crate nalgebra as na;
use color_eyre::eyre::Result;

use std::path::Path;
use na::{DMatrix, DVector};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tval::{Float, Shape, Tval3};
use tval::io::{load_options, write_diagnostics};

fn main() -> Result<()> {
    color_eyre::install()?;

    let options = load_options(Path::new("demos/config/step_recovery.yaml"))?;
    let n = 64;
    let m = 24;

    let truth = DVector::<Float>::from_fn(n, |i, _| match i {
        i if i < 16 => 0.0,
        i if i < 40 => 2.0,
        i if i < 52 => -1.0,
        _ => 0.5
    });

    let mut rng = StdRng::seed_from_u64(42);
    let normal = Normal::new(0.0, 1.0)?;
    let a = DMatrix::<Float>::from_fn(m, n, |_, _| normal.sample(&mut rng));
    let b = &a*&truth;

    println!("{}", options);
    let reconstruction = Tval3::new(options)
        .with_ground_truth(truth.clone())
        .solve(&a, &b, Shape::signal(n))?;

    let diagnostics = &reconstruction.diagnostics;
    println!("iterations: {}, outer cycles: {}", diagnostics.itr, diagnostics.outer_cycles());
    println!("relative error: {:e}", reconstruction.relative_error(&truth));

    std::fs::create_dir_all("output")?;
    write_diagnostics(Path::new("output/step_recovery_diagnostics.yaml"), diagnostics)?;

    Ok(())
}
