extern crate nalgebra as na;
use color_eyre::eyre::Result;

use std::path::Path;
use na::{DMatrix, DVector};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tval::{Float, FunctionOperator, Shape, Tval3, TvOperators};
use tval::io::{load_options, write_diagnostics, write_frame_to_csv};

/// Ellipse and rectangle on a dark background, the rectangle shifted by `shift` columns.
fn phantom(rows: usize, cols: usize, shift: usize) -> DMatrix<Float> {
    let (ci, cj) = (rows as Float/2.0, cols as Float/2.0);
    DMatrix::<Float>::from_fn(rows, cols, |i, j| {
        let (y, x) = ((i as Float - ci)/(0.4*rows as Float), (j as Float - cj)/(0.3*cols as Float));
        let mut v = 0.0;
        if x*x + y*y <= 1.0 {
            v += 0.5;
        }
        if i >= rows/3 && i < rows/2 && j >= cols/3 + shift && j < 2*cols/3 + shift {
            v += 0.5;
        }
        v
    })
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let options = load_options(Path::new("demos/config/phantom_recovery.yaml"))?;
    let (rows, cols) = (16, 16);
    let frames = (0..3).map(|k| phantom(rows, cols, k)).collect::<Vec<DMatrix<Float>>>();
    let (shape, truth) = Shape::from_frames(&frames)?;
    let m = (0.4*shape.len() as Float) as usize;

    let mut rng = StdRng::seed_from_u64(7);
    let normal = Normal::new(0.0, 1.0)?;
    let sensing = DMatrix::<Float>::from_fn(m, shape.len(), |_, _| normal.sample(&mut rng));
    let b = &sensing*&truth;

    let forward_matrix = sensing.clone();
    let adjoint_matrix = sensing;
    let operator = FunctionOperator::new(
        m,
        shape.len(),
        Box::new(move |x: &DVector<Float>| &forward_matrix*x),
        Box::new(move |y: &DVector<Float>| adjoint_matrix.tr_mul(y)));

    println!("{}", options);
    let reconstruction = Tval3::new(options)
        .with_operators(TvOperators::temporal())
        .with_ground_truth(truth.clone())
        .solve(&operator, &b, shape)?;

    println!("measurements: {} of {}", m, shape.len());
    println!("iterations: {}, relative error: {:e}", reconstruction.diagnostics.itr, reconstruction.relative_error(&truth));

    std::fs::create_dir_all("output")?;
    for (k, frame) in frames.iter().enumerate() {
        write_frame_to_csv(Path::new(&format!("output/phantom_original_{}.csv", k)), frame)?;
        write_frame_to_csv(Path::new(&format!("output/phantom_recovered_{}.csv", k)), &reconstruction.frame(k)?)?;
    }
    write_diagnostics(Path::new("output/phantom_diagnostics.yaml"), &reconstruction.diagnostics)?;

    Ok(())
}
