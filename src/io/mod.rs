extern crate nalgebra as na;

use std::path::Path;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use na::DMatrix;
use crate::Float;
use crate::error::Result;
use crate::numerics::tval::{Diagnostics, Options};

/// Reads solver options from YAML. Missing keys keep their defaults.
pub fn load_options(file_path: &Path) -> Result<Options> {
    let contents = fs::read_to_string(file_path)?;
    let options: Options = serde_yaml::from_str(&contents)?;
    options.validate()?;
    Ok(options)
}

pub fn write_diagnostics(file_path: &Path, diagnostics: &Diagnostics) -> Result<()> {
    let serialized = serde_yaml::to_string(diagnostics)?;
    fs::write(file_path, serialized)?;
    Ok(())
}

/// Writes a frame row by row, one comma-separated line per row.
pub fn write_frame_to_csv(file_path: &Path, frame: &DMatrix<Float>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(file_path)?);
    for row in frame.row_iter() {
        let line = row.iter().map(|v| format!("{:e}", v)).collect::<Vec<String>>().join(",");
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn frame_is_written_row_by_row() {
        let path = env::temp_dir().join(format!("tval_frame_{}.csv", std::process::id()));
        let frame = DMatrix::<Float>::from_fn(3, 4, |i, j| (i*4 + j) as Float - 2.5);
        write_frame_to_csv(&path, &frame).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let rows = contents.lines()
            .map(|line| line.split(',').map(|v| v.parse::<Float>().unwrap()).collect::<Vec<Float>>())
            .collect::<Vec<Vec<Float>>>();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![-2.5, -1.5, -0.5, 0.5]);
        assert_eq!(rows[2], vec![5.5, 6.5, 7.5, 8.5]);
    }

    #[test]
    fn options_from_yaml_file() {
        let path = env::temp_dir().join(format!("tval_options_{}.yaml", std::process::id()));
        fs::write(&path, "beta0: 1.0\nmu0: 2.0\nmaxit: 40\nnonneg: true\n").unwrap();
        let options = load_options(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(options.maxit, 40);
        assert!(options.nonneg);
        assert_eq!(options.mu0, Some(2.0));
        assert_eq!(options.mu, 256.0);
    }
}
