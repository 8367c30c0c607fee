use std::path::Path;

use log::info;
use mnist::{Mnist, MnistBuilder};

use crate::{MlErr, Result};

use super::Dataset;

pub const IMAGE_SIZE: usize = 28;
pub const IMAGE_PIXELS: usize = IMAGE_SIZE * IMAGE_SIZE;
pub const NUM_CLASSES: usize = 10;

const TRAIN_LEN: u32 = 60_000;
const TEST_LEN: u32 = 10_000;

/// The four idx files the loader expects inside the data directory.
const IDX_FILES: [&str; 4] = [
    "train-images-idx3-ubyte",
    "train-labels-idx1-ubyte",
    "t10k-images-idx3-ubyte",
    "t10k-labels-idx1-ubyte",
];

/// Reads the standard MNIST idx files from `dir` and returns the
/// `(train, test)` datasets.
///
/// Pixels are scaled to `[0, 1]` and labels are one-hot encoded, so the
/// returned datasets feed the model directly.
///
/// # Errors
/// Returns `MlErr::Dataset` if any of the four idx files is missing.
pub fn load_mnist(dir: &Path) -> Result<(Dataset, Dataset)> {
    for name in IDX_FILES {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(MlErr::Dataset(format!(
                "missing {} in {}",
                name,
                dir.display()
            )));
        }
    }

    // The loader concatenates its base path with the file names verbatim.
    let base_path = format!("{}/", dir.display());
    let Mnist {
        trn_img,
        trn_lbl,
        tst_img,
        tst_lbl,
        ..
    } = MnistBuilder::new()
        .base_path(&base_path)
        .label_format_one_hot()
        .training_set_length(TRAIN_LEN)
        .validation_set_length(0)
        .test_set_length(TEST_LEN)
        .finalize();

    let train = Dataset::new(
        normalize(&trn_img),
        to_f32(&trn_lbl),
        IMAGE_PIXELS,
        NUM_CLASSES,
    )?;
    let test = Dataset::new(
        normalize(&tst_img),
        to_f32(&tst_lbl),
        IMAGE_PIXELS,
        NUM_CLASSES,
    )?;

    info!(
        "loaded {} training and {} test samples from {}",
        train.len(),
        test.len(),
        dir.display()
    );

    Ok((train, test))
}

fn normalize(pixels: &[u8]) -> Vec<f32> {
    pixels.iter().map(|&p| f32::from(p) / 255.0).collect()
}

fn to_f32(labels: &[u8]) -> Vec<f32> {
    labels.iter().map(|&l| f32::from(l)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_are_reported() {
        let err = load_mnist(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, MlErr::Dataset(_)));
        assert!(err.to_string().contains("train-images-idx3-ubyte"));
    }

    #[test]
    fn normalize_maps_to_unit_interval() {
        assert_eq!(normalize(&[0, 255]), vec![0.0, 1.0]);
    }
}
