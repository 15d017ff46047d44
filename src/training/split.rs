//! Seeded train/test splitting

use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Split `x`/`y` into train and test partitions after a seeded shuffle.
///
/// The same `(test_size, seed)` pair always yields the same partition, so
/// evaluation can reconstruct exactly the rows training held out. Returns
/// `(x_train, x_test, y_train, y_test)`.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> (Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>) {
    let n = x.nrows();
    let n_test = ((n as f64) * test_size).ceil() as usize;
    let n_test = n_test.min(n);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);

    let x_train = x.select(Axis(0), train_idx);
    let x_test = x.select(Axis(0), test_idx);
    let y_train = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
    let y_test = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

    (x_train, x_test, y_train, y_test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn dataset(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64);
        let y = Array::from_shape_fn(n, |i| i as f64);
        (x, y)
    }

    #[test]
    fn test_split_sizes() {
        let (x, y) = dataset(100);
        let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.2, 42);
        assert_eq!(x_test.nrows(), 20);
        assert_eq!(x_train.nrows(), 80);
        assert_eq!(y_test.len(), 20);
        assert_eq!(y_train.len(), 80);
    }

    #[test]
    fn test_split_is_deterministic() {
        let (x, y) = dataset(50);
        let (_, x_test_a, _, y_test_a) = train_test_split(&x, &y, 0.2, 42);
        let (_, x_test_b, _, y_test_b) = train_test_split(&x, &y, 0.2, 42);
        assert_eq!(x_test_a, x_test_b);
        assert_eq!(y_test_a, y_test_b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let (x, y) = dataset(50);
        let (_, test_a, _, _) = train_test_split(&x, &y, 0.2, 42);
        let (_, test_b, _, _) = train_test_split(&x, &y, 0.2, 7);
        assert_ne!(test_a, test_b);
    }

    #[test]
    fn test_rows_stay_aligned_with_targets() {
        let (x, y) = dataset(30);
        let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.2, 42);
        // y was built as the row index, x as 2*index + column
        for (row, &target) in x_train.outer_iter().zip(y_train.iter()) {
            assert_eq!(row[0], target * 2.0);
        }
        for (row, &target) in x_test.outer_iter().zip(y_test.iter()) {
            assert_eq!(row[0], target * 2.0);
        }
    }
}
