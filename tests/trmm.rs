use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use trmm::layout::at;
use trmm::trmm::{
    par_trmm, trmm, trmm_reference, trmm_with_config, Accumulation, LoopOrder, TrmmConfig,
};
use trmm::verify::{diff_report, fill_random, verify, ERROR_THRESHOLD};
use trmm::{LANE_COUNT, OBSERVED_BLOCK_SIZES};

/// Problem sizes covering single rows/columns, sub-vector widths, ragged
/// multiples of the vector width and sizes spanning several tiles.
const SIZES: &[(usize, usize)] = &[
    (1, 1),
    (1, 9),
    (9, 1),
    (5, 3),
    (8, 8),
    (13, 7),
    (33, 17),
    (130, 9),
    (201, 4),
];

/// Every valid configuration for one block size.
fn all_configs(block_size: usize) -> Vec<TrmmConfig> {
    let mut configs = Vec::new();
    for order in [LoopOrder::Jpi, LoopOrder::Jip, LoopOrder::Ipj] {
        for vectorize in [true, false] {
            let config = TrmmConfig::new(order, block_size)
                .unwrap()
                .with_vectorize(vectorize);
            configs.push(config);
            if order == LoopOrder::Jip {
                configs.push(config.with_accumulation(Accumulation::LocalReduce).unwrap());
            }
        }
    }
    configs
}

/// Lower-triangular `A` with positive entries and NaN above the diagonal,
/// positive dense `B`. Positive data keeps the relative error meaningful.
fn problem(m: usize, n: usize, seed: u64) -> (Vec<f32>, Vec<f32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = vec![f32::NAN; m * m];
    for p in 0..m {
        for i in p..m {
            a[at(i, p, m)] = rng.random_range(0.0..1.0);
        }
    }
    let b = (0..m * n).map(|_| rng.random_range(0.0..1.0)).collect();
    (a, b)
}

fn reference(m: usize, n: usize, a: &[f32], b: &[f32]) -> Vec<f32> {
    let mut c = vec![0.0; m * n];
    trmm_reference(m, n, a, b, &mut c);
    c
}

fn identity_lower(m: usize) -> Vec<f32> {
    let mut a = vec![f32::NAN; m * m];
    for p in 0..m {
        for i in p..m {
            a[at(i, p, m)] = if i == p { 1.0 } else { 0.0 };
        }
    }
    a
}

#[test]
fn test_identity_returns_b_for_every_config() {
    let m = 4;
    let a = identity_lower(m);
    let b: Vec<f32> = (1..=16).map(|x| x as f32).collect();

    for block_size in OBSERVED_BLOCK_SIZES {
        for config in all_configs(block_size) {
            let mut c = vec![f32::NAN; m * m];
            trmm_with_config(m, m, &a, &b, &mut c, &config);
            assert_eq!(c, b, "{:?}", config);
        }
    }
}

#[test]
fn test_two_by_one_for_every_config() {
    let a = [2.0, 3.0, f32::NAN, 4.0];
    let b = [5.0, 6.0];

    for config in all_configs(8) {
        let mut c = [f32::NAN; 2];
        trmm_with_config(2, 1, &a, &b, &mut c, &config);
        assert_eq!(c, [10.0, 39.0], "{:?}", config);
    }
}

#[test]
fn test_matches_reference_for_every_config() {
    for (seed, &(m, n)) in SIZES.iter().enumerate() {
        let (a, b) = problem(m, n, seed as u64);
        let expected = reference(m, n, &a, &b);

        for block_size in [8, 12, 128, 1024] {
            for config in all_configs(block_size) {
                let mut c = vec![f32::NAN; m * n];
                trmm_with_config(m, n, &a, &b, &mut c, &config);

                let verdict = verify(m, n, &expected, &c);
                assert!(
                    verdict.passed,
                    "{}x{} {:?}: max diff {:e}, first bad cells {:?}",
                    m,
                    n,
                    config,
                    verdict.max_diff,
                    diff_report(&expected, &c, ERROR_THRESHOLD)
                        .into_iter()
                        .take(4)
                        .collect::<Vec<_>>()
                );
            }
        }
    }
}

#[test]
fn test_default_entry_point() {
    let (m, n) = (150, 11);
    let (a, b) = problem(m, n, 99);
    let expected = reference(m, n, &a, &b);

    let mut c = vec![0.0; m * n];
    trmm(m, n, &a, &b, &mut c);

    assert!(verify(m, n, &expected, &c).passed);
}

#[test]
fn test_upper_triangle_is_never_read() {
    let (m, n) = (37, 6);
    let (a_nan, b) = problem(m, n, 5);

    // Same lower triangle, random finite junk above the diagonal.
    let mut rng = StdRng::seed_from_u64(6);
    let mut junk = vec![0.0; m * m];
    fill_random(&mut junk, &mut rng);
    let mut a_junk = a_nan.clone();
    for p in 0..m {
        for i in 0..p {
            a_junk[at(i, p, m)] = junk[at(i, p, m)] * 1e6;
        }
    }

    for config in all_configs(8).into_iter().chain(all_configs(128)) {
        let mut with_nan = vec![0.0; m * n];
        let mut with_junk = vec![0.0; m * n];
        trmm_with_config(m, n, &a_nan, &b, &mut with_nan, &config);
        trmm_with_config(m, n, &a_junk, &b, &mut with_junk, &config);

        assert!(with_nan.iter().all(|x| x.is_finite()), "{:?}", config);
        assert_eq!(with_nan, with_junk, "{:?}", config);
    }
}

#[test]
fn test_repeated_calls_are_identical() {
    let (m, n) = (45, 10);
    let (a, b) = problem(m, n, 17);

    for config in all_configs(16) {
        let mut first = vec![0.0; m * n];
        trmm_with_config(m, n, &a, &b, &mut first, &config);

        // Reuse the dirty output buffer: nothing from the first call may leak in.
        let mut second = first.clone();
        trmm_with_config(m, n, &a, &b, &mut second, &config);

        assert_eq!(first, second, "{:?}", config);
    }
}

#[test]
fn test_output_is_dense() {
    // A of all ones and B of all ones: C[i, j] = i + 1 in every column,
    // including rows above any column index.
    let (m, n) = (20, 30);
    let mut a = vec![f32::NAN; m * m];
    for p in 0..m {
        for i in p..m {
            a[at(i, p, m)] = 1.0;
        }
    }
    let b = vec![1.0; m * n];

    for config in all_configs(8) {
        let mut c = vec![f32::NAN; m * n];
        trmm_with_config(m, n, &a, &b, &mut c, &config);
        for j in 0..n {
            for i in 0..m {
                assert_eq!(c[at(i, j, m)], (i + 1) as f32, "({}, {}) {:?}", i, j, config);
            }
        }
    }
}

#[test]
fn test_sub_vector_width_sizes() {
    for m in 1..LANE_COUNT {
        for n in [1, 2, LANE_COUNT - 1] {
            let (a, b) = problem(m, n, (m * 10 + n) as u64);
            let expected = reference(m, n, &a, &b);

            for config in all_configs(8) {
                let mut c = vec![f32::NAN; m * n];
                trmm_with_config(m, n, &a, &b, &mut c, &config);
                assert!(verify(m, n, &expected, &c).passed, "{}x{} {:?}", m, n, config);
            }
        }
    }
}

#[test]
fn test_parallel_matches_serial() {
    let (m, n) = (70, 53);
    let (a, b) = problem(m, n, 23);

    for config in all_configs(16) {
        let mut serial = vec![0.0; m * n];
        trmm_with_config(m, n, &a, &b, &mut serial, &config);

        let mut parallel = vec![f32::NAN; m * n];
        par_trmm(m, n, &a, &b, &mut parallel, &config);

        assert_eq!(serial, parallel, "{:?}", config);
    }
}

#[test]
fn test_matches_ndarray_dot() {
    use ndarray::Array2;

    let (m, n) = (64, 24);
    let (a, b) = problem(m, n, 31);

    let dense_a = Array2::from_shape_fn((m, m), |(i, p)| if p <= i { a[at(i, p, m)] } else { 0.0 });
    let dense_b = Array2::from_shape_fn((m, n), |(p, j)| b[at(p, j, m)]);
    let expected = dense_a.dot(&dense_b);

    let mut c = vec![0.0; m * n];
    trmm(m, n, &a, &b, &mut c);

    for ((i, j), &value) in expected.indexed_iter() {
        let actual = c[at(i, j, m)];
        assert!(
            (actual - value).abs() <= ERROR_THRESHOLD * value.abs().max(1.0),
            "({}, {}): {} vs {}",
            i,
            j,
            actual,
            value
        );
    }
}

#[test]
fn test_invalid_configs_are_rejected() {
    assert!(TrmmConfig::new(LoopOrder::Jip, 0).is_err());
    assert!(TrmmConfig::new(LoopOrder::Jpi, 8)
        .unwrap()
        .with_accumulation(Accumulation::LocalReduce)
        .is_err());
    assert!(TrmmConfig::new(LoopOrder::Ipj, 8)
        .unwrap()
        .with_accumulation(Accumulation::LocalReduce)
        .is_err());
}

#[test]
fn test_huge_block_size_serial_and_parallel() {
    let (m, n) = (20, 3);
    let (a, b) = problem(m, n, 57);
    let expected = reference(m, n, &a, &b);

    for order in [LoopOrder::Jpi, LoopOrder::Jip, LoopOrder::Ipj] {
        let config = TrmmConfig::new(order, usize::MAX / 2).unwrap();

        let mut serial = vec![0.0; m * n];
        trmm_with_config(m, n, &a, &b, &mut serial, &config);
        assert!(verify(m, n, &expected, &serial).passed, "{:?}", config);

        let mut parallel = vec![f32::NAN; m * n];
        par_trmm(m, n, &a, &b, &mut parallel, &config);
        assert_eq!(serial, parallel, "{:?}", config);
    }
}
