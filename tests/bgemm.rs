use bgemm::matrix::at;
use bgemm::{
    bgemm, bgemm_naive, bgemm_with_workspace, par_bgemm, BgemmError, BlockConfig, Workspace,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PAD: f32 = -7.0;

type Entry =
    fn(usize, usize, usize, &[u64], usize, &[u64], usize, &mut [f32], usize) -> bgemm::Result<()>;

const ENTRIES: [(&str, Entry); 3] = [
    ("bgemm", bgemm),
    ("bgemm_naive", bgemm_naive),
    ("par_bgemm", par_bgemm),
];

fn random_words(len: usize, rng: &mut StdRng) -> Vec<u64> {
    (0..len).map(|_| rng.random()).collect()
}

/// Random A (k columns, ld = lda) and B (n columns, ld = ldb); padding words are random too.
fn operands(n: usize, k: usize, lda: usize, ldb: usize, seed: u64) -> (Vec<u64>, Vec<u64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    (random_words(lda * k, &mut rng), random_words(ldb * n, &mut rng))
}

fn assert_matches_naive(m: usize, n: usize, k: usize) {
    let (a, b) = operands(n, k, m, k, (m * 1_000_000 + n * 1000 + k) as u64);
    let mut expected = vec![0.0f32; m * n];
    let mut actual = vec![0.0f32; m * n];

    bgemm_naive(m, n, k, &a, m, &b, k, &mut expected, m).unwrap();
    bgemm(m, n, k, &a, m, &b, k, &mut actual, m).unwrap();

    for (idx, (got, want)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(got, want, "C[{idx}] mismatch (m={m}, n={n}, k={k})");
    }
}

#[test]
fn test_all_zero_against_all_one() {
    let a = vec![0u64; 4];
    let b = vec![u64::MAX; 4];
    let mut c = vec![0.0f32; 4];

    bgemm(2, 2, 2, &a, 2, &b, 2, &mut c, 2).unwrap();

    assert_eq!(c, vec![128.0; 4]);
}

#[test]
fn test_remainder_regions() {
    // One full 8x6 tile plus a bottom row, a right column and the corner.
    assert_matches_naive(9, 7, 2);
}

#[test]
fn test_shapes_around_the_tile_grid() {
    for m in [1, 7, 8, 9, 16, 33] {
        for n in [1, 5, 6, 7, 12, 13] {
            assert_matches_naive(m, n, 2);
        }
    }
}

#[test]
fn test_depth_spanning_several_blocks() {
    // Default kc is 32 words; 70 leaves an even remainder, 71 an odd one.
    assert_matches_naive(41, 19, 70);
    assert_matches_naive(41, 19, 71);
    assert_matches_naive(8, 6, 1);
    assert_matches_naive(70, 30, 33);
}

#[test]
fn test_zero_dimensions_leave_c_unchanged() {
    let a = vec![1u64; 64];
    let b = vec![2u64; 64];
    // (m, n, k, lda, ldb, words of A, words of B)
    let cases = [
        (0, 4, 4, 4, 4, 64, 64),
        (4, 0, 4, 4, 4, 64, 64),
        (4, 4, 0, 4, 4, 64, 64),
        (4, 2, 0, 4, 1, 0, 0),
        (4, 7, 0, 4, 1, 0, 0),
        (0, 0, 0, 1, 1, 0, 0),
    ];

    for (name, entry) in ENTRIES {
        for (m, n, k, lda, ldb, a_len, b_len) in cases {
            let mut c = vec![3.0f32; 32];
            entry(m, n, k, &a[..a_len], lda, &b[..b_len], ldb, &mut c, 4).unwrap();
            assert!(
                c.iter().all(|&x| x == 3.0),
                "{name}: m={m} n={n} k={k} wrote into C"
            );
        }
    }
}

#[test]
fn test_disjoint_depth_ranges_accumulate() {
    let (m, n, k1, k2) = (13, 11, 6, 5);
    let k = k1 + k2;
    let (a, b) = operands(n, k, m, k, 99);

    let mut once = vec![0.0f32; m * n];
    bgemm(m, n, k, &a, m, &b, k, &mut once, m).unwrap();

    // A's first k1 columns and B's first k1 rows, then the rest.
    let mut twice = vec![0.0f32; m * n];
    bgemm(m, n, k1, &a, m, &b, k, &mut twice, m).unwrap();
    bgemm(m, n, k2, &a[at(0, k1, m)..], m, &b[k1..], k, &mut twice, m).unwrap();

    assert_eq!(twice, once);
}

#[test]
fn test_leading_dimensions_and_padding() {
    let (m, n, k) = (10, 8, 5);
    let (lda, ldb, ldc) = (m + 3, k + 2, m + 4);
    let (a, b) = operands(n, k, lda, ldb, 5);

    // Dense copies for the reference computation.
    let mut a_dense = vec![0u64; m * k];
    let mut b_dense = vec![0u64; k * n];
    for p in 0..k {
        for i in 0..m {
            a_dense[at(i, p, m)] = a[at(i, p, lda)];
        }
    }
    for j in 0..n {
        for p in 0..k {
            b_dense[at(p, j, k)] = b[at(p, j, ldb)];
        }
    }
    let mut expected = vec![0.0f32; m * n];
    bgemm_naive(m, n, k, &a_dense, m, &b_dense, k, &mut expected, m).unwrap();

    let mut c = vec![PAD; ldc * n];
    for j in 0..n {
        for i in 0..m {
            c[at(i, j, ldc)] = 0.0;
        }
    }
    bgemm(m, n, k, &a, lda, &b, ldb, &mut c, ldc).unwrap();

    for j in 0..n {
        for i in 0..ldc {
            let got = c[at(i, j, ldc)];
            if i < m {
                assert_eq!(got, expected[at(i, j, m)], "C({i}, {j})");
            } else {
                assert_eq!(got, PAD, "padding at ({i}, {j}) was written");
            }
        }
    }
}

#[test]
fn test_parallel_matches_serial() {
    for &(m, n, k) in &[(1, 1, 1), (9, 7, 2), (64, 100, 40), (33, 257, 3)] {
        let (a, b) = operands(n, k, m, k, 11);
        let mut serial = vec![1.0f32; m * n];
        let mut parallel = vec![1.0f32; m * n];

        bgemm(m, n, k, &a, m, &b, k, &mut serial, m).unwrap();
        par_bgemm(m, n, k, &a, m, &b, k, &mut parallel, m).unwrap();

        assert_eq!(parallel, serial, "m={m} n={n} k={k}");
    }
}

#[test]
fn test_custom_block_sizes_match_naive() {
    let (m, n, k) = (37, 23, 19);
    let (a, b) = operands(n, k, m, k, 3);
    let mut expected = vec![0.0f32; m * n];
    bgemm_naive(m, n, k, &a, m, &b, k, &mut expected, m).unwrap();

    let mut ws = Workspace::new();
    for (kc, mc) in [(2, 1), (2, 8), (4, 9), (18, 40), (64, 64)] {
        let config = BlockConfig::new(kc, mc).unwrap();
        let mut c = vec![0.0f32; m * n];
        bgemm_with_workspace(&mut ws, &config, m, n, k, &a, m, &b, k, &mut c, m).unwrap();
        assert_eq!(c, expected, "kc={kc} mc={mc}");
    }
}

#[test]
fn test_invalid_views_are_rejected() {
    let a = vec![0u64; 8];
    let b = vec![0u64; 8];
    let mut c = vec![0.0f32; 8];

    // lda < m
    let err = bgemm(4, 2, 2, &a, 3, &b, 2, &mut c, 4).unwrap_err();
    assert!(matches!(err, BgemmError::ShapeError { ld: 3, .. }));

    // C too short for 4 x 3
    let err = par_bgemm(4, 3, 2, &a, 4, &b, 2, &mut c, 4).unwrap_err();
    assert!(matches!(err, BgemmError::ShapeError { len: 8, .. }));
    assert!(c.iter().all(|&x| x == 0.0));
}
