//! Distributed containers driven through the SPMD launcher

use spalg::blas2::mxv;
use spalg::bsp1d::dot;
use spalg::io::build_matrix_unique;
use spalg::{
    Config, DistMatrix, DistVector, IoMode, Launcher, Matrix, Phase, PlusMonoid, PlusTimes, Rc, Vector,
    DENSE, NO_OPERATION, TRANSPOSE_MATRIX,
};

#[test]
fn test_distributed_dot_large() {
    let n = 100_000;
    for p in 1..=4 {
        let results = Launcher::new(p, IoMode::Sequential)
            .unwrap()
            .exec(|ctx| {
                let mut x = DistVector::<i64>::new(ctx, n);
                let mut y = DistVector::<i64>::new(ctx, n);
                x.set_scalar(1)?;
                y.set_scalar(2)?;
                let mut alpha = 0;
                dot(ctx, &mut alpha, &x, &y, PlusTimes::<i64>::new(), NO_OPERATION)?;
                Ok(alpha)
            })
            .unwrap();
        assert_eq!(results, vec![200_000; p], "P = {}", p);
    }
}

#[test]
fn test_local_parts_cover_global_size() {
    let n = 1_000;
    let results = Launcher::new(3, IoMode::Sequential)
        .unwrap()
        .exec(|ctx| {
            let v = DistVector::<u8>::new(ctx, n);
            Ok(v.local().size())
        })
        .unwrap();
    assert_eq!(results.iter().sum::<usize>(), n);
}

#[test]
fn test_parallel_build_matches_shared_memory() {
    // Lower bidiagonal matrix with entries i+1 on the diagonal and 1 below
    let n = 300;
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();
    for i in 0..n {
        rows.push(i);
        cols.push(i);
        vals.push(i as i64 + 1);
        if i > 0 {
            rows.push(i);
            cols.push(i - 1);
            vals.push(1);
        }
    }

    let mut a = Matrix::new(n, n);
    build_matrix_unique(&mut a, rows.clone(), cols.clone(), vals.clone(), IoMode::Sequential)
        .unwrap();
    let x = Vector::from_dense((0..n as i64).collect());
    let mut expected = Vector::new(n);
    mxv(&mut expected, &a, &x, PlusTimes::<i64>::new(), NO_OPERATION, Phase::Execute).unwrap();

    let p = 4;
    let results = Launcher::new(p, IoMode::Parallel)
        .unwrap()
        .exec(|ctx| {
            // Each process hands in a disjoint stripe of the triplets
            let stripe = |k: &usize| k % ctx.nprocs() == ctx.pid();
            let pick = |src: &[usize]| -> Vec<usize> {
                src.iter().enumerate().filter(|(k, _)| stripe(k)).map(|(_, &v)| v).collect()
            };
            let my_vals: Vec<i64> =
                vals.iter().enumerate().filter(|(k, _)| stripe(k)).map(|(_, &v)| v).collect();

            let mut a = DistMatrix::new(ctx, n, n);
            a.build_matrix_unique(ctx, pick(&rows), pick(&cols), my_vals)?;

            let mut x = DistVector::new(ctx, n);
            let idx: Vec<usize> = (0..n).filter(|k| stripe(k)).collect();
            let xv: Vec<i64> = idx.iter().map(|&i| i as i64).collect();
            x.build_vector(ctx, idx, xv)?;

            let mut y = DistVector::new(ctx, n);
            a.mxv(ctx, &mut y, &x, PlusTimes::<i64>::new(), NO_OPERATION)?;
            Ok((a.nnz(ctx)?, y.gather_all(ctx)?))
        })
        .unwrap();

    for (nnz, entries) in results {
        assert_eq!(nnz, 2 * n - 1);
        assert_eq!(entries, expected.to_sorted_pairs());
    }
}

#[test]
fn test_distributed_fold() {
    let results = Launcher::new(5, IoMode::Sequential)
        .unwrap()
        .exec(|ctx| {
            let mut v = DistVector::<u64>::new(ctx, 1_000);
            v.build_vector(ctx, 0..1_000, 1..=1_000)?;
            let mut sum = 0;
            v.foldl_to_scalar(ctx, &mut sum, PlusMonoid::<u64>::new(), NO_OPERATION)?;
            Ok(sum)
        })
        .unwrap();
    assert_eq!(results, vec![500_500; 5]);
}

#[test]
fn test_out_of_range_build_fails_everywhere() {
    let err = Launcher::new(2, IoMode::Sequential)
        .unwrap()
        .exec(|ctx| {
            let mut v = DistVector::<i32>::new(ctx, 4);
            v.build_vector(ctx, vec![1, 4], vec![1, 1])?;
            Ok(())
        })
        .unwrap_err();
    assert_eq!(err.rc(), Rc::Mismatch);
}

#[test]
fn test_transposed_mxv_over_two_processes() {
    // Cyclic shift: A[i, (i + 1) % n] = 1, so (Aᵀx)[j] = x[j - 1]
    let n = 8;
    let rows: Vec<usize> = (0..n).collect();
    let cols: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
    let x_vals: Vec<i64> = (1..=n as i64).collect();

    let mut a = Matrix::new(n, n);
    build_matrix_unique(&mut a, rows.clone(), cols.clone(), vec![1i64; n], IoMode::Sequential)
        .unwrap();
    let x = Vector::from_dense(x_vals.clone());
    let mut expected = Vector::new(n);
    mxv(&mut expected, &a, &x, PlusTimes::<i64>::new(), TRANSPOSE_MATRIX, Phase::Execute).unwrap();
    assert_eq!(expected.get(0), Some(&8));

    let config = Config {
        block_size: 2,
        ..Config::default()
    };
    let results = Launcher::new(2, IoMode::Sequential)
        .and_then(|l| l.with_config(config))
        .unwrap()
        .exec(|ctx| {
            let mut a = DistMatrix::new(ctx, n, n);
            a.build_matrix_unique(ctx, rows.clone(), cols.clone(), vec![1i64; n])?;
            let mut x = DistVector::new(ctx, n);
            x.build_vector(ctx, 0..n, x_vals.clone())?;
            let mut y = DistVector::new(ctx, n);
            a.mxv(ctx, &mut y, &x, PlusTimes::<i64>::new(), TRANSPOSE_MATRIX)?;
            y.gather_all(ctx)
        })
        .unwrap();
    for entries in results {
        assert_eq!(entries, expected.to_sorted_pairs());
    }
}

#[test]
fn test_transposed_mxv_rectangular_dense_check() {
    // 3 × 5 with A[i, j] = 1 where j % 3 == i
    let results = Launcher::new(3, IoMode::Sequential)
        .unwrap()
        .exec(|ctx| {
            let mut a = DistMatrix::new(ctx, 3, 5);
            let cols: Vec<usize> = (0..5).collect();
            let rows: Vec<usize> = cols.iter().map(|j| j % 3).collect();
            a.build_matrix_unique(ctx, rows, cols, vec![1i32; 5])?;

            let mut x = DistVector::new(ctx, 3);
            x.build_vector(ctx, 0..3, vec![10, 20, 30])?;
            let mut y = DistVector::new(ctx, 5);
            let ring = PlusTimes::<i32>::new();
            let rc = a.mxv(ctx, &mut y, &x, ring, TRANSPOSE_MATRIX | DENSE).unwrap_err().rc();
            a.mxv(ctx, &mut y, &x, ring, TRANSPOSE_MATRIX)?;
            Ok((rc, y.gather_all(ctx)?))
        })
        .unwrap();
    for (rc, y) in results {
        assert_eq!(rc, Rc::Illegal);
        assert_eq!(y, vec![(0, 10), (1, 20), (2, 30), (3, 10), (4, 20)]);
    }
}
