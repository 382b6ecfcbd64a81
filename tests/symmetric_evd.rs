use assert_approx_eq::assert_approx_eq;
use dyn_stack::{GlobalPodBuffer, PodStack};
use equator::assert;
use rand::prelude::*;
use symevd::{
    linalg::{
        evd::{
            self, compute_symmetric_evd, compute_symmetric_evd_req, compute_tridiag_eigenvalues,
            compute_tridiag_eigenvectors, compute_tridiag_eigenvectors_req,
            eigen_2x2::eigen_2x2,
            reconstruct::{orthogonal_from_tridiag_in_place, orthogonal_from_tridiag_in_place_req},
            tridiag::tridiagonalize_in_place,
            ComputeVectors, Convergence, SymmetricEvdParams, TridiagQrParams,
        },
        jacobi::{apply_rotation_sequence_on_the_left_in_place, JacobiRotation, Pivot},
        Direction,
    },
    mat, ArgumentErrorKind, Mat, MatRef, Side,
};

fn random_symmetric(rng: &mut StdRng, n: usize) -> Mat<f64> {
    let mut a = Mat::zeros(n, n);
    for j in 0..n {
        for i in j..n {
            let x = rng.gen::<f64>() - 0.5;
            a.write(i, j, x);
            a.write(j, i, x);
        }
    }
    a
}

fn diagonal(values: &[f64]) -> Mat<f64> {
    let n = values.len();
    Mat::from_fn(n, n, |i, j| if i == j { values[i] } else { 0.0 })
}

fn reflector(rng: &mut StdRng, n: usize) -> Mat<f64> {
    let v: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() - 0.5).collect();
    let norm2: f64 = v.iter().map(|x| x * x).sum();
    Mat::from_fn(n, n, |i, j| {
        let id = if i == j { 1.0 } else { 0.0 };
        id - 2.0 * v[i] * v[j] / norm2
    })
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

#[track_caller]
fn assert_eigendecomposition(a: MatRef<'_, f64>, s: &[f64], u: MatRef<'_, f64>, tol: f64) {
    let n = a.nrows();
    let reconstructed = (u * diagonal(s).as_ref()) * u.transpose();
    let orthogonality = u.transpose() * u;
    for j in 0..n {
        for i in 0..n {
            assert_approx_eq!(reconstructed.read(i, j), a.read(i, j), tol);
            let id = if i == j { 1.0 } else { 0.0 };
            assert_approx_eq!(orthogonality.read(i, j), id, tol);
        }
    }
}

#[test]
fn pipeline_step_by_step() {
    let rng = &mut StdRng::seed_from_u64(0);
    for n in [1, 2, 5, 17, 50, 200] {
        let a = random_symmetric(rng, n);
        for side in [Side::Lower, Side::Upper] {
            let mut q = a.clone();
            let mut d = vec![0.0; n];
            let mut e = vec![0.0; n.saturating_sub(1)];
            let mut tau = vec![0.0; n.saturating_sub(1)];
            tridiagonalize_in_place(side, q.as_mut(), &mut d, &mut e, &mut tau).unwrap();

            let mut mem = GlobalPodBuffer::new(
                orthogonal_from_tridiag_in_place_req::<f64>(n)
                    .unwrap()
                    .or(compute_tridiag_eigenvectors_req::<f64>(n).unwrap()),
            );
            orthogonal_from_tridiag_in_place(side, q.as_mut(), &tau, PodStack::new(&mut mem))
                .unwrap();
            let convergence = compute_tridiag_eigenvectors(
                &mut d,
                &mut e,
                q.as_mut(),
                TridiagQrParams::default(),
                PodStack::new(&mut mem),
            )
            .unwrap();
            assert!(convergence.is_converged());

            assert_eigendecomposition(a.as_ref(), &d, q.as_ref(), 1e-13 * n as f64);
        }
    }
}

#[test]
fn row_major_storage() {
    let rng = &mut StdRng::seed_from_u64(1);
    let n = 12;
    let a = random_symmetric(rng, n);
    let row_major: Vec<f64> = (0..n * n).map(|k| a.read(k / n, k % n)).collect();

    let mut mem =
        GlobalPodBuffer::new(compute_symmetric_evd_req::<f64>(n, ComputeVectors::Yes).unwrap());

    let mut s = vec![0.0; n];
    let mut u = vec![0.0; n * n];
    let convergence = compute_symmetric_evd(
        Side::Upper,
        mat::from_row_major_slice(&row_major, n, n),
        &mut s,
        Some(mat::from_row_major_slice_mut(&mut u, n, n)),
        Default::default(),
        PodStack::new(&mut mem),
    )
    .unwrap();
    assert!(convergence.is_converged());
    assert_eigendecomposition(
        a.as_ref(),
        &s,
        mat::from_row_major_slice(&u, n, n),
        1e-12,
    );

    let mut s_col = vec![0.0; n];
    let mut u_col = Mat::zeros(n, n);
    let convergence = compute_symmetric_evd(
        Side::Upper,
        a.as_ref(),
        &mut s_col,
        Some(u_col.as_mut()),
        Default::default(),
        PodStack::new(&mut mem),
    )
    .unwrap();
    assert!(convergence.is_converged());
    for (lhs, rhs) in s.iter().zip(&s_col) {
        assert_approx_eq!(*lhs, *rhs, 1e-13);
    }
}

#[test]
fn values_only_matches_vectors() {
    let rng = &mut StdRng::seed_from_u64(2);
    for n in [2, 3, 9, 40] {
        let d: Vec<f64> = (0..n).map(|_| 4.0 * rng.gen::<f64>() - 2.0).collect();
        let e: Vec<f64> = (0..n - 1).map(|_| rng.gen::<f64>() - 0.5).collect();

        let mut values = d.clone();
        let convergence =
            compute_tridiag_eigenvalues(&mut values, &mut e.clone(), Default::default()).unwrap();
        assert!(convergence.is_converged());

        let mut with_vectors = d.clone();
        let mut z = Mat::<f64>::identity(n, n);
        let convergence = compute_tridiag_eigenvectors(
            &mut with_vectors,
            &mut e.clone(),
            z.as_mut(),
            Default::default(),
            PodStack::new(&mut GlobalPodBuffer::new(
                compute_tridiag_eigenvectors_req::<f64>(n).unwrap(),
            )),
        )
        .unwrap();
        assert!(convergence.is_converged());

        for (lhs, rhs) in sorted(&values).iter().zip(sorted(&with_vectors)) {
            assert_approx_eq!(*lhs, rhs, 1e-10 * rhs.abs().max(1.0));
        }
    }
}

#[test]
fn two_by_two_closed_form_matches_solver() {
    let rng = &mut StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let (a, b, c) = (
            rng.gen::<f64>() - 0.5,
            rng.gen::<f64>() - 0.5,
            rng.gen::<f64>() - 0.5,
        );
        let (rt1, rt2, _, _) = eigen_2x2(a, b, c);

        let m = Mat::from_fn(2, 2, |i, j| match (i, j) {
            (0, 0) => a,
            (1, 1) => c,
            _ => b,
        });
        let mut s = [0.0; 2];
        let convergence = compute_symmetric_evd(
            Side::Lower,
            m.as_ref(),
            &mut s,
            None,
            Default::default(),
            PodStack::new(&mut GlobalPodBuffer::new(
                compute_symmetric_evd_req::<f64>(2, ComputeVectors::No).unwrap(),
            )),
        )
        .unwrap();
        assert!(convergence.is_converged());
        let expected = sorted(&[rt1, rt2]);
        assert_approx_eq!(s[0], expected[0], 1e-12);
        assert_approx_eq!(s[1], expected[1], 1e-12);
    }
}

#[test]
fn rotation_special_cases() {
    let (rot, r) = JacobiRotation::make_givens(3.0f64, 0.0);
    assert!(all(rot.c == 1.0, rot.s == 0.0, r == 3.0));
    let (rot, r) = JacobiRotation::make_givens(0.0f64, -2.0);
    assert!(all(rot.c == 0.0, rot.s == 1.0, r == -2.0));
    let (rot, r) = JacobiRotation::make_givens(3.0f64, 4.0);
    assert_approx_eq!(rot.c, 0.6, 1e-15);
    assert_approx_eq!(rot.s, 0.8, 1e-15);
    assert_approx_eq!(r, 5.0, 1e-15);

    // identity rotations leave the matrix bit for bit untouched
    let original = Mat::from_fn(3, 2, |i, j| (1 + i + 3 * j) as f64 / 7.0);
    let mut m = original.clone();
    apply_rotation_sequence_on_the_left_in_place(
        Pivot::Variable,
        Direction::Forward,
        &[1.0, 1.0],
        &[0.0, 0.0],
        m.as_mut(),
    );
    assert!(m == original);
}

#[test]
fn eigenvalues_are_squared_singular_values() {
    let rng = &mut StdRng::seed_from_u64(4);
    let sigma = [3.0, 2.5, 1.0, 0.5, 0.1];
    let s = &(&reflector(rng, 5) * &diagonal(&sigma)) * &reflector(rng, 5);
    let a = s.transpose() * s.as_ref();

    let mut values = [0.0; 5];
    let mut u = Mat::zeros(5, 5);
    let convergence = compute_symmetric_evd(
        Side::Lower,
        a.as_ref(),
        &mut values,
        Some(u.as_mut()),
        Default::default(),
        PodStack::new(&mut GlobalPodBuffer::new(
            compute_symmetric_evd_req::<f64>(5, ComputeVectors::Yes).unwrap(),
        )),
    )
    .unwrap();
    assert!(convergence.is_converged());

    let expected = sorted(&sigma.map(|x| x * x));
    for (lhs, rhs) in values.iter().zip(&expected) {
        assert_approx_eq!(*lhs, *rhs, 1e-8);
    }
    assert_eigendecomposition(a.as_ref(), &values, u.as_ref(), 1e-12);
}

#[test]
fn diagonal_input_is_already_converged() {
    let a = diagonal(&[5.0, -2.0, 0.0, 1.5]);
    let mut values = [0.0; 4];
    let mut u = Mat::zeros(4, 4);
    let convergence = compute_symmetric_evd(
        Side::Lower,
        a.as_ref(),
        &mut values,
        Some(u.as_mut()),
        Default::default(),
        PodStack::new(&mut GlobalPodBuffer::new(
            compute_symmetric_evd_req::<f64>(4, ComputeVectors::Yes).unwrap(),
        )),
    )
    .unwrap();
    assert!(convergence == Convergence::Converged { sweeps: 0 });
    assert!(values == [-2.0, 0.0, 1.5, 5.0]);
    assert_eigendecomposition(a.as_ref(), &values, u.as_ref(), 1e-15);
}

#[test]
fn exhausted_budget_is_reported() {
    let rng = &mut StdRng::seed_from_u64(5);
    let a = random_symmetric(rng, 6);
    let params = SymmetricEvdParams {
        solver: TridiagQrParams {
            max_iterations_per_value: 0,
            ..Default::default()
        },
    };
    let mut values = [0.0; 6];
    let convergence = compute_symmetric_evd(
        Side::Lower,
        a.as_ref(),
        &mut values,
        None,
        params,
        PodStack::new(&mut GlobalPodBuffer::new(
            compute_symmetric_evd_req::<f64>(6, ComputeVectors::No).unwrap(),
        )),
    )
    .unwrap();
    assert!(convergence == Convergence::NotConverged { sweeps: 0 });
}

#[test]
fn misuse_leaves_inputs_untouched() {
    let a = Mat::from_fn(4, 3, |i, j| (i * j) as f64);
    let mut values = [9.0; 4];
    let err = compute_symmetric_evd(
        Side::Lower,
        a.as_ref(),
        &mut values,
        None,
        Default::default(),
        PodStack::new(&mut GlobalPodBuffer::new(
            compute_symmetric_evd_req::<f64>(4, ComputeVectors::No).unwrap(),
        )),
    )
    .unwrap_err();
    assert!(all(
        err.routine == "compute_symmetric_evd",
        err.position == 2,
        err.kind == ArgumentErrorKind::NotSquare { nrows: 4, ncols: 3 },
    ));
    assert!(values == [9.0; 4]);

    let mut d = [1.0, 2.0, 3.0];
    let mut e = [0.5, 0.5, 0.5];
    let err = evd::TridiagQr::default().eigenvalues(&mut d, &mut e).unwrap_err();
    assert!(all(
        err.position == 2,
        err.kind == ArgumentErrorKind::LengthMismatch {
            expected: 2,
            found: 3
        },
    ));
    assert!(all(d == [1.0, 2.0, 3.0], e == [0.5; 3]));
    assert!(err.to_string().contains("compute_tridiag_eigenvalues"));
}
