//! End-to-end tests for the array of dot products.

use proptest::prelude::*;
use rand::Rng;

use crate::config::RunConfig;
use crate::math::dot_product::*;
use crate::runtime::{Runtime, RuntimeConfig};
use crate::view::{deep_copy, DeviceSpace, Layout, LayoutKind, LayoutLeft, LayoutRight, View1D};

fn runtime(threads: usize) -> Runtime {
    Runtime::initialize(RuntimeConfig {
        num_threads: threads,
        ..RuntimeConfig::default()
    })
    .unwrap()
}

fn run(rt: &Runtime, num_vectors: usize, len: usize, nrepeat: usize, layout: LayoutKind) -> BenchmarkOutcome {
    let config = RunConfig::new(num_vectors, len, nrepeat).unwrap();
    run_with_layout(rt, &config, layout).unwrap()
}

fn report_text(outcome: &BenchmarkOutcome) -> String {
    let mut buf = Vec::new();
    outcome.write_report(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_two_by_three_scenario() {
    let rt = runtime(2);
    for layout in [LayoutKind::Right, LayoutKind::Left] {
        let outcome = run(&rt, 2, 3, 1, layout);
        assert_eq!(outcome.h_c.as_slice(), &[6.0, 12.0], "{}", layout);
        assert!(!outcome.validation.has_error());
        assert_eq!(outcome.layout, layout);
    }
}

#[test]
fn test_single_element() {
    let rt = runtime(1);
    let outcome = run(&rt, 1, 1, 1, LayoutKind::default());
    assert_eq!(outcome.h_c.as_slice(), &[1.0]);
    assert!(!outcome.validation.has_error());
}

#[test]
fn test_report_on_success() {
    let rt = runtime(2);
    let outcome = run(&rt, 8, 16, 3, LayoutKind::Right);
    let text = report_text(&outcome);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], report::HEADER);

    let cols: Vec<&str> = lines[1].split_whitespace().collect();
    assert_eq!(cols.len(), 5);
    assert_eq!(cols[0], "8");
    assert_eq!(cols[1], "16");
    assert!(cols[2].contains('e'));
    assert_eq!(cols[3], "0.002048");
}

#[test]
fn test_corrupted_element_is_reported_alone() {
    let rt = runtime(2);
    let mut outcome = run(&rt, 10, 5, 2, LayoutKind::Left);
    assert!(!outcome.validation.has_error());

    // 4th vector: expected 4 * 15 = 60
    outcome.h_c.as_mut_slice()[3] = 61.0;
    outcome.validation = validate(outcome.h_c.as_slice(), 5);

    let indices: Vec<usize> = outcome.validation.mismatches.iter().map(|m| m.index).collect();
    assert_eq!(indices, vec![3]);

    let text = report_text(&outcome);
    assert_eq!(
        text,
        "Error: 3 10 5 61.000000 60.000000 1.000000e+00 0.016667\nError\n"
    );
}

fn kernel_is_idempotent<L: Layout>(rt: &Runtime) {
    let (num_vectors, len) = (17, 33);
    let mut batch: VectorBatch<L, DeviceSpace> = VectorBatch::new(num_vectors, len).unwrap();
    let mut c: View1D<f64, DeviceSpace> = View1D::new("C", num_vectors).unwrap();
    let mut h_c = c.create_mirror_view().unwrap();
    rt.install(|| batch.initialize(&mut c));

    let functor = batch.functor();
    let mut previous: Option<Vec<f64>> = None;
    for _ in 0..4 {
        rt.install(|| functor.run(&mut c));
        deep_copy(&mut h_c, &c).unwrap();
        let current = h_c.as_slice().to_vec();
        if let Some(prev) = &previous {
            assert_eq!(prev, &current);
        }
        previous = Some(current);
    }
    for i in 0..num_vectors {
        assert_eq!(batch.a.get(i, 0), (i + 1) as f64, "kernel must not touch A");
        assert_eq!(batch.b.get(i, len - 1), len as f64, "kernel must not touch B");
    }
}

#[test]
fn test_repeats_are_idempotent() {
    let rt = runtime(3);
    kernel_is_idempotent::<LayoutRight>(&rt);
    kernel_is_idempotent::<LayoutLeft>(&rt);
}

#[test]
fn test_layout_invariance_random_sizes() {
    let rt = runtime(4);
    let mut rng = rand::rng();
    for _ in 0..8 {
        let num_vectors = rng.random_range(1..64);
        let len = rng.random_range(1..200);
        let right = run(&rt, num_vectors, len, 1, LayoutKind::Right);
        let left = run(&rt, num_vectors, len, 1, LayoutKind::Left);
        assert_eq!(
            right.h_c.as_slice(),
            left.h_c.as_slice(),
            "num_vectors={} len={}",
            num_vectors,
            len
        );
    }
}

#[test]
fn test_thread_count_does_not_change_results() {
    let serial = run(&runtime(1), 33, 65, 1, LayoutKind::Right);
    let parallel = run(&runtime(4), 33, 65, 1, LayoutKind::Right);
    assert_eq!(serial.h_c.as_slice(), parallel.h_c.as_slice());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_matches_closed_form(num_vectors in 1usize..40, len in 1usize..300, nrepeat in 1usize..3) {
        let rt = runtime(2);
        let outcome = run(&rt, num_vectors, len, nrepeat, LayoutKind::Left);
        prop_assert!(!outcome.validation.has_error());
        for (i, &c) in outcome.h_c.iter().enumerate() {
            // Small integer sums are exact in f64.
            prop_assert_eq!(c, expected_value(i, len));
        }
    }
}
