//! Index-space distribution over a 1D block-cyclic layout

use spalg::distribution::{global_index_to_process_id, global_length_to_local};
use spalg::Distribution;

const N: usize = 10_000_000;

#[test]
fn test_local_lengths_partition_large_range() {
    for p in 1..=9 {
        let total: usize = (0..p).map(|s| global_length_to_local(N, s, p)).sum();
        assert_eq!(total, N, "P = {}", p);
    }
}

#[test]
fn test_round_trip_every_index() {
    let dist = Distribution::default();
    for p in 1..=9 {
        let lengths: Vec<usize> = (0..p).map(|s| dist.global_length_to_local(N, s, p)).collect();
        for i in 0..N {
            let s = dist.global_index_to_process_id(i, N, p);
            assert!(s < p);
            let li = dist.global_index_to_local(i, N, p);
            assert!(li < lengths[s], "i = {}, P = {}", i, p);
            assert_eq!(dist.local_index_to_global(li, N, s, p), i);
        }
    }
}

#[test]
fn test_free_functions_follow_configured_block_size() {
    let dist = Distribution::default();
    for i in [0, 63, 64, 1_000_003, N - 1] {
        assert_eq!(global_index_to_process_id(i, N, 7), dist.global_index_to_process_id(i, N, 7));
    }
}

#[test]
fn test_offsets_cover_the_range() {
    let dist = Distribution::new(16).unwrap();
    let n = 1_000;
    for p in 1..=9 {
        let mut expected = 0;
        for s in 0..p {
            assert_eq!(dist.local_offset(n, s, p), expected);
            expected += dist.global_length_to_local(n, s, p);
        }
        assert_eq!(expected, n);
        // The first index of each non-empty range maps back to its process
        for s in (0..p).filter(|&s| dist.global_length_to_local(n, s, p) > 0) {
            assert_eq!(dist.offset_to_pid(dist.local_offset(n, s, p), n, p), s);
        }
    }
}

#[test]
fn test_more_processes_than_blocks() {
    let dist = Distribution::new(8).unwrap();
    let n = 20;
    let lengths: Vec<usize> = (0..5).map(|s| dist.global_length_to_local(n, s, 5)).collect();
    assert_eq!(lengths, vec![8, 8, 4, 0, 0]);
}
