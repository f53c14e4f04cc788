//! Randomized arrival-order properties: exactly-once, in-order delivery
//! regardless of how the stream is permuted, duplicated or thinned.

mod common;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use common::{build_harness, data_pdu};
use pdcpstar::entity::RxConfig;
use pdcpstar::sn::SnSize;
use pdcpstar::types::Count;

const STREAM_LEN: u32 = 200;

#[test]
fn shuffled_stream_is_delivered_exactly_once_in_order() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts: Vec<u32> = (0..STREAM_LEN).collect();
        counts.shuffle(&mut rng);

        let mut h = build_harness(RxConfig::default());
        for &count in &counts {
            h.entity.handle_pdu(&data_pdu(count, &count.to_be_bytes(), SnSize::Len12));
        }

        assert_eq!(
            h.delivered_counts(),
            (0..STREAM_LEN).collect::<Vec<_>>(),
            "seed {seed}"
        );
        assert_eq!(h.entity.state().rx_deliv, Count::new(STREAM_LEN));
        assert_eq!(h.entity.window_len(), 0);
    }
}

#[test]
fn duplicated_shuffled_stream_never_redelivers() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut counts: Vec<u32> = (0..STREAM_LEN).chain(0..STREAM_LEN).collect();
    counts.shuffle(&mut rng);

    let mut h = build_harness(RxConfig::default());
    for &count in &counts {
        h.entity.handle_pdu(&data_pdu(count, &count.to_be_bytes(), SnSize::Len12));
    }

    assert_eq!(h.delivered_counts(), (0..STREAM_LEN).collect::<Vec<_>>());
    assert_eq!(h.entity.metrics().dropped_duplicate, u64::from(STREAM_LEN));
    assert_eq!(h.entity.metrics().delivered_sdus, u64::from(STREAM_LEN));
}

#[test]
fn lossy_stream_converges_after_reordering_timeouts() {
    for seed in 0..4u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts: Vec<u32> = (0..STREAM_LEN).collect();
        counts.shuffle(&mut rng);
        // Lose every 17th frame of the permutation.
        let lost: Vec<u32> = counts.iter().copied().step_by(17).collect();
        let surviving: Vec<u32> = counts
            .iter()
            .copied()
            .filter(|count| !lost.contains(count))
            .collect();

        let mut h = build_harness(RxConfig::default());
        for &count in &surviving {
            h.entity.handle_pdu(&data_pdu(count, &count.to_be_bytes(), SnSize::Len12));
        }

        // Drive the reordering timer until every surviving frame is out.
        let t_reordering = RxConfig::default().t_reordering.unwrap();
        for _ in 0..STREAM_LEN {
            if h.entity.window_len() == 0 {
                break;
            }
            h.clock.advance(t_reordering);
            h.entity.poll_reordering_timer();
        }

        let mut expected = surviving.clone();
        expected.sort_unstable();
        assert_eq!(h.delivered_counts(), expected, "seed {seed}");
        assert_eq!(h.entity.window_len(), 0, "seed {seed}");
        assert!(!h.entity.is_reordering_timer_running(), "seed {seed}");
    }
}
