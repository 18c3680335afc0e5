//! Unit tests for dd-route.

use dd_core::{BASE, GridPoint};

use crate::{NearestNeighborPlanner, RoutePlanner, legs};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn p(x: i32, y: i32) -> GridPoint {
    GridPoint::new(x, y)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── route_distance ────────────────────────────────────────────────────────────

#[cfg(test)]
mod route_distance {
    use super::*;

    #[test]
    fn empty_is_zero_from_anywhere() {
        let none: [GridPoint; 0] = [];
        assert_eq!(NearestNeighborPlanner.route_distance(&none, BASE), 0.0);
        assert_eq!(NearestNeighborPlanner.route_distance(&none, p(40, -9)), 0.0);
    }

    #[test]
    fn single_stop_is_out_and_back() {
        let d = NearestNeighborPlanner.route_distance(&[p(3, 4)], BASE);
        assert!(close(d, 10.0));
    }

    #[test]
    fn two_stops_from_base() {
        // (10,0) then (0,10): 10 + sqrt(200) + 10
        let d = NearestNeighborPlanner.route_distance(&[p(0, 10), p(10, 0)], BASE);
        assert!(close(d, 20.0 + 200f64.sqrt()), "got {d}");
    }

    #[test]
    fn sorts_by_start_distance_not_chain_distance() {
        // From base: (3,0) is nearest, then (-4,0), then (5,0).  A true
        // nearest-neighbor chain would go 3 → 5 → -4 instead.
        let stops = [p(5, 0), p(-4, 0), p(3, 0)];
        let d = NearestNeighborPlanner.route_distance(&stops, BASE);
        // 3 + 7 + 9 + 5 (return from (5,0))
        assert!(close(d, 24.0), "got {d}");
    }

    #[test]
    fn return_leg_goes_to_base_not_start() {
        let start = p(6, 8);
        let d = NearestNeighborPlanner.route_distance(&[p(6, 8)], start);
        // zero hop, then 10 back to base
        assert!(close(d, 10.0));
    }
}

// ── sequence ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sequence {
    use super::*;

    #[test]
    fn starts_with_closest_to_base() {
        let seq = NearestNeighborPlanner.sequence(&[p(10, 0), p(0, 10), p(5, 5)]);
        assert_eq!(seq[0], p(5, 5));
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn never_revisits() {
        let stops = [p(1, 1), p(9, 9), p(2, 2), p(8, 8), p(5, 5)];
        let seq = NearestNeighborPlanner.sequence(&stops);
        assert_eq!(seq, [p(1, 1), p(2, 2), p(5, 5), p(8, 8), p(9, 9)]);
    }

    #[test]
    fn ties_keep_input_order() {
        let seq = NearestNeighborPlanner.sequence(&[p(0, 3), p(3, 0)]);
        assert_eq!(seq[0], p(0, 3));
    }

    #[test]
    fn differs_from_sorted_heuristic() {
        let seq = NearestNeighborPlanner.sequence(&[p(5, 0), p(-4, 0), p(3, 0)]);
        assert_eq!(seq, [p(3, 0), p(5, 0), p(-4, 0)]);
    }

    #[test]
    fn empty_sequence() {
        let none: [GridPoint; 0] = [];
        assert!(NearestNeighborPlanner.sequence(&none).is_empty());
    }
}

// ── legs ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod leg_tests {
    use super::*;

    #[test]
    fn legs_close_the_loop() {
        let l = legs(&[p(3, 4), p(3, 0)], BASE);
        assert_eq!(l.len(), 3);
        assert!(close(l[0].distance_km, 5.0));
        assert!(close(l[1].distance_km, 4.0));
        assert!(close(l[2].distance_km, 3.0));
        assert_eq!(l[2].to, BASE);
        assert_eq!(l[0].travel_units(), 5);
    }

    #[test]
    fn empty_batch_is_one_return_leg() {
        let none: [GridPoint; 0] = [];
        let l = legs(&none, p(0, 2));
        assert_eq!(l.len(), 1);
        assert!(close(l[0].distance_km, 2.0));
    }
}
