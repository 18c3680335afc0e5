//! Integration tests for dd-sim.
//!
//! Every async test runs on a paused clock: sleeps complete as soon as the
//! runtime is otherwise idle, so elapsed times are exact.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, sleep};

use dd_alloc::PassOutcome;
use dd_core::{
    BASE, DdError, DroneId, DroneStatus, GridPoint, OrderId, OrderState, Priority, RouteId,
    RouteStatus,
};
use dd_fleet::{DroneSpec, NewOrder, Order, Route};
use dd_route::NearestNeighborPlanner;

use crate::{
    DeliveryObserver, DeliveryOutcome, Dispatcher, DispatcherBuilder, InterruptPolicy, Scheduler,
    SchedulerReport, SimConfig, SimError, Supervisor,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

type TestDispatcher = Arc<Dispatcher<NearestNeighborPlanner>>;

#[derive(Default)]
struct Recorder {
    phases:      Mutex<Vec<(DroneId, DroneStatus)>>,
    delivered:   Mutex<Vec<GridPoint>>,
    completed:   Mutex<Vec<RouteStatus>>,
    interrupted: Mutex<Vec<(GridPoint, Vec<OrderState>)>>,
    passes:      AtomicUsize,
}

impl DeliveryObserver for Recorder {
    fn on_pass(&self, _outcome: &PassOutcome) {
        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    fn on_phase(&self, drone: DroneId, status: DroneStatus, _position: GridPoint) {
        self.phases.lock().push((drone, status));
    }

    fn on_delivered(&self, _drone: DroneId, order: &Order) {
        assert_eq!(order.state, OrderState::Delivered);
        self.delivered.lock().push(order.destination);
    }

    fn on_batch_complete(&self, _drone: DroneId, route: &Route) {
        self.completed.lock().push(route.status);
    }

    fn on_interrupted(&self, _drone: DroneId, _route: RouteId, at: GridPoint, undelivered: &[Order]) {
        self.interrupted.lock().push((at, undelivered.iter().map(|o| o.state).collect()));
    }
}

fn config(fleet: &[(f64, f64)]) -> SimConfig {
    SimConfig {
        fleet: fleet.iter().map(|&(kg, km)| DroneSpec::new(kg, km)).collect(),
        ..SimConfig::default()
    }
}

fn build(config: SimConfig) -> (TestDispatcher, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let dispatcher = DispatcherBuilder::new(config, NearestNeighborPlanner)
        .observer(recorder.clone())
        .build()
        .unwrap();
    (Arc::new(dispatcher), recorder)
}

/// Store orders without dispatching, so a later pass can batch them.
fn queue(d: &TestDispatcher, stops: &[(i32, i32, f64)]) -> Vec<OrderId> {
    stops
        .iter()
        .map(|&(x, y, kg)| d.engine().submit(NewOrder::new(x, y, kg, Priority::Low)).unwrap().id)
        .collect()
}

fn state_of(d: &TestDispatcher, id: OrderId) -> OrderState {
    d.engine().orders.get(id).unwrap().state
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn defaults_match_reference_fleet() {
        let c = SimConfig::default();
        assert_eq!(c.tick_period_units, 10);
        assert_eq!(c.tick_period(), Duration::from_secs(10));
        assert_eq!(c.loading_units, 1);
        assert_eq!(c.delivering_units, 1);
        assert_eq!(c.interrupt_policy, InterruptPolicy::Compensate);
        assert!(c.reconcile_after_delivery);
        assert_eq!(
            c.fleet,
            vec![DroneSpec::new(10.0, 20.0), DroneSpec::new(15.0, 25.0), DroneSpec::new(8.0, 18.0)]
        );
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let c: SimConfig =
            serde_json::from_str(r#"{"tick_period_units": 5, "interrupt_policy": "abandon"}"#)
                .unwrap();
        assert_eq!(c.tick_period_units, 5);
        assert_eq!(c.interrupt_policy, InterruptPolicy::Abandon);
        assert_eq!(c.time_unit_ms, 1_000);
        assert_eq!(c.fleet.len(), 3);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero_tick = SimConfig { tick_period_units: 0, ..SimConfig::default() };
        assert!(matches!(zero_tick.validate(), Err(DdError::Config(_))));

        let zero_unit = SimConfig { time_unit_ms: 0, ..SimConfig::default() };
        assert!(matches!(zero_unit.validate(), Err(DdError::Config(_))));

        let bad_drone = config(&[(10.0, 20.0), (-1.0, 20.0)]);
        let err = bad_drone.validate().unwrap_err();
        assert!(err.to_string().contains("fleet[1]"));

        let nan_range = config(&[(10.0, f64::NAN)]);
        assert!(nan_range.validate().is_err());
    }

    #[test]
    fn builder_propagates_config_error() {
        let result = DispatcherBuilder::new(
            SimConfig { tick_period_units: 0, ..SimConfig::default() },
            NearestNeighborPlanner,
        )
        .build();
        assert!(matches!(result, Err(SimError::Core(DdError::Config(_)))));
    }

    #[test]
    fn builder_fleet_override_registers_drones_from_one() {
        let d = DispatcherBuilder::new(SimConfig::default(), NearestNeighborPlanner)
            .fleet(vec![DroneSpec::new(5.0, 50.0)])
            .build()
            .unwrap();
        let drones = d.list_drones();
        assert_eq!(drones.len(), 1);
        assert_eq!(drones[0].id, DroneId(1));
        assert_eq!(drones[0].status, DroneStatus::Idle);
    }
}

// ── Intake and read side ──────────────────────────────────────────────────────

#[cfg(test)]
mod dispatcher_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn invalid_payload_is_rejected_and_not_stored() {
        let (d, _) = build(config(&[(10.0, 100.0)]));
        let err = d.submit_order(1, 1, 0.0, Priority::Low).unwrap_err();
        assert!(matches!(err, SimError::Core(DdError::InvalidOrder(_))));
        assert!(d.list_orders().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn refused_order_never_dispatches() {
        let (d, rec) = build(config(&[(10.0, 100.0)]));
        let order = d.submit_order(1, 1, 50.0, Priority::High).unwrap();
        assert_eq!(order.state, OrderState::Refused);
        assert_eq!(rec.passes.load(Ordering::Relaxed), 0);
        assert!(d.list_routes().is_empty());
        assert_eq!(d.supervisor().active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_order_dispatches_immediately() {
        let (d, rec) = build(config(&[(10.0, 100.0)]));
        let order = d.submit_order(10, 20, 5.0, Priority::Low).unwrap();

        assert_eq!(order.state, OrderState::Pending);
        assert_eq!(state_of(&d, order.id), OrderState::Allocated);
        assert_eq!(d.list_drones()[0].status, DroneStatus::Loading);
        assert_eq!(rec.passes.load(Ordering::Relaxed), 1);
        assert_eq!(d.supervisor().active(), 1);

        let routes = d.list_routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].status, RouteStatus::Planned);
        assert_eq!(routes[0].drone.id, DroneId(1));
        assert_eq!(routes[0].orders[0].id, order.id);
    }

    #[tokio::test(start_paused = true)]
    async fn statistics_follow_the_stores() {
        let (d, _) = build(config(&[(10.0, 100.0), (10.0, 100.0)]));
        assert_eq!(d.statistics().total_routes, 0);
        assert_eq!(d.statistics().drones_available, 2);

        d.submit_order(3, 4, 2.0, Priority::Low).unwrap();
        let stats = d.statistics();
        assert_eq!(stats.total_routes, 1);
        assert_eq!(stats.drones_available, 1);
        assert_eq!(stats.total_orders_completed, 0);

        d.wait_idle().await;
        let stats = d.statistics();
        assert_eq!(stats.total_orders_completed, 1);
        assert_eq!(stats.average_orders_per_route, 1.0);
        assert_eq!(stats.drones_available, 2);
    }
}

// ── Delivery task ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod delivery_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn single_order_full_cycle() {
        let (d, rec) = build(config(&[(10.0, 100.0)]));
        let start = Instant::now();
        let order = d.submit_order(3, 4, 2.0, Priority::Medium).unwrap();

        let finished = d.wait_idle().await;
        // load 1 + fly 5 + deliver 1 + return 5
        assert_eq!(start.elapsed(), Duration::from_secs(12));
        assert_eq!(finished.len(), 1);
        assert_eq!(
            *finished[0].result.as_ref().unwrap(),
            DeliveryOutcome::Completed { delivered: 1 }
        );

        assert_eq!(state_of(&d, order.id), OrderState::Delivered);
        let drone = d.engine().drones.get(DroneId(1)).unwrap();
        assert_eq!(drone.status, DroneStatus::Idle);
        assert_eq!(drone.position, BASE);
        assert!(drone.assigned.is_empty());
        assert_eq!(d.list_routes()[0].status, RouteStatus::Completed);
        assert_eq!(*rec.completed.lock(), vec![RouteStatus::Completed]);

        let phases: Vec<DroneStatus> = rec.phases.lock().iter().map(|&(_, s)| s).collect();
        assert_eq!(
            phases,
            vec![
                DroneStatus::Loading,
                DroneStatus::InFlight,
                DroneStatus::Delivering,
                DroneStatus::Returning,
                DroneStatus::Idle,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn batch_flies_nearest_neighbor_sequence() {
        let (d, rec) = build(config(&[(10.0, 100.0)]));
        let ids = queue(&d, &[(10, 0, 2.0), (0, 10, 2.0), (5, 5, 2.0)]);
        let start = Instant::now();

        let outcome = d.dispatch().unwrap();
        assert_eq!(outcome.allocations.len(), 1);
        assert_eq!(outcome.allocations[0].sequence.len(), 3);

        d.wait_idle().await;
        // load 1, legs 7 + 7 + 14, three deliveries, return 10
        assert_eq!(start.elapsed(), Duration::from_secs(42));
        assert_eq!(
            *rec.delivered.lock(),
            vec![GridPoint::new(5, 5), GridPoint::new(10, 0), GridPoint::new(0, 10)]
        );
        for id in ids {
            assert_eq!(state_of(&d, id), OrderState::Delivered);
        }

        let phases: Vec<DroneStatus> = rec.phases.lock().iter().map(|&(_, s)| s).collect();
        assert_eq!(phases.len(), 9);
        assert_eq!(phases[0], DroneStatus::Loading);
        assert_eq!(&phases[1..7], &[
            DroneStatus::InFlight,
            DroneStatus::Delivering,
            DroneStatus::InFlight,
            DroneStatus::Delivering,
            DroneStatus::InFlight,
            DroneStatus::Delivering,
        ]);
        assert_eq!(&phases[7..], &[DroneStatus::Returning, DroneStatus::Idle]);
    }

    #[tokio::test(start_paused = true)]
    async fn orders_go_on_route_at_takeoff() {
        let (d, _) = build(config(&[(10.0, 100.0)]));
        let order = d.submit_order(3, 4, 2.0, Priority::Low).unwrap();

        sleep(Duration::from_millis(500)).await;
        assert_eq!(state_of(&d, order.id), OrderState::Allocated);
        assert_eq!(d.list_drones()[0].status, DroneStatus::Loading);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(state_of(&d, order.id), OrderState::OnRoute);
        assert_eq!(d.list_drones()[0].status, DroneStatus::InFlight);
        assert_eq!(d.list_routes()[0].status, RouteStatus::InProgress);
        let carried = d.engine().drones.get(DroneId(1)).unwrap().assigned;
        assert_eq!(carried[0].state, OrderState::OnRoute);

        // Arrives at 6, delivered at 7.
        sleep(Duration::from_secs(5)).await;
        let drone = d.engine().drones.get(DroneId(1)).unwrap();
        assert_eq!(drone.status, DroneStatus::Delivering);
        assert_eq!(drone.position, GridPoint::new(3, 4));
        assert_eq!(state_of(&d, order.id), OrderState::OnRoute);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(state_of(&d, order.id), OrderState::Delivered);
        assert_eq!(d.list_drones()[0].status, DroneStatus::Returning);
    }

    #[tokio::test(start_paused = true)]
    async fn payload_limit_holds_across_dispatches() {
        let (d, _) = build(config(&[(20.0, 100.0)]));
        let a = d.submit_order(3, 4, 10.0, Priority::Low).unwrap();
        let b = d.submit_order(3, 4, 15.0, Priority::Low).unwrap();

        let drone = d.engine().drones.get(DroneId(1)).unwrap();
        assert_eq!(drone.assigned.len(), 1);
        assert_eq!(state_of(&d, b.id), OrderState::Pending);

        d.wait_idle().await;
        assert_eq!(state_of(&d, a.id), OrderState::Delivered);
        // No scheduler is running, so nothing picked `b` up.
        assert_eq!(state_of(&d, b.id), OrderState::Pending);

        d.dispatch().unwrap();
        d.wait_idle().await;
        assert_eq!(state_of(&d, b.id), OrderState::Delivered);
        assert_eq!(d.list_routes().len(), 2);
    }
}

// ── Interruption ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod interrupt_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn compensate_requeues_and_resets() {
        let (d, rec) = build(config(&[(10.0, 100.0)]));
        let order = d.submit_order(3, 4, 2.0, Priority::Low).unwrap();
        sleep(Duration::from_secs(2)).await;

        let finished = d.shutdown().await;
        assert_eq!(finished.len(), 1);
        assert_eq!(
            *finished[0].result.as_ref().unwrap(),
            DeliveryOutcome::Interrupted { delivered: 0, requeued: 1 }
        );

        assert_eq!(state_of(&d, order.id), OrderState::Pending);
        let drone = d.engine().drones.get(DroneId(1)).unwrap();
        assert_eq!(drone.status, DroneStatus::Idle);
        assert_eq!(drone.position, BASE);
        assert!(drone.assigned.is_empty());
        assert_eq!(d.list_routes()[0].status, RouteStatus::Aborted);
        // Reported as requeued, at the last point reached before the reset.
        assert_eq!(*rec.interrupted.lock(), vec![(BASE, vec![OrderState::Pending])]);
    }

    #[tokio::test(start_paused = true)]
    async fn compensate_keeps_completed_deliveries() {
        let (d, rec) = build(config(&[(10.0, 100.0)]));
        let ids = queue(&d, &[(3, 4, 2.0), (6, 8, 2.0)]);
        d.dispatch().unwrap();

        // First stop delivered at 7, second arrival due at 12.
        sleep(Duration::from_secs(9)).await;
        let finished = d.shutdown().await;
        assert_eq!(
            *finished[0].result.as_ref().unwrap(),
            DeliveryOutcome::Interrupted { delivered: 1, requeued: 1 }
        );
        assert_eq!(state_of(&d, ids[0]), OrderState::Delivered);
        assert_eq!(state_of(&d, ids[1]), OrderState::Pending);
        assert_eq!(*rec.interrupted.lock(), vec![(GridPoint::new(3, 4), vec![OrderState::Pending])]);
    }

    #[tokio::test(start_paused = true)]
    async fn abandon_leaves_state_as_is() {
        let cfg = SimConfig { interrupt_policy: InterruptPolicy::Abandon, ..config(&[(10.0, 100.0)]) };
        let (d, rec) = build(cfg);
        let order = d.submit_order(3, 4, 2.0, Priority::Low).unwrap();
        sleep(Duration::from_secs(2)).await;

        let finished = d.shutdown().await;
        assert_eq!(
            *finished[0].result.as_ref().unwrap(),
            DeliveryOutcome::Interrupted { delivered: 0, requeued: 0 }
        );
        assert_eq!(state_of(&d, order.id), OrderState::OnRoute);
        let drone = d.engine().drones.get(DroneId(1)).unwrap();
        assert_eq!(drone.status, DroneStatus::InFlight);
        assert_eq!(drone.assigned.len(), 1);
        assert_eq!(drone.assigned[0].state, OrderState::OnRoute);
        assert_eq!(d.list_routes()[0].status, RouteStatus::InProgress);
        assert_eq!(*rec.interrupted.lock(), vec![(BASE, vec![OrderState::OnRoute])]);
    }

    #[tokio::test(start_paused = true)]
    async fn no_dispatch_after_shutdown() {
        let (d, _) = build(config(&[(10.0, 100.0)]));
        d.shutdown().await;
        let order = d.submit_order(1, 1, 1.0, Priority::Low).unwrap();
        assert_eq!(state_of(&d, order.id), OrderState::Pending);
        assert!(d.dispatch().unwrap().allocations.is_empty());
        assert_eq!(d.supervisor().active(), 0);
    }
}

// ── Supervisor ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod supervisor_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tracks_until_joined() {
        let sup = Supervisor::new();
        sup.spawn(DroneId(1), RouteId(1), async {
            sleep(Duration::from_secs(3)).await;
            Ok::<DeliveryOutcome, SimError>(DeliveryOutcome::Completed { delivered: 2 })
        });
        assert_eq!(sup.active(), 1);
        assert!(sup.reap().await.is_empty());

        let finished = sup.wait_idle().await;
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].drone, DroneId(1));
        assert_eq!(finished[0].route, RouteId(1));
        assert_eq!(sup.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_task_is_reported() {
        let sup = Supervisor::new();
        sup.spawn(DroneId(4), RouteId(9), async {
            if std::hint::black_box(true) {
                panic!("boom");
            }
            Ok::<DeliveryOutcome, SimError>(DeliveryOutcome::Completed { delivered: 0 })
        });
        let finished = sup.wait_idle().await;
        assert!(matches!(
            finished[0].result,
            Err(SimError::TaskFailed { drone: DroneId(4), .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_visible_to_subscribers() {
        let sup = Supervisor::new();
        let rx = sup.subscribe();
        assert!(!sup.is_cancelled());
        sup.cancel();
        assert!(sup.is_cancelled());
        assert!(*rx.borrow());
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn returning_drone_triggers_a_pass() {
        let cfg = SimConfig { tick_period_units: 1_000, ..config(&[(20.0, 100.0)]) };
        let (d, _) = build(cfg);
        let scheduler = Scheduler::new(Arc::clone(&d)).spawn();

        let a = d.submit_order(3, 4, 10.0, Priority::Low).unwrap();
        let b = d.submit_order(3, 4, 15.0, Priority::Low).unwrap();
        assert_eq!(state_of(&d, b.id), OrderState::Pending);

        // `a` is back at 12; the kick dispatches `b`, which is back at 24.
        sleep(Duration::from_secs(30)).await;
        assert_eq!(state_of(&d, a.id), OrderState::Delivered);
        assert_eq!(state_of(&d, b.id), OrderState::Delivered);

        d.shutdown().await;
        let report = scheduler.await.unwrap();
        assert_eq!(report, SchedulerReport { ticks: 1, proactive: 2, failed: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn without_kick_waits_for_next_tick() {
        let cfg = SimConfig { reconcile_after_delivery: false, ..config(&[(20.0, 100.0)]) };
        let (d, _) = build(cfg);
        let scheduler = Scheduler::new(Arc::clone(&d)).spawn();

        d.submit_order(3, 4, 10.0, Priority::Low).unwrap();
        let b = d.submit_order(3, 4, 15.0, Priority::Low).unwrap();

        // Drone free at 12, next tick at 20.
        sleep(Duration::from_secs(15)).await;
        assert_eq!(state_of(&d, b.id), OrderState::Pending);
        assert_eq!(d.list_drones()[0].status, DroneStatus::Idle);

        sleep(Duration::from_millis(5_500)).await;
        assert_eq!(state_of(&d, b.id), OrderState::Allocated);

        d.shutdown().await;
        let report = scheduler.await.unwrap();
        assert_eq!(report.proactive, 0);
        assert_eq!(report.ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_stops_on_shutdown() {
        let (d, _) = build(config(&[(10.0, 100.0)]));
        let scheduler = Scheduler::new(Arc::clone(&d)).spawn();
        sleep(Duration::from_secs(25)).await;
        d.shutdown().await;
        let report = scheduler.await.unwrap();
        // Ticks at 0, 10 and 20.
        assert_eq!(report.ticks, 3);
        assert_eq!(report.failed, 0);
    }
}
