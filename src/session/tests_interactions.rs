use super::*;
use crate::measure::MeasureResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Coordinates at or beyond this longitude make the planar primitives fail,
/// standing in for a primitive that rejects malformed geometry.
const POISON_LON: f64 = 1.0e6;

#[derive(Default)]
struct FakeSurface {
    next_subscription: u64,
    live: Vec<SubscriptionId>,
    snapshots: Vec<Snapshot>,
    cursors: Vec<CursorStyle>,
    errors: Vec<PrimitiveError>,
}

impl MapSurface for FakeSurface {
    fn subscribe_interactions(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.live.push(id);
        id
    }

    fn unsubscribe_interactions(&mut self, subscription: SubscriptionId) {
        self.live.retain(|s| *s != subscription);
    }

    fn query_point_at(&self, location: ScreenPos) -> Option<PointId> {
        let rendered = self.snapshots.last().map(|s| s.points.as_slice()).unwrap_or(&[]);
        rendered
            .iter()
            .find(|p| {
                (p.coordinate.lon - location.x).abs() < 0.25
                    && (p.coordinate.lat - location.y).abs() < 0.25
            })
            .map(|p| p.id)
    }

    fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        self.snapshots.push(snapshot.clone());
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.cursors.push(cursor);
    }

    fn report_error(&mut self, error: &PrimitiveError) {
        self.errors.push(error.clone());
    }
}

struct PlanarPrimitives;

impl PlanarPrimitives {
    fn check(coordinates: &[LonLat]) -> MeasureResult<()> {
        if coordinates.iter().any(|c| c.lon.abs() >= POISON_LON) {
            return Err(PrimitiveError::MalformedGeometry("coordinate out of range".into()));
        }
        Ok(())
    }
}

impl MeasurePrimitives for PlanarPrimitives {
    fn path_length(&self, path: &PathGeometry) -> MeasureResult<f64> {
        Self::check(&path.coordinates)?;
        Ok(path
            .coordinates
            .windows(2)
            .map(|w| {
                let dx = w[1].lon - w[0].lon;
                let dy = w[1].lat - w[0].lat;
                (dx * dx + dy * dy).sqrt()
            })
            .sum())
    }

    fn ring_area(&self, region: &RegionGeometry) -> MeasureResult<f64> {
        Self::check(&region.ring)?;
        let mut twice_area = 0.0;
        for w in region.ring.windows(2) {
            twice_area += w[0].lon * w[1].lat - w[1].lon * w[0].lat;
        }
        Ok((twice_area / 2.0).abs())
    }
}

fn active_controller(surface: &mut FakeSurface) -> MeasureController<PlanarPrimitives> {
    let mut controller =
        MeasureController::with_primitives(MeasureOptions::default(), PlanarPrimitives);
    controller.start(surface);
    controller
}

fn click(x: f64, y: f64) -> PointInteraction {
    PointInteraction {
        location: ScreenPos { x, y },
        coordinate: LonLat::new(x, y),
    }
}

#[test]
fn test_toggle_same_location_twice_restores_store() {
    let mut surface = FakeSurface::default();
    let mut controller = active_controller(&mut surface);

    controller.on_point_interaction(&mut surface, &click(10.0, 10.0));
    controller.on_point_interaction(&mut surface, &click(50.0, 50.0));
    let before = controller.snapshot();
    assert_eq!(before.points.len(), 2);

    controller.on_point_interaction(&mut surface, &click(90.0, 90.0));
    assert_eq!(controller.snapshot().points.len(), 3);

    // Second toggle at the same spot hit-tests the rendered point and removes it
    controller.on_point_interaction(&mut surface, &click(90.0, 90.0));
    let after = controller.snapshot();
    assert_eq!(after.points, before.points);
    assert_eq!(after.measurement, before.measurement);
}

#[test]
fn test_length_zero_below_two_points() {
    let mut surface = FakeSurface::default();
    let mut controller = active_controller(&mut surface);

    controller.on_point_interaction(&mut surface, &click(0.0, 0.0));
    assert_eq!(controller.snapshot().measurement.total_length, 0.0);
    assert!(controller.snapshot().path.is_degenerate());

    controller.on_point_interaction(&mut surface, &click(300.0, 400.0));
    // 3-4-5 triangle hypotenuse, meters reported as kilometers
    assert!((controller.snapshot().measurement.total_length - 0.5).abs() < 1e-12);
}

#[test]
fn test_region_appears_above_three_points() {
    let mut surface = FakeSurface::default();
    let mut controller = active_controller(&mut surface);

    for (x, y) in [(0.0, 0.0), (0.0, 10.0), (10.0, 10.0)] {
        controller.on_point_interaction(&mut surface, &click(x, y));
    }
    let three = controller.snapshot();
    assert!(three.region.is_none());
    assert_eq!(three.measurement.total_area, 0.0);

    controller.on_point_interaction(&mut surface, &click(10.0, 0.0));
    let four = controller.snapshot();
    let region = four.region.expect("4 points must yield a region");
    assert_eq!(region.ring.len(), 5);
    assert_eq!(region.ring[0], region.ring[4]);
    assert!((four.measurement.total_area - 100.0).abs() < 1e-9);
}

#[test]
fn test_removing_fourth_point_drops_region() {
    let mut surface = FakeSurface::default();
    let mut controller = active_controller(&mut surface);

    for (x, y) in [(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)] {
        controller.on_point_interaction(&mut surface, &click(x, y));
    }
    assert!(controller.snapshot().region.is_some());

    controller.on_point_interaction(&mut surface, &click(0.0, 0.0));
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.points.len(), 3);
    assert!(snapshot.region.is_none());
    assert_eq!(snapshot.measurement.total_area, 0.0);
    assert_eq!(snapshot.path.coordinates.len(), 3);
    // Path follows the surviving points in their original order
    assert_eq!(snapshot.path.coordinates[0], LonLat::new(0.0, 10.0));
}

#[test]
fn test_primitive_failure_keeps_prior_state_and_suppresses_emission() {
    let mut surface = FakeSurface::default();
    let mut controller = active_controller(&mut surface);

    controller.on_point_interaction(&mut surface, &click(0.0, 0.0));
    controller.on_point_interaction(&mut surface, &click(10.0, 0.0));
    let before = controller.snapshot();
    let emitted = surface.snapshots.len();

    controller.on_point_interaction(&mut surface, &click(POISON_LON, 0.0));

    assert_eq!(controller.state(), SessionState::Active);
    assert_eq!(controller.snapshot(), before, "session keeps its prior valid state");
    assert_eq!(surface.snapshots.len(), emitted, "failed recompute emits nothing");
    assert_eq!(surface.errors.len(), 1, "failure is surfaced to the host");

    // The loop survives; the next valid toggle goes through
    controller.on_point_interaction(&mut surface, &click(10.0, 10.0));
    assert_eq!(controller.snapshot().points.len(), 3);
    assert_eq!(surface.snapshots.len(), emitted + 1);
}

/// Planar primitives whose failure can be switched on mid-session.
struct SwitchablePrimitives {
    fail: Arc<AtomicBool>,
}

impl MeasurePrimitives for SwitchablePrimitives {
    fn path_length(&self, path: &PathGeometry) -> MeasureResult<f64> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PrimitiveError::MalformedGeometry("length rejected".into()));
        }
        PlanarPrimitives.path_length(path)
    }

    fn ring_area(&self, region: &RegionGeometry) -> MeasureResult<f64> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PrimitiveError::MalformedGeometry("area rejected".into()));
        }
        PlanarPrimitives.ring_area(region)
    }
}

#[test]
fn test_failed_finish_stays_active() {
    let fail = Arc::new(AtomicBool::new(false));
    let mut surface = FakeSurface::default();
    let mut controller = MeasureController::with_primitives(
        MeasureOptions::default(),
        SwitchablePrimitives { fail: fail.clone() },
    );

    controller.start(&mut surface);
    controller.on_point_interaction(&mut surface, &click(0.0, 0.0));
    controller.on_point_interaction(&mut surface, &click(10.0, 0.0));
    let before = controller.snapshot();
    let emitted = surface.snapshots.len();

    fail.store(true, Ordering::SeqCst);
    controller.finish(&mut surface);

    assert_eq!(controller.state(), SessionState::Active, "failed finish does not transition");
    assert_eq!(controller.snapshot(), before);
    assert_eq!(surface.snapshots.len(), emitted);
    assert_eq!(surface.live.len(), 1, "subscription survives a failed finish");
    assert_eq!(surface.errors.len(), 1);

    fail.store(false, Ordering::SeqCst);
    controller.finish(&mut surface);
    assert_eq!(controller.state(), SessionState::Done);
    assert_eq!(controller.snapshot().path.coordinates.len(), 3);
}

#[test]
fn test_stale_hit_is_ignored_but_still_redraws() {
    let mut surface = FakeSurface::default();
    let mut controller = active_controller(&mut surface);

    controller.on_point_interaction(&mut surface, &click(10.0, 10.0));
    let id = controller.snapshot().points[0].id;
    controller.on_point_interaction(&mut surface, &click(10.0, 10.0));
    assert!(controller.snapshot().points.is_empty());

    // Surface still renders the removed point (stale frame): the toggle
    // resolves to a stale id and must not add or remove anything.
    surface.snapshots.push(Snapshot {
        points: vec![PlacedPoint { id, coordinate: LonLat::new(10.0, 10.0) }],
        path: PathGeometry::default(),
        region: None,
        measurement: Measurement::default(),
    });
    let emitted = surface.snapshots.len();
    controller.on_point_interaction(&mut surface, &click(10.0, 10.0));
    assert!(controller.snapshot().points.is_empty());
    assert_eq!(surface.snapshots.len(), emitted + 1, "stale toggle still redraws");
}

#[test]
fn test_pointer_move_updates_cursor_only_while_active() {
    let mut surface = FakeSurface::default();
    let mut controller =
        MeasureController::with_primitives(MeasureOptions::default(), PlanarPrimitives);

    controller.on_pointer_move(&mut surface, ScreenPos { x: 0.0, y: 0.0 });
    assert!(surface.cursors.is_empty(), "idle sessions leave the cursor alone");

    controller.start(&mut surface);
    controller.on_pointer_move(&mut surface, ScreenPos { x: 0.0, y: 0.0 });
    assert_eq!(surface.cursors.last(), Some(&CursorStyle::Crosshair));

    controller.on_point_interaction(&mut surface, &click(0.0, 0.0));
    controller.on_pointer_move(&mut surface, ScreenPos { x: 0.0, y: 0.0 });
    assert_eq!(surface.cursors.last(), Some(&CursorStyle::Pointer));
}
