//! The measurement session state machine.
//!
//! A session runs `Idle -> Active -> (Idle | Done)`. While active, the host's
//! rendering surface delivers point interactions; each one is handled to
//! completion (store mutation, geometry rederivation, measurement recompute,
//! snapshot emission) before the next. The point-interaction stream is a
//! scoped resource: the controller holds at most one live subscription handle
//! and releases it on every transition out of `Active`.

use crate::geometry::{derive_path, derive_region, LonLat, PathGeometry, RegionGeometry};
use crate::measure::{GeodesicPrimitives, MeasureEngine, Measurement, MeasurePrimitives, PrimitiveError};
use crate::points::{PlacedPoint, PointId, PointStore};
use crate::units::LengthUnit;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

#[cfg(test)]
mod tests_interactions;

/// Identifies one measurement lifecycle, for host correlation and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Active,
    Done,
}

/// Session configuration, resolved once at controller creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasureOptions {
    pub length_unit: LengthUnit,
}

/// Screen-space location of an interaction, as the surface reported it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPos {
    pub x: f64,
    pub y: f64,
}

/// A point interaction delivered by the rendering surface: add-or-remove at
/// `location`, placing `coordinate` if nothing is hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInteraction {
    pub location: ScreenPos,
    pub coordinate: LonLat,
}

/// Hover affordance over the map canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Crosshair,
    Pointer,
}

impl fmt::Display for CursorStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crosshair => write!(f, "crosshair"),
            Self::Pointer => write!(f, "pointer"),
        }
    }
}

/// Handle for a live point-interaction subscription, minted by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The rendering surface the session talks to: event source, hit-test
/// provider, and visual sink. Implemented by the host.
pub trait MapSurface {
    /// Begin delivering point interactions to the controller.
    fn subscribe_interactions(&mut self) -> SubscriptionId;

    /// Stop delivering point interactions for `subscription`.
    fn unsubscribe_interactions(&mut self, subscription: SubscriptionId);

    /// Hit-test against currently rendered points.
    fn query_point_at(&self, location: ScreenPos) -> Option<PointId>;

    /// Redraw from the given snapshot.
    fn apply_snapshot(&mut self, snapshot: &Snapshot);

    /// Update the hover cursor.
    fn set_cursor(&mut self, cursor: CursorStyle);

    /// A measurement primitive rejected the current geometry. The session
    /// keeps its prior state; hosts may show the message.
    fn report_error(&mut self, _error: &PrimitiveError) {}
}

/// Combined read-only output emitted after every state-affecting event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub points: Vec<PlacedPoint>,
    pub path: PathGeometry,
    pub region: Option<RegionGeometry>,
    pub measurement: Measurement,
}

/// One measurement lifecycle's state. Constructed fresh on `start`, replaced
/// wholesale on restart or cancel; never mutated in place across lifecycles.
#[derive(Debug, Clone)]
struct Session {
    id: SessionId,
    store: PointStore,
    path: PathGeometry,
    region: Option<RegionGeometry>,
    measurement: Measurement,
}

impl Session {
    fn new() -> Self {
        Self {
            id: SessionId::new(),
            store: PointStore::new(),
            path: PathGeometry::default(),
            region: None,
            measurement: Measurement::default(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            points: self.store.points().to_vec(),
            path: self.path.clone(),
            region: self.region.clone(),
            measurement: self.measurement,
        }
    }
}

/// Orchestrates the session lifecycle. Owns the point store and invokes the
/// geometry derivers and the measurement engine on every mutation; the host
/// owns the surface and passes it into each call.
pub struct MeasureController<P: MeasurePrimitives = GeodesicPrimitives> {
    engine: MeasureEngine<P>,
    state: SessionState,
    session: Session,
    subscription: Option<SubscriptionId>,
}

impl MeasureController<GeodesicPrimitives> {
    pub fn new(options: MeasureOptions) -> Self {
        Self::with_primitives(options, GeodesicPrimitives)
    }
}

impl<P: MeasurePrimitives> MeasureController<P> {
    pub fn with_primitives(options: MeasureOptions, primitives: P) -> Self {
        Self {
            engine: MeasureEngine::new(primitives, options.length_unit),
            state: SessionState::Idle,
            session: Session::new(),
            subscription: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> SessionId {
        self.session.id
    }

    pub fn length_unit(&self) -> LengthUnit {
        self.engine.unit()
    }

    /// Read-only view of the current session.
    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    /// Begin a new measurement. Valid from any state; a previous session's
    /// geometry and measurement are discarded, and any live subscription is
    /// released before the new one is acquired so toggles are never
    /// delivered twice.
    pub fn start<S: MapSurface>(&mut self, surface: &mut S) {
        self.release_subscription(surface);
        self.session = Session::new();
        self.state = SessionState::Active;
        self.subscription = Some(surface.subscribe_interactions());
        debug!(session = %self.session.id, "measurement session started");
        self.emit(surface);
    }

    /// Handle an add-or-remove interaction. Ignored unless `Active`.
    pub fn on_point_interaction<S: MapSurface>(&mut self, surface: &mut S, event: &PointInteraction) {
        if self.state != SessionState::Active {
            return;
        }

        // Mutate a candidate copy; commit only once the recompute succeeds,
        // so a primitive failure leaves the prior state observable.
        let hit = surface.query_point_at(event.location);
        let mut next = self.session.clone();
        let outcome = next.store.toggle(hit, event.coordinate);
        next.path = derive_path(next.store.points(), false);
        next.region = derive_region(next.store.points());

        match self.engine.measure(&next.path, next.region.as_ref()) {
            Ok(measurement) => {
                next.measurement = measurement;
                debug!(
                    session = %next.id,
                    points = next.store.len(),
                    ?outcome,
                    "point toggled"
                );
                self.session = next;
                self.emit(surface);
            }
            Err(error) => {
                warn!(session = %self.session.id, %error, "measurement failed; keeping previous state");
                surface.report_error(&error);
            }
        }
    }

    /// Abort the session: clear everything, release the subscription, return
    /// to `Idle`. No-op unless `Active`.
    pub fn cancel<S: MapSurface>(&mut self, surface: &mut S) {
        if self.state != SessionState::Active {
            return;
        }
        self.release_subscription(surface);
        debug!(session = %self.session.id, "measurement session cancelled");
        self.session = Session::new();
        self.state = SessionState::Idle;
        self.emit(surface);
    }

    /// Finalize the session: close the path back to the first point and
    /// re-measure its length. The region and area keep their last computed
    /// values. No-op unless `Active`.
    pub fn finish<S: MapSurface>(&mut self, surface: &mut S) {
        if self.state != SessionState::Active {
            return;
        }

        let path = derive_path(self.session.store.points(), true);
        match self.engine.length(&path) {
            Ok(total_length) => {
                self.release_subscription(surface);
                self.session.path = path;
                self.session.measurement.total_length = total_length;
                self.state = SessionState::Done;
                debug!(session = %self.session.id, "measurement session finished");
                self.emit(surface);
            }
            Err(error) => {
                warn!(session = %self.session.id, %error, "closing length failed; session stays active");
                surface.report_error(&error);
            }
        }
    }

    /// Hover affordance only: pointer over an existing point, crosshair
    /// elsewhere. Ignored unless `Active`; never touches measurement state.
    pub fn on_pointer_move<S: MapSurface>(&mut self, surface: &mut S, location: ScreenPos) {
        if self.state != SessionState::Active {
            return;
        }
        let cursor = if surface.query_point_at(location).is_some() {
            CursorStyle::Pointer
        } else {
            CursorStyle::Crosshair
        };
        surface.set_cursor(cursor);
    }

    fn release_subscription<S: MapSurface>(&mut self, surface: &mut S) {
        if let Some(subscription) = self.subscription.take() {
            surface.unsubscribe_interactions(subscription);
        }
    }

    fn emit<S: MapSurface>(&mut self, surface: &mut S) {
        let snapshot = self.session.snapshot();
        surface.apply_snapshot(&snapshot);
    }
}
