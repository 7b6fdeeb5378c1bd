use std::fmt;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::observer::subject::{Observer, ObserverSubject, Subscription};
use crate::position::geo_position::GeoPosition;
use crate::Coordinates;

/// What subscribers receive each time a position is set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub position: Option<Arc<GeoPosition>>,
    pub coordinates: Option<Coordinates>,
}

/// Holds the current position and tells subscribers when it changes.
#[derive(Debug, Default)]
pub struct GeocodingState {
    current_position: Option<Arc<GeoPosition>>,
    current_coordinates: Option<Coordinates>,
    subject: ObserverSubject<StateSnapshot>,
}

impl GeocodingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current position.
    ///
    /// Subscribers are notified for `Some`; `None` clears the state without
    /// notification. Coordinates are derived only when the position has both
    /// latitude and longitude.
    pub fn set_position(&mut self, position: Option<Arc<GeoPosition>>) -> &mut Self {
        self.current_coordinates = position.as_deref().and_then(|p| {
            Some(Coordinates::new(p.latitude()?, p.longitude()?))
        });
        self.current_position = position;

        if self.current_position.is_some() {
            debug!("position updated: {:?}", self.current_coordinates);
            self.subject.notify_observers(&self.snapshot());
        } else {
            debug!("position cleared");
        }
        self
    }

    pub fn current_position(&self) -> Option<Arc<GeoPosition>> {
        self.current_position.clone()
    }

    pub fn current_coordinates(&self) -> Option<Coordinates> {
        self.current_coordinates
    }

    pub fn has_position(&self) -> bool {
        self.current_position.is_some()
    }

    /// Resets position and coordinates. Subscribers are not notified.
    pub fn clear(&mut self) {
        self.current_position = None;
        self.current_coordinates = None;
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription<StateSnapshot>
    where
        F: Fn(&StateSnapshot) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subject.subscribe(callback)
    }

    pub fn subscribe_observer(&self, observer: Observer<StateSnapshot>) -> Subscription<StateSnapshot> {
        self.subject.subscribe_observer(observer)
    }

    pub fn unsubscribe(&self, observer: &Observer<StateSnapshot>) -> bool {
        self.subject.unsubscribe(observer)
    }

    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }

    pub fn clear_observers(&self) {
        self.subject.clear_observers();
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            position: self.current_position.clone(),
            coordinates: self.current_coordinates,
        }
    }
}

impl fmt::Display for GeocodingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = if self.current_position.is_some() { "available" } else { "null" };
        write!(f, "GeocodingState: position: {position}, coordinates: ")?;
        match self.current_coordinates {
            Some(c) => write!(f, "({:.4}, {:.4})", c.latitude, c.longitude)?,
            None => f.write_str("null")?,
        }
        write!(f, ", observers: {}", self.observer_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::coords::{GeoCoords, GeoPositionInput};
    use anyhow::bail;
    use std::sync::Mutex;

    fn position(lat: f64, lon: f64) -> Arc<GeoPosition> {
        Arc::new(GeoPosition::from_input(&GeoPositionInput::new(
            GeoCoords::new(lat, lon).with_accuracy(15.0),
        )))
    }

    #[test]
    fn starts_empty() {
        let state = GeocodingState::new();
        assert!(!state.has_position());
        assert!(state.current_position().is_none());
        assert!(state.current_coordinates().is_none());
        assert_eq!(state.observer_count(), 0);
        assert_eq!(
            state.to_string(),
            "GeocodingState: position: null, coordinates: null, observers: 0"
        );
    }

    #[test]
    fn set_position_derives_coordinates_and_notifies() {
        let mut state = GeocodingState::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        state.subscribe(move |snapshot| {
            sink.lock().unwrap().push(snapshot.clone());
            Ok(())
        });

        let pos = position(-23.5505, -46.6333);
        state.set_position(Some(Arc::clone(&pos)));

        assert_eq!(
            state.current_coordinates(),
            Some(Coordinates::new(-23.5505, -46.6333))
        );
        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert!(Arc::ptr_eq(received[0].position.as_ref().unwrap(), &pos));
        assert_eq!(received[0].coordinates, state.current_coordinates());
        assert_eq!(
            state.to_string(),
            "GeocodingState: position: available, coordinates: (-23.5505, -46.6333), observers: 1"
        );
    }

    #[test]
    fn setting_none_clears_silently() {
        let mut state = GeocodingState::new();
        state.set_position(Some(position(1.0, 2.0)));
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        state.subscribe(move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });

        state.set_position(None);
        assert!(!state.has_position());
        assert!(state.current_coordinates().is_none());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn clear_does_not_notify() {
        let mut state = GeocodingState::new();
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        state.subscribe(move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });
        state.set_position(Some(position(1.0, 2.0))).clear();
        assert!(!state.has_position());
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn zero_coordinates_are_kept() {
        let mut state = GeocodingState::new();
        state.set_position(Some(position(0.0, 0.0)));
        assert_eq!(state.current_coordinates(), Some(Coordinates::new(0.0, 0.0)));
    }

    #[test]
    fn position_without_coordinates_has_no_derived_pair() {
        let mut state = GeocodingState::new();
        state.set_position(Some(Arc::new(GeoPosition::empty())));
        assert!(state.has_position());
        assert!(state.current_coordinates().is_none());
    }

    #[test]
    fn state_survives_failing_observers() {
        let mut state = GeocodingState::new();
        state.subscribe(|_| bail!("first"));
        state.subscribe(|_| bail!("second"));
        state.set_position(Some(position(5.0, 6.0)));
        assert!(state.has_position());
        assert_eq!(state.current_coordinates(), Some(Coordinates::new(5.0, 6.0)));
    }

    #[test]
    fn unsubscribe_variants() {
        let state = GeocodingState::new();
        let handle = state.subscribe(|_| Ok(()));
        let observer: Observer<StateSnapshot> =
            Arc::new(|_: &StateSnapshot| -> anyhow::Result<()> { Ok(()) });
        state.subscribe_observer(Arc::clone(&observer));
        assert_eq!(state.observer_count(), 2);

        assert!(handle.unsubscribe());
        assert!(!handle.unsubscribe());
        assert!(state.unsubscribe(&observer));
        assert!(!state.unsubscribe(&observer));

        state.subscribe(|_| Ok(()));
        state.clear_observers();
        assert_eq!(state.observer_count(), 0);
    }
}
