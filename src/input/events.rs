use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Already-decoded gestures the host feeds into the view. Positions are
/// screen pixels relative to the view's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Confirmed single tap
    Tap { position: Point },
    /// Double tap; zooms in around the position
    DoubleTap { position: Point },
    /// Finger/pointer moved by `delta` while pressed; the content follows it
    Drag { delta: Point },
    /// Pinch or wheel zoom by a multiplicative factor around `focus`
    Zoom { factor: f64, focus: Point },
    /// The view was laid out at a new size
    Resize { size: Point },
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn is_handled(&self) -> bool {
        matches!(self, EventHandled::Handled)
    }
}

impl From<bool> for EventHandled {
    fn from(handled: bool) -> Self {
        if handled {
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }
}

impl InputEvent {
    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::Tap { position } | InputEvent::DoubleTap { position } => Some(*position),
            InputEvent::Zoom { focus, .. } => Some(*focus),
            _ => None,
        }
    }

    /// Whether the event can change the transform
    pub fn is_transform_event(&self) -> bool {
        !matches!(self, InputEvent::Tap { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_event_position() {
        let tap = InputEvent::Tap {
            position: Point::new(10.0, 20.0),
        };
        assert_eq!(tap.position(), Some(Point::new(10.0, 20.0)));
        assert!(!tap.is_transform_event());

        let drag = InputEvent::Drag {
            delta: Point::new(5.0, 5.0),
        };
        assert_eq!(drag.position(), None);
        assert!(drag.is_transform_event());
    }

    #[test]
    fn test_events_deserialize_from_host_json() {
        let json = r#"{"Zoom":{"factor":1.5,"focus":{"x":100.0,"y":50.0}}}"#;
        let event: InputEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            InputEvent::Zoom {
                factor: 1.5,
                focus: Point::new(100.0, 50.0)
            }
        );
    }
}
