use gilrs::{EventType, Gilrs};

use crate::event::GlobalEvent;
use crate::platform::EventSink;

/// Reports gamepad connect and disconnect as global events.
pub(crate) struct GamepadWatcher {
    gilrs: Gilrs,
}

impl GamepadWatcher {
    /// `None` when the OS gamepad backend is unavailable.
    pub(crate) fn new() -> Option<Self> {
        match Gilrs::new() {
            Ok(gilrs) => {
                for (id, gamepad) in gilrs.gamepads() {
                    tracing::info!("Gamepad {} present: {}", id, gamepad.name());
                }
                Some(Self { gilrs })
            }
            Err(err) => {
                tracing::warn!("Gamepad support unavailable: {}", err);
                None
            }
        }
    }

    pub(crate) fn poll(&mut self, sink: &mut dyn EventSink) {
        while let Some(event) = self.gilrs.next_event() {
            let connected = match event.event {
                EventType::Connected => true,
                EventType::Disconnected => false,
                _ => continue,
            };
            tracing::debug!(
                "Gamepad {} {}",
                event.id,
                if connected { "connected" } else { "disconnected" }
            );
            sink.push_global_event(GlobalEvent::GamepadConnectChanged {
                id: usize::from(event.id) as u32,
                connected,
            });
        }
    }
}
