//! Boundaries between the detection/recipe core and the outside world.

mod actuator_port;
mod device_link;
mod event_sink;

pub use {actuator_port::ActuatorPort, device_link::DeviceLink, event_sink::EventSink};
