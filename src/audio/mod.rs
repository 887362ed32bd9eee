pub mod driver;
pub mod instrument;
pub mod scheduler;
pub mod transport;

pub use instrument::{DrumKit, InstrumentVoice, PercussionVoice};
pub use scheduler::{PlaybackMonitor, PlaybackState, PlaybackUpdate, TransportScheduler, Voices};
pub use transport::{Cue, ManualTransport, RealtimeTransport, Transport};
