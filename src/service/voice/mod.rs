//! Voice playback: audio resources, the transport seam, the session manager and the
//! debounced leave timers that drive it.

pub mod audio;
pub mod debounce;
pub mod session;
pub mod songbird;
pub mod transport;
