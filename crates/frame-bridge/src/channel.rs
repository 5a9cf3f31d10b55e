use adweave_core_types::FrameId;

/// The frame relationship: which window we talk to and the only origin we
/// address. Inbound source identity and outbound recipient origin are both
/// checked against this value, never against ambient globals.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameChannel {
    pub frame: FrameId,
    pub origin: String,
}

impl FrameChannel {
    pub fn new(frame: FrameId, origin: impl Into<String>) -> Self {
        Self {
            frame,
            origin: origin.into(),
        }
    }
}
