//! Gate constants

/// Default peak-amplitude admission threshold (raw i16 counts).
/// A clip whose peak absolute sample value falls below this is never
/// handed to the classifier.
pub const DEFAULT_GATE_THRESHOLD: i16 = 1000;
