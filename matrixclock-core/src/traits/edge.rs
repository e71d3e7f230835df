//! Square-wave edge notification.

/// One transition of the 1 Hz square wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Signal went high; this is the transition that advances the seconds
    Rising,
    /// Signal went low
    Falling,
}

/// A latched source of square-wave edges
///
/// An edge stays pending until taken, so a transition that happens while
/// the loop is busy with a console command is delivered on the next poll
/// rather than lost. If both transitions occur before a poll (a stalled
/// cycle), the latest level wins and the stall recovery path resyncs the
/// seconds from the chip.
pub trait EdgeSource {
    /// Take the pending edge, if any, clearing it
    fn take_edge(&mut self) -> Option<Edge>;
}
