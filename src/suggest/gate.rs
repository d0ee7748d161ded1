//! Restart decisions for the asynchronous sources on each keystroke.

/// What to do with one source (history or suggest) when the input changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Leave the in-flight work and accumulated results alone.
    KeepRunning,
    /// Stop the source, clear its results, and start a fresh request.
    StartNew,
    /// Stop the source and clear its results without restarting.
    StayStopped,
}

impl GateDecision {
    /// Whether in-flight work and accumulated results must be discarded.
    pub fn stops(self) -> bool {
        self != GateDecision::KeepRunning
    }
}

/// Snapshot of one source's state as seen by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateInput {
    /// The input changed only trivially (e.g. cursor movement).
    pub minimal_changes: bool,
    /// The source already produced results for the current query.
    pub have_results: bool,
    /// The previous query has not finished.
    pub currently_running: bool,
    /// Only synchronous work is allowed for this keystroke.
    pub synchronous_only: bool,
}

/// Decide whether a source may keep running across a keystroke.
///
/// A minimal change keeps the source when it already has results, or when the
/// previous query is still running and async work remains allowed.
pub fn decide(input: GateInput) -> GateDecision {
    let may_continue =
        input.have_results || (input.currently_running && !input.synchronous_only);
    if input.minimal_changes && may_continue {
        return GateDecision::KeepRunning;
    }
    if input.synchronous_only {
        GateDecision::StayStopped
    } else {
        GateDecision::StartNew
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(
        minimal_changes: bool,
        have_results: bool,
        currently_running: bool,
        synchronous_only: bool,
    ) -> GateDecision {
        decide(GateInput {
            minimal_changes,
            have_results,
            currently_running,
            synchronous_only,
        })
    }

    #[test]
    fn test_non_minimal_change_always_restarts() {
        assert_eq!(gate(false, true, true, false), GateDecision::StartNew);
        assert_eq!(gate(false, false, false, false), GateDecision::StartNew);
    }

    #[test]
    fn test_minimal_change_keeps_results() {
        assert_eq!(gate(true, true, false, false), GateDecision::KeepRunning);
        assert_eq!(gate(true, true, false, true), GateDecision::KeepRunning);
    }

    #[test]
    fn test_minimal_change_keeps_running_request() {
        assert_eq!(gate(true, false, true, false), GateDecision::KeepRunning);
    }

    #[test]
    fn test_synchronous_only_never_starts() {
        assert_eq!(gate(true, false, true, true), GateDecision::StayStopped);
        assert_eq!(gate(false, false, false, true), GateDecision::StayStopped);
    }

    #[test]
    fn test_minimal_change_without_work_restarts() {
        assert_eq!(gate(true, false, false, false), GateDecision::StartNew);
    }

    #[test]
    fn test_stops() {
        assert!(!GateDecision::KeepRunning.stops());
        assert!(GateDecision::StartNew.stops());
        assert!(GateDecision::StayStopped.stops());
    }
}
