use crate::models::SyncState;

/// A state change that drivers must react to exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Running job finished successfully
    Completed,
    /// Running job ended in failure
    Failed,
}

/// Compare the previously cached state with a freshly fetched one.
///
/// Only a move out of a still-active state into an explicit terminal state is
/// an edge. No previous reading, or a previous reading that was already
/// terminal or idle, never produces one.
pub fn detect_edge(previous: Option<SyncState>, current: SyncState) -> Option<Edge> {
    let was_active = previous.map_or(false, |state| state.is_active());
    if !was_active {
        return None;
    }

    match current {
        SyncState::Completed => Some(Edge::Completed),
        SyncState::Failed => Some(Edge::Failed),
        SyncState::Idle | SyncState::InProgress | SyncState::Unrecognized => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SyncState::*;

    #[test]
    fn test_in_progress_to_terminal() {
        assert_eq!(detect_edge(Some(InProgress), Completed), Some(Edge::Completed));
        assert_eq!(detect_edge(Some(InProgress), Failed), Some(Edge::Failed));
    }

    #[test]
    fn test_first_reading_never_fires() {
        for state in [Idle, InProgress, Completed, Failed, Unrecognized] {
            assert_eq!(detect_edge(None, state), None);
        }
    }

    #[test]
    fn test_sustained_terminal_does_not_fire() {
        assert_eq!(detect_edge(Some(Completed), Completed), None);
        assert_eq!(detect_edge(Some(Failed), Failed), None);
        assert_eq!(detect_edge(Some(Failed), Completed), None);
    }

    #[test]
    fn test_entering_in_progress_does_not_fire() {
        assert_eq!(detect_edge(Some(Idle), InProgress), None);
        assert_eq!(detect_edge(Some(Completed), InProgress), None);
        assert_eq!(detect_edge(Some(InProgress), InProgress), None);
    }

    #[test]
    fn test_idle_to_completed_does_not_fire() {
        assert_eq!(detect_edge(Some(Idle), Completed), None);
    }

    #[test]
    fn test_unrecognized_counts_as_running() {
        assert_eq!(detect_edge(Some(InProgress), Unrecognized), None);
        assert_eq!(detect_edge(Some(Unrecognized), Completed), Some(Edge::Completed));
        assert_eq!(detect_edge(Some(Unrecognized), Failed), Some(Edge::Failed));
    }

    #[test]
    fn test_in_progress_to_idle_is_not_an_edge() {
        assert_eq!(detect_edge(Some(InProgress), Idle), None);
    }
}
