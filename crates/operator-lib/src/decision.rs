//! Replica change decision

/// Returns true if a workload at `current_replicas` has to be written to
/// reach `target_replicas`.
///
/// The loop re-runs every requeue interval, so an already-correct workload
/// must not produce a write.
pub fn needs_scale(current_replicas: i32, target_replicas: i32) -> bool {
    current_replicas != target_replicas
}
