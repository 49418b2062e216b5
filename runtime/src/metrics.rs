//! Metric descriptions for the Store runtime.
//!
//! The Store records through the `metrics` facade; whichever recorder the
//! host application installs receives the values. Call
//! [`describe_store_metrics`] once at startup so recorders that support
//! descriptions (Prometheus, `StatsD`, ...) can label them.
//!
//! | Metric | Kind | Meaning |
//! |--------|------|---------|
//! | `store.commands.total` | counter | Actions reduced (user and feedback) |
//! | `store.reducer.duration_seconds` | histogram | Time spent inside `reduce` |
//! | `store.effects.count` | histogram | Effects returned per action |
//! | `store.effects.executed` | counter | Effects executed, labelled by `type` |
//! | `store.shutdown.*` | counter | Shutdown lifecycle |

use metrics::{Unit, describe_counter, describe_histogram};

/// Metric name: actions reduced
pub const COMMANDS_TOTAL: &str = "store.commands.total";
/// Metric name: reducer execution time
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";
/// Metric name: effects returned per action
pub const EFFECTS_COUNT: &str = "store.effects.count";
/// Metric name: effects executed by type
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";

/// Register descriptions for every metric the Store emits.
pub fn describe_store_metrics() {
    describe_counter!(COMMANDS_TOTAL, Unit::Count, "Total actions reduced by the store");
    describe_histogram!(
        REDUCER_DURATION,
        Unit::Seconds,
        "Time spent executing the reducer for one action"
    );
    describe_histogram!(EFFECTS_COUNT, Unit::Count, "Number of effects returned per action");
    describe_counter!(
        EFFECTS_EXECUTED,
        Unit::Count,
        "Effects executed by the runtime, labelled by effect type"
    );
    describe_counter!(
        "store.shutdown.initiated",
        Unit::Count,
        "Graceful shutdowns started"
    );
    describe_counter!(
        "store.shutdown.completed",
        Unit::Count,
        "Graceful shutdowns that drained all effects"
    );
    describe_counter!(
        "store.shutdown.timeout",
        Unit::Count,
        "Graceful shutdowns that timed out with effects still running"
    );
    describe_counter!(
        "store.shutdown.rejected_actions",
        Unit::Count,
        "Actions rejected because the store was shutting down"
    );
}
