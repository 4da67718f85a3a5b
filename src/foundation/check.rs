/// Report a broken internal invariant.
///
/// Logs the failure and returns `cond` so callers can fall back to best-effort
/// behavior. With the `strict-checks` feature the failure panics instead.
#[track_caller]
pub(crate) fn check(cond: bool, message: &str) -> bool {
    if !cond {
        let location = std::panic::Location::caller();
        tracing::error!(%location, "invariant violated: {message}");
        if cfg!(feature = "strict-checks") {
            panic!("invariant violated: {message}");
        }
    }
    cond
}
