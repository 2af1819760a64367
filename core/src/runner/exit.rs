use std::process::ExitStatus;

/// Collapse an `ExitStatus` into the single integer carried by `Exitstatus`.
///
/// Signals map to `128 + signal`, the shell convention. Anything else that
/// carries no code reports 1.
pub fn normalize_exit(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| terminating_signal(status).map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(unix)]
fn terminating_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: ExitStatus) -> Option<i32> {
    None
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::process::ExitStatusExt;

    use super::*;

    #[test]
    fn exit_codes_pass_through() {
        assert_eq!(normalize_exit(std::process::ExitStatus::from_raw(0)), 0);
        assert_eq!(normalize_exit(std::process::ExitStatus::from_raw(3 << 8)), 3);
    }

    #[test]
    fn signals_map_above_128() {
        // raw wait status 9 = killed by SIGKILL
        assert_eq!(normalize_exit(std::process::ExitStatus::from_raw(9)), 137);
    }
}
