//! Scope entry, nesting and restore behaviour.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use request_deadline::deadline::{current, set_duration};
use request_deadline::{
    check_deadline, clear_deadline, enter, is_expired, time_elapsed, time_remaining, timeout,
    without_deadline,
};

mod common;

#[test]
fn test_remaining_is_positive_and_bounded() {
    for millis in [50u64, 1_000, 60_000] {
        let budget = Duration::from_millis(millis);
        timeout(budget, || {
            let left = time_remaining().unwrap();
            assert!(left > Duration::ZERO);
            assert!(left <= budget);
        });
    }
}

#[test]
fn test_unlimited_scopes_never_expire() {
    for budget in [None, Some(0.0_f64), Some(-3.0), Some(f64::NAN)] {
        timeout(budget, || {
            common::outlast(Duration::from_millis(1));
            assert!(!is_expired());
            assert_eq!(time_remaining(), None);
            assert_eq!(check_deadline(), Ok(()));
        });
    }
}

#[test]
fn test_nested_scopes_clamp_to_tightest_ancestor() {
    timeout(Duration::from_secs(3), || {
        timeout(Duration::from_secs(2), || {
            timeout(Duration::from_secs(4), || {
                let left = time_remaining().unwrap();
                assert!(left <= Duration::from_secs(2));
            });
            assert!(time_remaining().unwrap() <= Duration::from_secs(2));
        });
        let outer = time_remaining().unwrap();
        assert!(outer > Duration::from_secs(2));
        assert!(outer <= Duration::from_secs(3));
    });
}

#[test]
fn test_expired_scope_signals_once_then_restores() {
    let guard = enter(Duration::from_millis(100));
    std::thread::sleep(Duration::from_millis(110));

    assert!(is_expired());
    let err = check_deadline().unwrap_err();
    assert!(err.elapsed >= Duration::from_millis(100));
    assert_eq!(check_deadline(), Ok(()));

    drop(guard);
    assert!(!is_expired());
    assert_eq!(time_remaining(), None);
}

#[test]
fn test_restore_is_exact_after_failure() {
    timeout(Duration::from_secs(10), || {
        let before = current();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            timeout(Duration::from_millis(5), || panic!("unit of work failed"))
        }));

        assert!(result.is_err());
        assert_eq!(current(), before);
    });
}

#[test]
fn test_restore_is_exact_after_error_result() {
    let before = current();
    let result: Result<(), &str> = timeout(Duration::from_secs(1), || Err("failed"));

    assert_eq!(result, Err("failed"));
    assert_eq!(current(), before);
}

#[test]
fn test_set_duration_outside_scope_is_noop() {
    set_duration(Duration::from_secs(5));
    assert_eq!(time_remaining(), None);
    assert_eq!(time_elapsed(), None);
}

#[test]
fn test_set_duration_cannot_escape_parent() {
    timeout(Duration::from_secs(1), || {
        timeout(Duration::from_millis(100), || {
            set_duration(Duration::from_secs(30));
            assert!(time_remaining().unwrap() <= Duration::from_secs(1));
        });
    });
}

#[test]
fn test_clear_only_affects_innermost_scope() {
    timeout(Duration::from_secs(5), || {
        timeout(Duration::from_secs(1), || {
            clear_deadline();
            assert_eq!(time_remaining(), None);
        });
        assert!(time_remaining().is_some());
    });
}

#[test]
fn test_without_deadline_exempts_cleanup() {
    timeout(Duration::from_millis(1), || {
        common::outlast(Duration::from_millis(1));
        without_deadline(|| assert_eq!(check_deadline(), Ok(())));
        assert!(check_deadline().is_err());
    });
}

#[test]
fn test_threads_are_independent() {
    timeout(Duration::from_secs(5), || {
        let other = std::thread::spawn(time_remaining).join().unwrap();
        assert_eq!(other, None);
        assert!(time_remaining().is_some());
    });
}
