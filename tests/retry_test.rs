mod common;

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use common::RecordingObserver;
use sporldisco::{
    error::{CallError, RemoteError},
    pipeline::{
        DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, MAX_RETRY_AFTER, ResilientCaller, RetryPolicy,
    },
};
use tokio::time::Instant;

fn caller(max_attempts: u32, base_delay: Duration) -> (Arc<RecordingObserver>, ResilientCaller) {
    let (recorder, observer) = RecordingObserver::handle();
    (
        recorder,
        ResilientCaller::new(RetryPolicy::new(max_attempts, base_delay), observer),
    )
}

#[test]
fn test_default_policy() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, DEFAULT_MAX_ATTEMPTS);
    assert_eq!(policy.base_delay, DEFAULT_BASE_DELAY);
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.base_delay, Duration::from_secs(1));
}

#[test]
fn test_policy_needs_at_least_one_attempt() {
    let policy = RetryPolicy::new(0, Duration::from_millis(10));
    assert_eq!(policy.max_attempts, 1);
}

#[test]
fn test_backoff_doubles_per_attempt() {
    let policy = RetryPolicy::new(5, Duration::from_millis(100));
    assert_eq!(policy.backoff(0), Duration::from_millis(100));
    assert_eq!(policy.backoff(1), Duration::from_millis(200));
    assert_eq!(policy.backoff(2), Duration::from_millis(400));

    // Large exponents are capped instead of overflowing
    let capped = Duration::from_millis(100).saturating_mul(u32::MAX);
    assert_eq!(policy.backoff(32), capped);
    assert_eq!(policy.backoff(200), capped);
}

#[test]
fn test_rate_limit_hint_wins_over_backoff() {
    let policy = RetryPolicy::new(3, Duration::from_millis(100));

    let hinted = RemoteError::RateLimited {
        retry_after: Some(Duration::from_secs(7)),
    };
    assert_eq!(policy.delay_for(2, &hinted), Duration::from_secs(7));

    let unhinted = RemoteError::RateLimited { retry_after: None };
    assert_eq!(policy.delay_for(2, &unhinted), Duration::from_millis(400));

    let fault = RemoteError::Fault("502 Bad Gateway".to_string());
    assert_eq!(policy.delay_for(1, &fault), Duration::from_millis(200));
}

#[test]
fn test_long_wait_hint_is_clamped() {
    let policy = RetryPolicy::new(3, Duration::from_millis(100));

    let hour = RemoteError::RateLimited {
        retry_after: Some(Duration::from_secs(3600)),
    };
    assert_eq!(policy.delay_for(0, &hour), MAX_RETRY_AFTER);
    assert_eq!(MAX_RETRY_AFTER, Duration::from_secs(60));

    let minute = RemoteError::RateLimited {
        retry_after: Some(MAX_RETRY_AFTER),
    };
    assert_eq!(policy.delay_for(0, &minute), MAX_RETRY_AFTER);
}

#[tokio::test(start_paused = true)]
async fn test_hour_long_hint_waits_one_minute() {
    let (recorder, caller) = caller(2, Duration::from_millis(100));
    let attempts = AtomicU32::new(0);
    let started = Instant::now();

    let counter = &attempts;
    let result = caller
        .call("search_artists", move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RemoteError::RateLimited {
                    retry_after: Some(Duration::from_secs(3600)),
                })
            } else {
                Ok("found")
            }
        })
        .await;

    assert_eq!(result.unwrap(), "found");
    assert_eq!(recorder.retry_delays(), vec![MAX_RETRY_AFTER]);
    assert!(started.elapsed() < Duration::from_secs(3600));
}

#[test]
fn test_retryable_errors() {
    assert!(RemoteError::RateLimited { retry_after: None }.is_retryable());
    assert!(RemoteError::Fault("timeout".to_string()).is_retryable());
    assert!(!RemoteError::Unauthenticated.is_retryable());
    assert!(!RemoteError::Rejected("404 Not Found".to_string()).is_retryable());
    assert!(!RemoteError::Malformed("missing field".to_string()).is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_success_needs_a_single_attempt() {
    let (recorder, caller) = caller(3, Duration::from_secs(1));
    let attempts = AtomicU32::new(0);
    let counter = &attempts;

    let result: Result<u32, CallError> = caller
        .call("current_user", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        })
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(recorder.retry_delays().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_waits_for_the_hint_then_succeeds() {
    let (recorder, caller) = caller(3, Duration::from_millis(100));
    let attempts = AtomicU32::new(0);
    let counter = &attempts;
    let started = Instant::now();

    let result = caller
        .call("list_albums", move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RemoteError::RateLimited {
                    retry_after: Some(Duration::from_secs(2)),
                })
            } else {
                Ok("page")
            }
        })
        .await;

    assert_eq!(result.unwrap(), "page");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(recorder.retry_delays(), vec![Duration::from_secs(2)]);
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_max_attempts() {
    let (recorder, caller) = caller(3, Duration::from_millis(100));
    let attempts = AtomicU32::new(0);
    let counter = &attempts;

    let result: Result<(), CallError> = caller
        .call("list_tracks", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::Fault("503 Service Unavailable".to_string()))
        })
        .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    let error = result.unwrap_err();
    assert!(error.is_exhausted());
    match &error {
        CallError::Exhausted {
            operation,
            attempts,
            last,
        } => {
            assert_eq!(*operation, "list_tracks");
            assert_eq!(*attempts, 3);
            assert_eq!(last, &RemoteError::Fault("503 Service Unavailable".to_string()));
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }

    // No sleep after the final attempt
    assert_eq!(
        recorder.retry_delays(),
        vec![Duration::from_millis(100), Duration::from_millis(200)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_policy_never_sleeps() {
    let (recorder, caller) = caller(1, Duration::from_secs(1));
    let started = Instant::now();

    let result: Result<(), CallError> = caller
        .call("search_artists", || async {
            Err(RemoteError::RateLimited { retry_after: None })
        })
        .await;

    assert!(result.unwrap_err().is_exhausted());
    assert!(recorder.retry_delays().is_empty());
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_errors_are_returned_at_once() {
    let rejected = vec![
        RemoteError::Unauthenticated,
        RemoteError::Rejected("403 Forbidden".to_string()),
        RemoteError::Malformed("expected value".to_string()),
    ];

    for signal in rejected {
        let (recorder, caller) = caller(5, Duration::from_secs(1));
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let scripted = signal.clone();

        let result: Result<(), CallError> = caller
            .call("create_playlist", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                let signal = scripted.clone();
                async move { Err(signal) }
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        let error = result.unwrap_err();
        assert!(!error.is_exhausted());
        assert_eq!(error.remote(), &signal);
        assert!(recorder.retry_delays().is_empty());
    }
}
