//! Foundation crate tests
//!
//! Tests cover:
//! - Error types and recovery strategy mapping
//! - Application state machine transitions

use shotwatch_foundation::error::{AppError, AudioError, RecoveryStrategy};
use shotwatch_foundation::state::{AppState, StateManager};
use std::time::Duration;

// ─── Error Tests ────────────────────────────────────────────────────

#[test]
fn audio_error_wraps_into_app_error() {
    let err: AppError = AudioError::DeviceDisconnected.into();
    assert!(matches!(err, AppError::Audio(AudioError::DeviceDisconnected)));
}

#[test]
fn device_disconnect_maps_to_retry() {
    let err = AppError::Audio(AudioError::DeviceDisconnected);
    match err.recovery_strategy() {
        RecoveryStrategy::Retry {
            max_attempts,
            delay,
        } => {
            assert_eq!(max_attempts, 5);
            assert_eq!(delay, Duration::from_secs(2));
        }
        other => panic!("expected Retry, got {:?}", other),
    }
}

#[test]
fn missing_device_maps_to_fallback() {
    let err = AppError::Audio(AudioError::DeviceNotFound {
        name: Some("hw:1".into()),
    });
    assert!(matches!(
        err.recovery_strategy(),
        RecoveryStrategy::Fallback { .. }
    ));
}

#[test]
fn buffer_overflow_is_ignored() {
    let err = AppError::Audio(AudioError::BufferOverflow { count: 4410 });
    assert!(matches!(err.recovery_strategy(), RecoveryStrategy::Ignore));
}

#[test]
fn fatal_errors_are_fatal() {
    assert!(matches!(
        AppError::Fatal("boom".into()).recovery_strategy(),
        RecoveryStrategy::Fatal
    ));
    assert!(matches!(
        AppError::ShutdownRequested.recovery_strategy(),
        RecoveryStrategy::Fatal
    ));
}

#[test]
fn error_display_includes_context() {
    let err = AudioError::NoDataTimeout {
        duration: Duration::from_secs(5),
    };
    let msg = err.to_string();
    assert!(msg.contains("No audio data"), "got: {}", msg);
}

// ─── State Machine Tests ────────────────────────────────────────────

#[test]
fn state_starts_initializing() {
    let sm = StateManager::new();
    assert_eq!(sm.current(), AppState::Initializing);
}

#[test]
fn normal_lifecycle_transitions_succeed() {
    let sm = StateManager::new();
    sm.transition(AppState::Running).unwrap();
    sm.transition(AppState::Stopping).unwrap();
    sm.transition(AppState::Stopped).unwrap();
    assert_eq!(sm.current(), AppState::Stopped);
}

#[test]
fn recovery_cycle_transitions_succeed() {
    let sm = StateManager::new();
    sm.transition(AppState::Running).unwrap();
    sm.transition(AppState::Recovering {
        from_error: "stream stalled".into(),
    })
    .unwrap();
    sm.transition(AppState::Running).unwrap();
    assert_eq!(sm.current(), AppState::Running);
}

#[test]
fn invalid_transition_is_rejected() {
    let sm = StateManager::new();
    let err = sm.transition(AppState::Stopped);
    assert!(err.is_err());
    // State unchanged after rejected transition
    assert_eq!(sm.current(), AppState::Initializing);
}

#[test]
fn subscribers_observe_transitions() {
    let sm = StateManager::new();
    let rx = sm.subscribe();
    sm.transition(AppState::Running).unwrap();
    assert_eq!(rx.recv().unwrap(), AppState::Running);
}
