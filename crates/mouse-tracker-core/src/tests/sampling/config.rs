use crate::{Pacing, SamplingConfig, SamplingMode, Termination, TrackerError};

/// WHAT: Every mode round-trips through its textual name
/// WHY: Modes are selected by name from config files and the CLI
#[test]
#[allow(clippy::unwrap_used)]
fn given_mode_names_when_parsing_then_every_mode_recovered() {
    for mode in SamplingMode::ALL {
        assert_eq!(mode.as_str().parse::<SamplingMode>().unwrap(), mode);
    }
}

/// WHAT: Unknown mode names are configuration errors
/// WHY: A typo in a config file must not silently pick a default mode
#[test]
fn given_unknown_mode_name_when_parsing_then_configuration_error() {
    let result = "continuous".parse::<SamplingMode>();

    assert!(matches!(result, Err(TrackerError::Configuration { .. })));
}

/// WHAT: Pacing accepts short and long names
/// WHY: The CLI uses `busy` and `timer`; config files use the full names
#[test]
#[allow(clippy::unwrap_used)]
fn given_pacing_names_when_parsing_then_both_spellings_accepted() {
    assert_eq!("busy".parse::<Pacing>().unwrap(), Pacing::BusyPoll);
    assert_eq!("busy-poll".parse::<Pacing>().unwrap(), Pacing::BusyPoll);
    assert_eq!("timer".parse::<Pacing>().unwrap(), Pacing::ProgrammedTimer);
    assert_eq!(
        "programmed-timer".parse::<Pacing>().unwrap(),
        Pacing::ProgrammedTimer
    );
    assert!("sleep".parse::<Pacing>().is_err());
}

/// WHAT: Only idle-terminated modes are cancellable
/// WHY: Fixed-count sessions always run to completion
#[test]
fn given_modes_when_checking_cancellable_then_only_idle_modes() {
    assert!(!SamplingMode::FixedCount.is_cancellable());
    assert!(!SamplingMode::TimerAssisted.is_cancellable());
    assert!(SamplingMode::IdleAfterFirstMove.is_cancellable());
    assert!(SamplingMode::ContinuousIdle.is_cancellable());
}

/// WHAT: Zero values are clamped to the smallest representable value
/// WHY: A zero cadence would turn pacing into a no-op
#[test]
#[allow(clippy::unwrap_used)]
fn given_zero_values_when_planning_then_clamped_to_one() {
    // Given: Zero cadence, count and sample cap
    let config = SamplingConfig::fixed_count(0, 0).with_max_samples(0);

    // When: Planning a fixed-count session
    let plan = config.plan(SamplingMode::FixedCount).unwrap();

    // Then: Everything is at least 1
    assert_eq!(plan.cadence_ms, 1);
    assert_eq!(plan.termination, Termination::Count(1));
    assert_eq!(plan.max_samples, Some(1));
}

/// WHAT: Timer-assisted mode always uses programmed-timer pacing
/// WHY: The mode is defined by its pacing strategy
#[test]
#[allow(clippy::unwrap_used)]
fn given_busy_pacing_when_planning_timer_assisted_then_timer_pacing() {
    let config = SamplingConfig::fixed_count(10, 1).with_pacing(Pacing::BusyPoll);

    let plan = config.plan(SamplingMode::TimerAssisted).unwrap();

    assert_eq!(plan.pacing, Pacing::ProgrammedTimer);
}

/// WHAT: Each mode reads only its own parameter
/// WHY: One config can carry parameters for several modes at once
#[test]
#[allow(clippy::unwrap_used)]
fn given_config_with_all_parameters_when_planning_each_mode_then_matching_termination() {
    // Given: A config with every parameter set
    let config = SamplingConfig {
        target_count: Some(7),
        idle_timeout_ms: Some(500),
        continuous_idle_timeout_ms: Some(2_000),
        ..SamplingConfig::default()
    };

    // When/Then: Each mode picks its own parameter
    assert_eq!(
        config.plan(SamplingMode::FixedCount).unwrap().termination,
        Termination::Count(7)
    );
    assert_eq!(
        config
            .plan(SamplingMode::IdleAfterFirstMove)
            .unwrap()
            .termination,
        Termination::IdleAfterFirstMove { timeout_ms: 500 }
    );
    assert_eq!(
        config.plan(SamplingMode::ContinuousIdle).unwrap().termination,
        Termination::ContinuousIdle { timeout_ms: 2_000 }
    );
}

/// WHAT: Missing mode parameters name the mode and the field
/// WHY: The error must tell the user what to add
#[test]
#[allow(clippy::panic)]
fn given_missing_timeout_when_planning_continuous_then_error_names_field() {
    // Given: A fixed-count config
    let config = SamplingConfig::fixed_count(10, 1);

    // When: Planning a continuous-idle session
    let result = config.plan(SamplingMode::ContinuousIdle);

    // Then: The reason names both the mode and the field
    match result {
        Err(TrackerError::Configuration { reason, .. }) => {
            assert!(reason.contains("continuous-idle"));
            assert!(reason.contains("continuous_idle_timeout_ms"));
        }
        other => panic!("Expected configuration error, got {:?}", other),
    }
}
