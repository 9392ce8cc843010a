use crate::{
    Action, ActuatorPort, CoreError, CoreResult, DeviceCommand, Recipe, RecipeExecutor,
    RecipeRunState, status_line,
};

use std::{panic::Location, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    StartSession,
    StopSession,
    Command(DeviceCommand),
}

/// Records every call and optionally fails one command.
#[derive(Default)]
struct MockPort {
    calls: Vec<(Call, Instant)>,
    session_active: bool,
    fail_command: Option<DeviceCommand>,
}

impl MockPort {
    fn calls(&self) -> Vec<Call> {
        self.calls.iter().map(|(call, _)| call.clone()).collect()
    }
}

#[async_trait]
impl ActuatorPort for MockPort {
    fn session_active(&self) -> bool {
        self.session_active
    }

    async fn start_session(&mut self) -> CoreResult<()> {
        self.calls.push((Call::StartSession, Instant::now()));
        self.session_active = true;
        Ok(())
    }

    async fn stop_session(&mut self) -> CoreResult<()> {
        self.calls.push((Call::StopSession, Instant::now()));
        self.session_active = false;
        Ok(())
    }

    async fn send_command(&mut self, command: DeviceCommand) -> CoreResult<()> {
        if self.fail_command == Some(command) {
            return Err(CoreError::CommandError {
                command: command.as_char(),
                reason: "port closed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.calls.push((Call::Command(command), Instant::now()));
        Ok(())
    }
}

fn standard_recipe() -> Recipe {
    Recipe::from_actions(vec![
        Action::ConnectDevice,
        Action::StartFlicker,
        Action::Delay { seconds: 5.0 },
        Action::EndFlicker,
        Action::DisconnectDevice,
    ])
}

/// WHAT: A fully succeeding recipe runs every step in order
/// WHY: Five actions, five settle pauses, back to Idle
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_succeeding_port_when_running_recipe_then_all_steps_in_order() {
    // Given: An idle executor and a port that accepts everything
    let executor = RecipeExecutor::default();
    let mut port = MockPort::default();
    let started = Instant::now();

    // When: Running connect, start, delay 5s, end, disconnect
    let report = executor.run(&standard_recipe(), &mut port).await.unwrap();

    // Then: Calls in order, delay respected, state Idle
    assert_eq!(report.actions_completed, 5);
    assert_eq!(
        port.calls(),
        vec![
            Call::Command(DeviceCommand::Connect),
            Call::StartSession,
            Call::StopSession,
            Call::Command(DeviceCommand::Disconnect),
        ]
    );

    let start_at = port.calls[1].1;
    let stop_at = port.calls[2].1;
    assert!(stop_at - start_at >= Duration::from_secs(5));
    assert!(started.elapsed() >= Duration::from_secs(5) + Duration::from_millis(500));
    assert_eq!(executor.state(), RecipeRunState::Idle);
}

/// WHAT: A failing connect aborts before the session starts
/// WHY: The first failure halts every later step
#[tokio::test(start_paused = true)]
#[allow(clippy::panic)]
async fn given_failing_connect_when_running_recipe_then_aborts_before_start() {
    // Given: A port whose connect command fails
    let executor = RecipeExecutor::default();
    let mut port = MockPort {
        fail_command: Some(DeviceCommand::Connect),
        ..MockPort::default()
    };

    // When: Running the standard recipe
    let result = executor.run(&standard_recipe(), &mut port).await;

    // Then: Aborted at step 0 with the command failure, nothing else ran
    match &result {
        Err(CoreError::RecipeAborted {
            step,
            action,
            source,
            ..
        }) => {
            assert_eq!(*step, 0);
            assert_eq!(*action, Action::ConnectDevice);
            assert!(matches!(**source, CoreError::CommandError { command: 'c', .. }));
        }
        other => panic!("expected RecipeAborted, got {other:?}"),
    }
    assert!(port.calls().is_empty());
    assert!(!port.session_active);
    assert_eq!(executor.state(), RecipeRunState::Idle);
    assert!(status_line(&result).contains("port closed"));
}

/// WHAT: Steps before a failure keep their effect
/// WHY: There is no rollback on abort
#[tokio::test(start_paused = true)]
async fn given_failing_disconnect_when_running_recipe_then_earlier_steps_kept() {
    // Given: A port whose disconnect command fails
    let executor = RecipeExecutor::default();
    let mut port = MockPort {
        fail_command: Some(DeviceCommand::Disconnect),
        ..MockPort::default()
    };
    let recipe = Recipe::from_actions(vec![
        Action::StartFlicker,
        Action::DisconnectDevice,
        Action::Wake,
    ]);

    // When: Running it
    let result = executor.run(&recipe, &mut port).await;

    // Then: The session stayed started and Wake never ran
    assert!(matches!(result, Err(CoreError::RecipeAborted { step: 1, .. })));
    assert_eq!(port.calls(), vec![Call::StartSession]);
    assert!(port.session_active);
}

/// WHAT: Start/End flicker are no-ops when already in that state
/// WHY: Re-starting a running session must not reset its counts
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_active_session_when_start_flicker_then_skipped() {
    // Given: A port with a session already running
    let executor = RecipeExecutor::default();
    let mut port = MockPort {
        session_active: true,
        ..MockPort::default()
    };
    let recipe = Recipe::from_actions(vec![
        Action::StartFlicker,
        Action::EndFlicker,
        Action::EndFlicker,
    ]);

    // When: Running start, end, end
    executor.run(&recipe, &mut port).await.unwrap();

    // Then: Only a single stop was issued
    assert_eq!(port.calls(), vec![Call::StopSession]);
}

/// WHAT: Device actions map to their command bytes
/// WHY: c, d, s, w are the firmware's whole command set
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_device_actions_when_running_then_matching_commands_sent() {
    // Given: A recipe with every device action
    let executor = RecipeExecutor::default();
    let mut port = MockPort::default();
    let recipe = Recipe::from_actions(vec![
        Action::ConnectDevice,
        Action::Sleep,
        Action::Wake,
        Action::DisconnectDevice,
    ]);

    // When: Running it
    executor.run(&recipe, &mut port).await.unwrap();

    // Then: Bytes c, s, w, d in order
    let bytes: Vec<u8> = port
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Command(command) => Some(command.as_byte()),
            _ => None,
        })
        .collect();
    assert_eq!(bytes, b"cswd".to_vec());
}

/// WHAT: Only one recipe can run at a time
/// WHY: Concurrent recipes would interleave device commands
#[tokio::test(start_paused = true)]
async fn given_running_recipe_when_second_run_requested_then_rejected() {
    // Given: One executor and two ports
    let executor = RecipeExecutor::default();
    let mut first_port = MockPort::default();
    let mut second_port = MockPort::default();
    let recipe = standard_recipe();

    // When: Both runs are polled together
    let (first, second) = tokio::join!(
        executor.run(&recipe, &mut first_port),
        executor.run(&recipe, &mut second_port)
    );

    // Then: The first completes, the second is rejected untouched
    assert!(first.is_ok());
    assert!(matches!(second, Err(CoreError::RecipeAlreadyRunning { .. })));
    assert!(second_port.calls().is_empty());
    assert!(!executor.is_running());
}

/// WHAT: Observers see Running with the current step, then Idle
/// WHY: The UI shows recipe progress
#[tokio::test(start_paused = true)]
async fn given_subscriber_when_recipe_runs_then_progress_observed() {
    // Given: A subscriber on the executor state
    let executor = RecipeExecutor::default();
    let mut state_rx = executor.subscribe();
    let mut port = MockPort::default();
    let recipe = Recipe::from_actions(vec![Action::Delay { seconds: 1.0 }, Action::Wake]);

    // When: Running while sampling the state mid-delay
    let run = executor.run(&recipe, &mut port);
    let observe = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        *state_rx.borrow_and_update()
    };
    let (result, mid_run) = tokio::join!(run, observe);

    // Then: Mid-run state was Running at step 0 of 2, final state Idle
    assert!(result.is_ok());
    assert!(matches!(
        mid_run,
        RecipeRunState::Running {
            current_index: 0,
            total: 2,
            ..
        }
    ));
    assert_eq!(executor.state(), RecipeRunState::Idle);
}

/// WHAT: Dropping a run mid-way returns the executor to Idle
/// WHY: A cancelled run must not block later recipes
#[tokio::test(start_paused = true)]
async fn given_cancelled_run_when_dropped_then_executor_idle() {
    // Given: A recipe with a long delay
    let executor = RecipeExecutor::default();
    let mut port = MockPort::default();
    let recipe = Recipe::from_actions(vec![Action::Delay { seconds: 60.0 }]);

    // When: The run is abandoned after one second
    let outcome =
        tokio::time::timeout(Duration::from_secs(1), executor.run(&recipe, &mut port)).await;

    // Then: Timed out, and the executor is Idle again
    assert!(outcome.is_err());
    assert_eq!(executor.state(), RecipeRunState::Idle);
}

/// WHAT: Invalid delays are rejected before anything runs
/// WHY: A negative sleep cannot be executed
#[tokio::test(start_paused = true)]
async fn given_negative_delay_when_running_then_invalid_action_and_nothing_sent() {
    // Given: A recipe with a negative delay after a command
    let executor = RecipeExecutor::default();
    let mut port = MockPort::default();
    let recipe = Recipe::from_actions(vec![Action::Wake, Action::Delay { seconds: -1.0 }]);

    // When: Running it
    let result = executor.run(&recipe, &mut port).await;

    // Then: Rejected up front
    assert!(matches!(result, Err(CoreError::InvalidAction { .. })));
    assert!(port.calls().is_empty());
    assert!(status_line(&result).starts_with("Recipe not started"));
}
