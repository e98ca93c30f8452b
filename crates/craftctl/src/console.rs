use craftctl_cloud::{CloudControlError, InstanceApi, InstanceView};
use tracing::debug;

use crate::format as fmt;

/// Outcome of one dispatched command line.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Reply(String),
    Exit(String),
}

/// Maps the five console commands onto the provider API, gating `start` and
/// `stop` on a fresh describe call. Generic over the provider so tests can
/// drive it with the mock.
pub struct Console<A: InstanceApi> {
    api: A,
    instance_id: String,
}

impl<A: InstanceApi> Console<A> {
    pub fn new(api: A, instance_id: impl Into<String>) -> Self {
        Self {
            api,
            instance_id: instance_id.into(),
        }
    }

    /// Fetches a fresh view and renders the status block.
    pub async fn status(&self) -> Result<String, CloudControlError> {
        let view = self.api.describe_instance(&self.instance_id).await?;
        Ok(render_status(&view))
    }

    /// Dispatches one command line. Command matching is case-insensitive.
    /// Errors never escape: they are rendered into the reply so the loop
    /// keeps running.
    pub async fn dispatch(&self, input: &str) -> CommandOutcome {
        let command = input.trim().to_lowercase();
        debug!(command = %command, "dispatching console command");

        let result = match command.as_str() {
            "help" => Ok(help_text()),
            "status" => self.status().await,
            "start" => self.start().await,
            "stop" => self.stop().await,
            "exit" => return CommandOutcome::Exit("Closing the console...".to_string()),
            _ => Ok(format!(
                "{}\n{}",
                fmt::warning(&format!("Unknown command: {}", command)),
                help_text()
            )),
        };

        match result {
            Ok(reply) => CommandOutcome::Reply(reply),
            Err(e) => CommandOutcome::Reply(format!(
                "{}\n{}",
                fmt::error(&e.to_string()),
                fmt::secondary(&format!("The {} command did not complete.", command))
            )),
        }
    }

    async fn start(&self) -> Result<String, CloudControlError> {
        // Gate on live provider state, never on what a previous command
        // reported.
        let view = self.api.describe_instance(&self.instance_id).await?;
        if !view.is_stopped() {
            return Ok(fmt::warning(&format!(
                "Instance is {}; it can only be started while Stopped.",
                view.status
            )));
        }

        self.api.start_instance(&self.instance_id).await?;
        Ok(format!(
            "{}\n{}",
            fmt::success("Start request accepted."),
            fmt::secondary(
                "The server takes about a minute to boot; run status to pick up its public IP."
            )
        ))
    }

    async fn stop(&self) -> Result<String, CloudControlError> {
        let view = self.api.describe_instance(&self.instance_id).await?;
        if !view.is_running() {
            return Ok(fmt::warning(&format!(
                "Instance is {}; it can only be stopped while Running.",
                view.status
            )));
        }

        self.api.stop_instance(&self.instance_id).await?;
        Ok(fmt::success(
            "Stop request accepted. Billing halts while the instance stays stopped.",
        ))
    }
}

fn render_status(view: &InstanceView) -> String {
    let ip = match view.public_ip.as_deref() {
        Some(ip) => fmt::entity(ip),
        None => fmt::secondary("-"),
    };
    format!(
        "{}\n  {}: {}\n  {}: {}",
        fmt::header("Instance state"),
        fmt::label("Status"),
        fmt::entity(&view.status.to_string()),
        fmt::label("Public IP"),
        ip,
    )
}

fn help_text() -> String {
    let mut help = format!("{}\n", fmt::header("Available Commands"));
    for (name, description) in [
        ("help", "Show this help message"),
        ("status", "Fetch the instance state and public IP"),
        ("start", "Boot the instance (only while it is Stopped)"),
        ("stop", "Shut the instance down (only while it is Running)"),
        ("exit", "Leave the console"),
    ] {
        help.push_str(&format!(
            "  {} - {}\n",
            fmt::entity(name),
            fmt::secondary(description)
        ));
    }
    help.pop();
    help
}

#[cfg(test)]
mod tests {
    use craftctl_cloud::{InstanceStatus, MockInstanceApi, RecordedCall};

    use super::*;

    fn console_with(status: InstanceStatus) -> (Console<MockInstanceApi>, MockInstanceApi) {
        let api = MockInstanceApi::new("i-123", status);
        (Console::new(api.clone(), "i-123"), api)
    }

    fn reply(outcome: CommandOutcome) -> String {
        match outcome {
            CommandOutcome::Reply(text) => text,
            CommandOutcome::Exit(text) => panic!("unexpected exit: {text}"),
        }
    }

    #[tokio::test]
    async fn start_is_refused_unless_stopped() {
        let (console, api) = console_with(InstanceStatus::Running);

        let text = reply(console.dispatch("start").await);
        assert!(text.contains("it can only be started while Stopped"));
        assert!(text.contains("Running"));

        // The refusal came from the gate; no start call reached the provider.
        assert_eq!(api.calls(), vec![RecordedCall::Describe]);
    }

    #[tokio::test]
    async fn stop_is_refused_unless_running() {
        let (console, api) = console_with(InstanceStatus::Starting);

        let text = reply(console.dispatch("stop").await);
        assert!(text.contains("it can only be stopped while Running"));
        assert!(text.contains("Starting"));
        assert_eq!(api.calls(), vec![RecordedCall::Describe]);
    }

    #[tokio::test]
    async fn start_from_stopped_issues_the_call() {
        let (console, api) = console_with(InstanceStatus::Stopped);

        let text = reply(console.dispatch("start").await);
        assert!(text.contains("Start request accepted."));
        assert_eq!(api.calls(), vec![RecordedCall::Describe, RecordedCall::Start]);
    }

    #[tokio::test]
    async fn stop_from_running_issues_the_call() {
        let (console, api) = console_with(InstanceStatus::Running);

        let text = reply(console.dispatch("stop").await);
        assert!(text.contains("Stop request accepted."));
        assert_eq!(api.calls(), vec![RecordedCall::Describe, RecordedCall::Stop]);
    }

    #[tokio::test]
    async fn the_gate_reads_live_state_not_the_last_outcome() {
        let (console, api) = console_with(InstanceStatus::Stopped);

        // The provider still reports Stopped after the first accepted start,
        // so a second start goes through as well.
        reply(console.dispatch("start").await);
        let text = reply(console.dispatch("start").await);
        assert!(text.contains("Start request accepted."));

        // Once the provider reports the transition, the gate refuses.
        api.set_status(InstanceStatus::Starting);
        let text = reply(console.dispatch("start").await);
        assert!(text.contains("Starting"));
        assert!(text.contains("it can only be started while Stopped"));
    }

    #[tokio::test]
    async fn provider_faults_become_replies_not_crashes() {
        let (console, api) = console_with(InstanceStatus::Stopped);
        api.fail_start_with("IncorrectInstanceStatus");

        let text = reply(console.dispatch("start").await);
        assert!(text.contains("IncorrectInstanceStatus"));
        assert!(text.contains("The start command did not complete."));
    }

    #[tokio::test]
    async fn commands_are_case_insensitive() {
        let (console, _) = console_with(InstanceStatus::Stopped);

        let text = reply(console.dispatch("STATUS").await);
        assert!(text.contains("Stopped"));

        let text = reply(console.dispatch("StArT").await);
        assert!(text.contains("Start request accepted."));
    }

    #[tokio::test]
    async fn status_shows_the_public_ip_while_running() {
        let api =
            MockInstanceApi::new("i-123", InstanceStatus::Running).with_public_ip("203.0.113.7");
        let console = Console::new(api, "i-123");

        let text = reply(console.dispatch("status").await);
        assert!(text.contains("Running"));
        assert!(text.contains("203.0.113.7"));
    }

    #[tokio::test]
    async fn unknown_commands_reprint_the_help() {
        let (console, api) = console_with(InstanceStatus::Stopped);

        let text = reply(console.dispatch("restart").await);
        assert!(text.contains("Unknown command: restart"));
        assert!(text.contains("Available Commands"));

        // Nothing remote happened.
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn exit_leaves_the_loop() {
        let (console, _) = console_with(InstanceStatus::Stopped);

        match console.dispatch("exit").await {
            CommandOutcome::Exit(text) => assert!(text.contains("Closing the console")),
            other => panic!("expected Exit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_instance_surfaces_the_raw_response() {
        let api = MockInstanceApi::new("i-elsewhere", InstanceStatus::Stopped);
        let console = Console::new(api, "i-123");

        let text = reply(console.dispatch("status").await);
        assert!(text.contains("No instance matched id i-123"));
        assert!(text.contains("\"TotalCount\":0"));
    }
}
