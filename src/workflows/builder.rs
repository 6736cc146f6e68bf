use super::directives::SideEffect;
use crate::actors::ActionResult;
use crate::protocol::{
    ActorId, BroadcastDirective, BroadcastPayload, ForwardDirective, InvocationRequest,
    PipeDirective, SideEffectDirective, Workflow,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// Absolute delivery time in epoch milliseconds. An explicit schedule wins
/// over a relative delay.
pub fn effective_schedule(
    delay: Option<Duration>,
    scheduled_to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    match (scheduled_to, delay) {
        (Some(at), _) => Some(at.timestamp_millis()),
        (None, Some(delay)) => {
            let delay_ms = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
            Some(now.timestamp_millis().saturating_add(delay_ms))
        }
        (None, None) => None,
    }
}

/// Translates the directives of an [`ActionResult`] into a wire [`Workflow`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowBuilder;

impl WorkflowBuilder {
    pub fn build(result: &ActionResult) -> Workflow {
        Self::build_at(result, Utc::now())
    }

    pub fn build_at(result: &ActionResult, now: DateTime<Utc>) -> Workflow {
        let broadcast = result.broadcast.as_ref().map(|b| BroadcastDirective {
            channel_group: b.channel.clone(),
            action_name: b.action.clone(),
            payload: match &b.payload {
                Some(value) => BroadcastPayload::Value(value.clone()),
                None => BroadcastPayload::Noop,
            },
        });
        let forward = result.forward.as_ref().map(|f| ForwardDirective {
            actor: f.actor.clone(),
            action_name: f.action.clone(),
        });
        let pipe = result.pipe.as_ref().map(|p| PipeDirective {
            actor: p.actor.clone(),
            action_name: p.action.clone(),
        });
        let effects = result
            .side_effects
            .iter()
            .map(|effect| side_effect_directive(effect, now))
            .collect();

        Workflow {
            broadcast,
            forward,
            pipe,
            effects,
        }
    }
}

fn side_effect_directive(effect: &SideEffect, now: DateTime<Utc>) -> SideEffectDirective {
    SideEffectDirective {
        request: InvocationRequest {
            system: effect.system.clone(),
            actor: ActorId::new(effect.system.clone(), effect.actor.clone()),
            action_name: effect.action.clone(),
            value: effect.payload.clone(),
            async_mode: true,
            metadata: HashMap::new(),
            scheduled_to: effective_schedule(effect.delay, effect.scheduled_to, now),
            caller: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::{Broadcast, Forward, Pipe};
    use crate::core::Noop;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_result_builds_empty_workflow() {
        let workflow = WorkflowBuilder::build_at(&ActionResult::default(), now());
        assert_eq!(workflow, Workflow::default());
        assert!(workflow.effects.is_empty());
    }

    #[test]
    fn schedule_beats_delay() {
        let at = now() + chrono::Duration::minutes(10);
        let millis = effective_schedule(Some(Duration::from_secs(5)), Some(at), now());
        assert_eq!(millis, Some(at.timestamp_millis()));
    }

    #[test]
    fn delay_is_relative_to_now() {
        let millis = effective_schedule(Some(Duration::from_secs(5)), None, now());
        assert_eq!(millis, Some(now().timestamp_millis() + 5_000));
        assert_eq!(effective_schedule(None, None, now()), None);
    }

    #[test]
    fn side_effects_are_forced_async() {
        let result = ActionResult {
            side_effects: vec![
                SideEffect::to("sys", "Audit", "Record", &Noop)
                    .unwrap()
                    .delay(Duration::from_secs(5)),
            ],
            ..ActionResult::default()
        };
        let workflow = WorkflowBuilder::build_at(&result, now());
        let request = &workflow.effects[0].request;
        assert!(request.async_mode);
        assert_eq!(request.actor, ActorId::new("sys", "Audit"));
        assert_eq!(request.scheduled_to, Some(now().timestamp_millis() + 5_000));
    }

    #[test]
    fn present_directives_are_translated() {
        let result = ActionResult {
            broadcast: Some(Broadcast::to_no_args("news", "Publish")),
            forward: Some(Forward::to("Next", "Handle")),
            pipe: Some(Pipe::to("Sink", "Consume")),
            ..ActionResult::default()
        };
        let workflow = WorkflowBuilder::build_at(&result, now());
        let broadcast = workflow.broadcast.unwrap();
        assert_eq!(broadcast.channel_group, "news");
        assert_eq!(broadcast.payload, BroadcastPayload::Noop);
        assert_eq!(workflow.forward.unwrap().actor, "Next");
        assert_eq!(workflow.pipe.unwrap().action_name, "Consume");
    }
}
