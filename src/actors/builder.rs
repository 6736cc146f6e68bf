use super::context::{ActorContext, InvocationContext};
use super::descriptor::{
    ActionHandler, ActionSpec, ActorDescriptor, DispatchKind, HandlerInstance, InstanceFactory,
    NoArgsAction, PayloadAction, StateType,
};
use super::value::{ActionResult, Value};
use super::{DEFAULT_DEACTIVATION_TIMEOUT_MS, DEFAULT_SNAPSHOT_TIMEOUT_MS, INIT_ACTION};
use crate::core::{Message, Result, SpawnError, Stateless, TypedAny};
use crate::protocol::ActorKind;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Typed registration API for one actor type.
///
/// `A` is the handler object built once per actor key, `S` the persisted
/// state type (`Stateless` for actors without state).
///
/// ```ignore
/// let greeter = ActorBuilder::<Greeter, GreeterState>::stateful("Greeter", || Ok(Greeter))
///     .action("SetTag", |_actor, ctx, tag: Tag| {
///         let mut state = ctx.state().cloned().unwrap_or_default();
///         state.tags.push(tag.value);
///         Ok(Value::<GreeterState, Ack>::at().state(state).response(Ack).reply())
///     })
///     .build()?;
/// ```
pub struct ActorBuilder<A, S = Stateless> {
    name: String,
    kind: ActorKind,
    stateful: bool,
    channel: Option<String>,
    deactivation_timeout_ms: u64,
    snapshot_timeout_ms: u64,
    min_pool_size: u32,
    max_pool_size: u32,
    factory: InstanceFactory,
    actions: HashMap<String, ActionSpec>,
    timer_actions: HashMap<String, ActionSpec>,
    duplicate: Option<String>,
    _marker: PhantomData<fn() -> (A, S)>,
}

impl<A: Send + 'static> ActorBuilder<A, Stateless> {
    pub fn stateless<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<A> + Send + Sync + 'static,
    {
        Self::with_factory(name.into(), false, factory)
    }
}

impl<A: Send + 'static, S: Message> ActorBuilder<A, S> {
    pub fn stateful<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<A> + Send + Sync + 'static,
    {
        Self::with_factory(name.into(), true, factory)
    }

    fn with_factory<F>(name: String, stateful: bool, factory: F) -> Self
    where
        F: Fn() -> Result<A> + Send + Sync + 'static,
    {
        let factory: InstanceFactory =
            Arc::new(move || -> Result<HandlerInstance> { Ok(Box::new(factory()?)) });
        Self {
            name,
            kind: ActorKind::Named,
            stateful,
            channel: None,
            deactivation_timeout_ms: DEFAULT_DEACTIVATION_TIMEOUT_MS,
            snapshot_timeout_ms: DEFAULT_SNAPSHOT_TIMEOUT_MS,
            min_pool_size: 1,
            max_pool_size: 0,
            factory,
            actions: HashMap::new(),
            timer_actions: HashMap::new(),
            duplicate: None,
            _marker: PhantomData,
        }
    }

    pub fn kind(mut self, kind: ActorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Subscribes the actor to a broadcast channel group.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn deactivation_timeout(mut self, timeout: Duration) -> Self {
        self.deactivation_timeout_ms = duration_millis(timeout);
        self
    }

    pub fn snapshot_timeout(mut self, timeout: Duration) -> Self {
        self.snapshot_timeout_ms = duration_millis(timeout);
        self
    }

    /// Pool bounds, only meaningful for `ActorKind::Pooled`. A max of 0
    /// leaves the upper bound to the fabric.
    pub fn pool_size(mut self, min: u32, max: u32) -> Self {
        self.min_pool_size = min;
        self.max_pool_size = max;
        self
    }

    pub fn action<I, O, F>(self, name: impl Into<String>, handler: F) -> Self
    where
        I: Message,
        O: Message,
        F: Fn(&mut A, &ActorContext<S>, I) -> Result<Value<S, O>> + Send + Sync + 'static,
    {
        let name = name.into();
        let spec = payload_spec(name.clone(), DispatchKind::Normal, handler);
        self.insert_action(name, spec)
    }

    pub fn action_no_args<O, F>(self, name: impl Into<String>, handler: F) -> Self
    where
        O: Message,
        F: Fn(&mut A, &ActorContext<S>) -> Result<Value<S, O>> + Send + Sync + 'static,
    {
        let name = name.into();
        let spec = no_args_spec(name.clone(), DispatchKind::Normal, handler);
        self.insert_action(name, spec)
    }

    /// Action the fabric calls on its own every `period`.
    pub fn timer_action<I, O, F>(self, name: impl Into<String>, period: Duration, handler: F) -> Self
    where
        I: Message,
        O: Message,
        F: Fn(&mut A, &ActorContext<S>, I) -> Result<Value<S, O>> + Send + Sync + 'static,
    {
        let name = name.into();
        let spec = payload_spec(name.clone(), timer(period), handler);
        self.insert_timer_action(name, spec)
    }

    pub fn timer_action_no_args<O, F>(
        self,
        name: impl Into<String>,
        period: Duration,
        handler: F,
    ) -> Self
    where
        O: Message,
        F: Fn(&mut A, &ActorContext<S>) -> Result<Value<S, O>> + Send + Sync + 'static,
    {
        let name = name.into();
        let spec = no_args_spec(name.clone(), timer(period), handler);
        self.insert_timer_action(name, spec)
    }

    /// Registers the context-only `Init` action the fabric runs on activation.
    pub fn init<O, F>(self, handler: F) -> Self
    where
        O: Message,
        F: Fn(&mut A, &ActorContext<S>) -> Result<Value<S, O>> + Send + Sync + 'static,
    {
        self.action_no_args(INIT_ACTION, handler)
    }

    pub fn build(self) -> Result<ActorDescriptor> {
        if let Some(action) = self.duplicate {
            return Err(SpawnError::Config(format!(
                "actor '{}': action '{}' is registered twice",
                self.name, action
            )));
        }
        let state_type = (self.stateful && S::TYPE_NAME != Stateless::TYPE_NAME)
            .then(StateType::of::<S>);

        let descriptor = ActorDescriptor {
            name: self.name,
            kind: self.kind,
            stateful: self.stateful,
            state_type,
            actions: self.actions,
            timer_actions: self.timer_actions,
            channel: self.channel,
            deactivation_timeout_ms: self.deactivation_timeout_ms,
            snapshot_timeout_ms: self.snapshot_timeout_ms,
            min_pool_size: self.min_pool_size,
            max_pool_size: self.max_pool_size,
            factory: self.factory,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn insert_action(mut self, name: String, spec: ActionSpec) -> Self {
        if self.timer_actions.contains_key(&name) || self.actions.insert(name.clone(), spec).is_some() {
            self.duplicate.get_or_insert(name);
        }
        self
    }

    fn insert_timer_action(mut self, name: String, spec: ActionSpec) -> Self {
        if self.actions.contains_key(&name)
            || self.timer_actions.insert(name.clone(), spec).is_some()
        {
            self.duplicate.get_or_insert(name);
        }
        self
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn timer(period: Duration) -> DispatchKind {
    DispatchKind::Timer {
        period_seconds: u32::try_from(period.as_secs()).unwrap_or(u32::MAX),
    }
}

fn instance_of<A: 'static>(instance: &mut HandlerInstance) -> Result<&mut A> {
    instance.downcast_mut::<A>().ok_or_else(|| {
        SpawnError::Invocation(format!(
            "cached instance is not a '{}'",
            std::any::type_name::<A>()
        ))
    })
}

fn payload_spec<A, S, I, O, F>(name: String, dispatch: DispatchKind, handler: F) -> ActionSpec
where
    A: Send + 'static,
    S: Message,
    I: Message,
    O: Message,
    F: Fn(&mut A, &ActorContext<S>, I) -> Result<Value<S, O>> + Send + Sync + 'static,
{
    let erased: PayloadAction = Arc::new(
        move |instance: &mut HandlerInstance,
              ctx: InvocationContext,
              payload: &TypedAny|
              -> Result<ActionResult> {
            let input = payload.unpack::<I>()?;
            let ctx = ActorContext::<S>::from_invocation(ctx)?;
            handler(instance_of::<A>(instance)?, &ctx, input)?.into_result()
        },
    );
    ActionSpec::new(
        name,
        Some(I::TYPE_NAME),
        O::TYPE_NAME,
        dispatch,
        ActionHandler::WithPayload(erased),
    )
}

fn no_args_spec<A, S, O, F>(name: String, dispatch: DispatchKind, handler: F) -> ActionSpec
where
    A: Send + 'static,
    S: Message,
    O: Message,
    F: Fn(&mut A, &ActorContext<S>) -> Result<Value<S, O>> + Send + Sync + 'static,
{
    let erased: NoArgsAction = Arc::new(
        move |instance: &mut HandlerInstance, ctx: InvocationContext| -> Result<ActionResult> {
            let ctx = ActorContext::<S>::from_invocation(ctx)?;
            handler(instance_of::<A>(instance)?, &ctx)?.into_result()
        },
    );
    ActionSpec::new(
        name,
        None,
        O::TYPE_NAME,
        dispatch,
        ActionHandler::NoArgs(erased),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Empty, Noop};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        hits: u32,
    }

    impl Message for Counter {
        const TYPE_NAME: &'static str = "test.Counter";
    }

    struct Clicker;

    fn clicker() -> ActorBuilder<Clicker, Counter> {
        ActorBuilder::<Clicker, Counter>::stateful("Clicker", || Ok(Clicker))
    }

    #[test]
    fn arity_follows_registration_method() {
        let descriptor = clicker()
            .action("Click", |_, _, _: Empty| Ok(Value::<Counter, Noop>::at()))
            .action_no_args("Peek", |_, _| Ok(Value::<Counter, Noop>::at()))
            .build()
            .unwrap();
        assert_eq!(descriptor.action("Click").unwrap().arity(), 1);
        assert_eq!(descriptor.action("Click").unwrap().input_type(), Some("spawn.Empty"));
        assert_eq!(descriptor.action("Peek").unwrap().arity(), 0);
        assert_eq!(descriptor.state_type().unwrap().name(), "test.Counter");
    }

    #[test]
    fn duplicate_action_names_are_rejected() {
        let err = clicker()
            .action_no_args("Tick", |_, _| Ok(Value::<Counter, Noop>::at()))
            .timer_action_no_args("Tick", Duration::from_secs(5), |_, _| {
                Ok(Value::<Counter, Noop>::at())
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, SpawnError::Config(_)));
    }

    #[test]
    fn stateful_actor_needs_a_state_type() {
        let err = ActorBuilder::<Clicker, Stateless>::stateful("Broken", || Ok(Clicker))
            .build()
            .unwrap_err();
        assert!(matches!(err, SpawnError::Config(_)));
    }

    #[test]
    fn timer_period_is_recorded_in_seconds() {
        let descriptor = clicker()
            .timer_action_no_args("Tick", Duration::from_secs(30), |_, _| {
                Ok(Value::<Counter, Noop>::at())
            })
            .build()
            .unwrap();
        assert_eq!(
            descriptor.action("Tick").unwrap().dispatch_kind(),
            DispatchKind::Timer { period_seconds: 30 }
        );
        let definition = descriptor.to_definition("sys");
        assert_eq!(definition.timer_actions[0].seconds, 30);
        assert_eq!(definition.settings.snapshot_timeout_ms, Some(DEFAULT_SNAPSHOT_TIMEOUT_MS));
    }

    #[test]
    fn init_registers_context_only_action() {
        let descriptor = ActorBuilder::stateless("Echo", || Ok(Clicker))
            .init(|_, _| Ok(Value::<Stateless, Noop>::at()))
            .build()
            .unwrap();
        assert_eq!(descriptor.action(INIT_ACTION).unwrap().arity(), 0);
        assert!(descriptor.to_definition("sys").settings.snapshot_timeout_ms.is_none());
    }
}
