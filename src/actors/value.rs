use crate::core::{Message, Noop, Result, Stateless, TypedAny};
use crate::workflows::{Broadcast, Forward, Pipe, SideEffect};

/// How the reply value of an action is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyMode {
    /// The response, or the Noop marker when none was set.
    Reply,
    /// Always the Noop marker, even if a response was set.
    NoReply,
    /// Same encoding as `Reply`; the result carries no explicit intent.
    #[default]
    Empty,
}

/// Type-erased outcome of one action, ready to be encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResult {
    pub response_state: Option<TypedAny>,
    pub response_payload: Option<TypedAny>,
    pub checkpoint: bool,
    pub broadcast: Option<Broadcast>,
    pub forward: Option<Forward>,
    pub pipe: Option<Pipe>,
    pub side_effects: Vec<SideEffect>,
    pub reply_mode: ReplyMode,
}

impl ActionResult {
    /// Value placed in the reply envelope.
    pub fn reply_value(&self) -> TypedAny {
        match (self.reply_mode, &self.response_payload) {
            (ReplyMode::NoReply, _) | (_, None) => TypedAny::noop(),
            (_, Some(payload)) => payload.clone(),
        }
    }
}

/// Typed result builder returned by action handlers.
///
/// ```ignore
/// Ok(Value::at().state(state).response(reply).reply())
/// ```
#[derive(Debug, Clone)]
pub struct Value<S = Stateless, R = Noop> {
    state: Option<S>,
    response: Option<R>,
    checkpoint: bool,
    broadcast: Option<Broadcast>,
    forward: Option<Forward>,
    pipe: Option<Pipe>,
    effects: Vec<SideEffect>,
    reply_mode: ReplyMode,
}

impl<S: Message, R: Message> Default for Value<S, R> {
    fn default() -> Self {
        Self::at()
    }
}

impl<S: Message, R: Message> Value<S, R> {
    pub fn at() -> Self {
        Self {
            state: None,
            response: None,
            checkpoint: false,
            broadcast: None,
            forward: None,
            pipe: None,
            effects: Vec::new(),
            reply_mode: ReplyMode::Empty,
        }
    }

    pub fn response(mut self, response: R) -> Self {
        self.response = Some(response);
        self
    }

    pub fn state(mut self, state: S) -> Self {
        self.state = Some(state);
        self
    }

    /// Asks the fabric to persist the new state right away.
    pub fn checkpoint(mut self, checkpoint: bool) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    pub fn broadcast(mut self, broadcast: Broadcast) -> Self {
        self.broadcast = Some(broadcast);
        self
    }

    pub fn forward(mut self, forward: Forward) -> Self {
        self.forward = Some(forward);
        self
    }

    pub fn pipe(mut self, pipe: Pipe) -> Self {
        self.pipe = Some(pipe);
        self
    }

    pub fn effect(mut self, effect: SideEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn effects(mut self, effects: impl IntoIterator<Item = SideEffect>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn reply(mut self) -> Self {
        self.reply_mode = ReplyMode::Reply;
        self
    }

    pub fn no_reply(mut self) -> Self {
        self.reply_mode = ReplyMode::NoReply;
        self
    }

    pub fn empty(mut self) -> Self {
        self.reply_mode = ReplyMode::Empty;
        self
    }

    /// Packs state and response into their wire form.
    pub fn into_result(self) -> Result<ActionResult> {
        let response_state = match self.state {
            Some(_) if S::TYPE_NAME == Stateless::TYPE_NAME => None,
            Some(state) => Some(TypedAny::pack(&state)?),
            None => None,
        };
        let response_payload = self.response.as_ref().map(TypedAny::pack).transpose()?;

        Ok(ActionResult {
            response_state,
            response_payload,
            checkpoint: self.checkpoint,
            broadcast: self.broadcast,
            forward: self.forward,
            pipe: self.pipe,
            side_effects: self.effects,
            reply_mode: self.reply_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Empty;

    #[test]
    fn no_reply_hides_the_response() {
        let result = Value::<Stateless, Empty>::at()
            .response(Empty)
            .no_reply()
            .into_result()
            .unwrap();
        assert!(result.response_payload.is_some());
        assert!(result.reply_value().is::<Noop>());
    }

    #[test]
    fn missing_response_replies_with_noop() {
        let result = Value::<Stateless, Empty>::at().reply().into_result().unwrap();
        assert!(result.reply_value().is::<Noop>());
        assert!(!result.checkpoint);
    }

    #[test]
    fn stateless_state_is_never_packed() {
        let result = Value::<Stateless, Noop>::at()
            .state(Stateless)
            .into_result()
            .unwrap();
        assert!(result.response_state.is_none());
    }

    #[test]
    fn effects_accumulate_in_order() {
        let first = SideEffect::to("sys", "A", "One", &Noop).unwrap();
        let second = SideEffect::to("sys", "B", "Two", &Noop).unwrap();
        let result = Value::<Stateless, Noop>::at()
            .effect(first.clone())
            .effects([second.clone()])
            .into_result()
            .unwrap();
        assert_eq!(result.side_effects, vec![first, second]);
    }
}
