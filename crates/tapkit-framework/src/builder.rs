//! Fluent construction of action sets.

use crate::context::MessageContext;
use crate::error::FrameworkResult;
use tapkit_core::{Action, ActionSet, ActionStyle, SentMessage};

/// Builds an [`ActionSet`] one action at a time.
///
/// ```rust,ignore
/// ActionBuilder::create("main-menu", "What would you like to do?")
///     .add("balance", "💰 Balance")
///     .add_styled("reset", "Reset", ActionStyle::Danger)
///     .send(&ctx)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    id: String,
    description: String,
    actions: Vec<Action>,
}

impl ActionBuilder {
    pub fn create(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            actions: Vec::new(),
        }
    }

    /// Appends an action with the default style.
    pub fn add(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.actions.push(Action::new(id, label));
        self
    }

    /// Appends an action with an explicit style.
    pub fn add_styled(
        mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        style: ActionStyle,
    ) -> Self {
        self.actions.push(Action::new(id, label).with_style(style));
        self
    }

    /// Appends a pre-built action.
    pub fn push(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn build(self) -> ActionSet {
        ActionSet {
            id: self.id,
            description: self.description,
            actions: self.actions,
        }
    }

    /// Sends the set and remembers it as the conversation's last sent actions.
    pub async fn send(self, ctx: &MessageContext) -> FrameworkResult<SentMessage> {
        send_actions(ctx, self.build()).await
    }
}

/// Sends `actions` and remembers the sent message in the session.
pub async fn send_actions(ctx: &MessageContext, actions: ActionSet) -> FrameworkResult<SentMessage> {
    let sent = ctx.conversation().send_actions(actions).await?;
    ctx.session().set_last_sent_actions(sent.clone());
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_keeps_order_and_styles() {
        let set = ActionBuilder::create("menu", "Pick one")
            .add("a", "A")
            .add_styled("b", "B", ActionStyle::Danger)
            .build();

        assert_eq!(set.id, "menu");
        assert_eq!(set.description, "Pick one");
        assert_eq!(set.action_ids().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(set.actions[0].style, None);
        assert_eq!(set.actions[1].style, Some(ActionStyle::Danger));
    }
}
