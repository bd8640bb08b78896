//! Confirmation and selection prompts.
//!
//! Both helpers register ephemeral actions in the conversation's session and
//! send the matching action set. Ids come from the dispatcher's
//! [`ActionIds`](crate::ActionIds), so prompts created back to back never
//! collide.

use crate::builder::ActionBuilder;
use crate::context::MessageContext;
use crate::error::FrameworkResult;
use crate::handler::{ActionHandler, reply_with};
use tapkit_core::ActionStyle;

/// Ids allocated for one confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub set_id: String,
    pub yes_id: String,
    pub no_id: String,
}

/// Asks a yes/no question.
///
/// Without `on_no`, choosing "No" replies `❌ Cancelled`.
pub async fn send_confirmation(
    ctx: &MessageContext,
    message: &str,
    on_yes: ActionHandler,
    on_no: Option<ActionHandler>,
) -> FrameworkResult<Confirmation> {
    let n = ctx.ids().next();
    let confirmation = Confirmation {
        set_id: format!("confirm-{n}"),
        yes_id: format!("yes-{n}"),
        no_id: format!("no-{n}"),
    };

    ctx.register_action(confirmation.yes_id.clone(), on_yes);
    ctx.register_action(
        confirmation.no_id.clone(),
        on_no.unwrap_or_else(|| reply_with("❌ Cancelled")),
    );

    ActionBuilder::create(confirmation.set_id.clone(), message)
        .add(confirmation.yes_id.clone(), "✅ Yes")
        .add_styled(confirmation.no_id.clone(), "❌ No", ActionStyle::Danger)
        .send(ctx)
        .await?;

    Ok(confirmation)
}

/// One choice of a selection prompt.
#[derive(Clone)]
pub struct SelectionOption {
    pub id: String,
    pub label: String,
    pub style: Option<ActionStyle>,
    pub handler: ActionHandler,
}

impl SelectionOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>, handler: ActionHandler) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style: None,
            handler,
        }
    }

    pub fn with_style(mut self, style: ActionStyle) -> Self {
        self.style = Some(style);
        self
    }
}

impl std::fmt::Debug for SelectionOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionOption")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

/// Offers a list of choices, each with its own handler.
///
/// Option ids are used as given. Returns the id of the sent set.
pub async fn send_selection(
    ctx: &MessageContext,
    message: &str,
    options: Vec<SelectionOption>,
) -> FrameworkResult<String> {
    let set_id = ctx.ids().with_prefix("selection");
    let mut builder = ActionBuilder::create(set_id.clone(), message);

    for option in options {
        ctx.register_action(option.id.clone(), option.handler);
        builder = match option.style {
            Some(style) => builder.add_styled(option.id, option.label, style),
            None => builder.add(option.id, option.label),
        };
    }

    builder.send(ctx).await?;
    Ok(set_id)
}
