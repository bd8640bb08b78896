//! Declarative menus and navigation.
//!
//! An [`AppConfig`] describes a tree of menus. [`install_app`] turns it into
//! registered actions: menu actions with a handler run it, actions named after
//! another menu open that menu, and `main-menu` / `help` / `back-to-main`
//! always lead home.
//!
//! Menus without handlers can be loaded from TOML or JSON:
//!
//! ```toml
//! name = "Wallet bot"
//!
//! [options]
//! auto_show_menu_after_action = false
//!
//! [menus.main-menu]
//! id = "main-menu"
//! title = "What would you like to do?"
//! actions = [
//!   { id = "tools", label = "🔧 Tools" },
//!   { id = "help", label = "❓ Help" },
//! ]
//! ```

use std::sync::Arc;

use futures::FutureExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::builder::ActionBuilder;
use crate::context::MessageContext;
use crate::error::{FrameworkError, FrameworkResult};
use crate::handler::ActionHandler;
use crate::registry::ActionRegistry;
use tapkit_core::{Action, ActionSet, ActionStyle};

/// Id of the menu every navigation shortcut leads to.
pub const MAIN_MENU: &str = "main-menu";

/// Id of the action set sent by [`show_navigation_options`].
pub const NAVIGATION_OPTIONS: &str = "navigation-options";

const HOME_ACTIONS: [&str; 3] = [MAIN_MENU, "help", "back-to-main"];

/// One entry of a [`Menu`].
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct MenuAction {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ActionStyle>,
    #[serde(skip)]
    pub handler: Option<ActionHandler>,
    /// Re-show the last menu after the handler finishes.
    #[serde(default)]
    pub show_navigation_options: bool,
}

impl MenuAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn style(mut self, style: ActionStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn handler(mut self, handler: ActionHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn show_navigation_options(mut self, show: bool) -> Self {
        self.show_navigation_options = show;
        self
    }

    fn to_action(&self) -> Action {
        Action {
            id: self.id.clone(),
            label: self.label.clone(),
            style: self.style,
        }
    }
}

impl std::fmt::Debug for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuAction")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("style", &self.style)
            .field("has_handler", &self.handler.is_some())
            .field("show_navigation_options", &self.show_navigation_options)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Menu {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub actions: Vec<MenuAction>,
}

impl Menu {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            actions: Vec::new(),
        }
    }

    pub fn action(mut self, action: MenuAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn to_action_set(&self) -> ActionSet {
        ActionSet {
            id: self.id.clone(),
            description: self.title.clone(),
            actions: self.actions.iter().map(MenuAction::to_action).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppOptions {
    pub auto_show_menu_after_action: bool,
    pub default_navigation_message: Option<String>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            auto_show_menu_after_action: true,
            default_navigation_message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    /// Menus in declaration order. When two menus carry a handler for the
    /// same action id, the one declared last is installed.
    #[serde(default)]
    pub menus: IndexMap<String, Menu>,
    #[serde(default)]
    pub options: AppOptions,
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            menus: IndexMap::new(),
            options: AppOptions::default(),
        }
    }

    /// Adds a menu keyed by its id.
    pub fn menu(mut self, menu: Menu) -> Self {
        self.menus.insert(menu.id.clone(), menu);
        self
    }

    pub fn options(mut self, options: AppOptions) -> Self {
        self.options = options;
        self
    }

    pub fn get_menu(&self, id: &str) -> FrameworkResult<&Menu> {
        self.menus.get(id).ok_or_else(|| FrameworkError::menu_not_found(id))
    }

    /// Sets the handler of every action with the given id.
    ///
    /// Used after loading a config file, which cannot carry handlers. Returns
    /// the number of actions updated.
    pub fn attach_handler(&mut self, action_id: &str, handler: ActionHandler) -> usize {
        let mut attached = 0;
        for action in self
            .menus
            .values_mut()
            .flat_map(|m| m.actions.iter_mut())
            .filter(|a| a.id == action_id)
        {
            action.handler = Some(handler.clone());
            attached += 1;
        }
        attached
    }
}

// ============================================================================
// Showing menus
// ============================================================================

/// Sends `menu_id` and remembers it as the conversation's last menu.
///
/// An unknown id is reported into the conversation, not returned as an error.
pub async fn show_menu(
    ctx: &MessageContext,
    config: &Arc<AppConfig>,
    menu_id: &str,
) -> FrameworkResult<()> {
    let menu = match config.get_menu(menu_id) {
        Ok(menu) => menu,
        Err(e) => {
            error!(error = %e, "Cannot show menu");
            ctx.send_text(&format!("❌ Menu not found: {menu_id}")).await?;
            return Ok(());
        }
    };

    ctx.session().set_last_menu(Arc::clone(config), menu_id);
    crate::builder::send_actions(ctx, menu.to_action_set()).await?;
    Ok(())
}

/// Re-shows the conversation's last menu.
pub async fn show_last_menu(ctx: &MessageContext) -> FrameworkResult<()> {
    match ctx.session().last_menu() {
        Some(last) => {
            info!(menu = %last.menu_id, "Showing last menu");
            show_menu(ctx, &last.config, &last.menu_id).await
        }
        None => {
            warn!("No last menu to show, falling back to main menu");
            ctx.send_text("Returning to main menu...").await?;
            Ok(())
        }
    }
}

/// Sends `message` together with navigation choices.
///
/// With auto-show disabled only the text is sent. Otherwise the choices are
/// `custom_actions` or, when none are given, the entries of the main menu.
pub async fn show_navigation_options(
    ctx: &MessageContext,
    config: &AppConfig,
    message: &str,
    custom_actions: Option<Vec<Action>>,
) -> FrameworkResult<()> {
    if !config.options.auto_show_menu_after_action {
        ctx.send_text(message).await?;
        return Ok(());
    }

    let actions = match custom_actions {
        Some(actions) => actions,
        None => config
            .menus
            .get(MAIN_MENU)
            .map(|m| m.actions.iter().map(MenuAction::to_action).collect())
            .unwrap_or_default(),
    };

    let set = actions
        .into_iter()
        .fold(ActionBuilder::create(NAVIGATION_OPTIONS, message), ActionBuilder::push)
        .build();
    ctx.send(set).await?;
    Ok(())
}

// ============================================================================
// Installation
// ============================================================================

fn open_menu(config: &Arc<AppConfig>, menu_id: &str) -> ActionHandler {
    let config = Arc::clone(config);
    let menu_id: Arc<str> = Arc::from(menu_id);
    Arc::new(move |ctx: Arc<MessageContext>| {
        let config = Arc::clone(&config);
        let menu_id = Arc::clone(&menu_id);
        async move {
            show_menu(&ctx, &config, &menu_id).await?;
            Ok(())
        }
        .boxed()
    })
}

fn with_navigation(handler: ActionHandler) -> ActionHandler {
    Arc::new(move |ctx: Arc<MessageContext>| {
        let handler = Arc::clone(&handler);
        async move {
            handler(Arc::clone(&ctx)).await?;
            show_last_menu(&ctx).await?;
            Ok(())
        }
        .boxed()
    })
}

/// Registers every action of `config` in `registry`.
///
/// Order: menu handlers, then `deferred` handlers, then navigation to
/// sub-menus for actions without a handler, then the home shortcuts. A later
/// step overwrites an earlier one with the same id.
pub fn install_app(
    registry: &ActionRegistry,
    config: AppConfig,
    deferred: impl IntoIterator<Item = (String, ActionHandler)>,
) -> Arc<AppConfig> {
    let config = Arc::new(config);
    info!(app = %config.name, options = ?config.options, "Initializing app");

    for action in config.menus.values().flat_map(|m| &m.actions) {
        let Some(handler) = action.handler.clone() else {
            continue;
        };
        if action.show_navigation_options {
            registry.register(action.id.clone(), with_navigation(handler));
            info!(action_id = %action.id, "Registered handler (with auto-navigation)");
        } else {
            registry.register(action.id.clone(), handler);
            info!(action_id = %action.id, "Registered handler");
        }
    }

    for (action_id, handler) in deferred {
        info!(action_id = %action_id, "Registered deferred handler");
        registry.register(action_id, handler);
    }

    for action in config.menus.values().flat_map(|m| &m.actions) {
        if action.handler.is_none() && config.menus.contains_key(&action.id) {
            registry.register(action.id.clone(), open_menu(&config, &action.id));
            info!(menu = %action.id, "Auto-registered navigation");
        }
    }

    for id in HOME_ACTIONS {
        registry.register(id, open_menu(&config, MAIN_MENU));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    const MENUS_TOML: &str = r#"
name = "Demo"

[options]
auto_show_menu_after_action = false

[menus.main-menu]
id = "main-menu"
title = "Main"
actions = [
  { id = "tools", label = "Tools" },
  { id = "reset", label = "Reset", style = "danger", show_navigation_options = true },
]

[menus.tools]
id = "tools"
title = "Tools"
"#;

    #[test]
    fn test_app_config_from_toml() {
        let config: AppConfig = toml::from_str(MENUS_TOML).unwrap();

        assert_eq!(config.name, "Demo");
        assert!(!config.options.auto_show_menu_after_action);
        let main = config.get_menu(MAIN_MENU).unwrap();
        assert_eq!(main.actions.len(), 2);
        assert_eq!(main.actions[1].style, Some(ActionStyle::Danger));
        assert!(main.actions[1].show_navigation_options);
        assert!(config.get_menu("tools").unwrap().actions.is_empty());
    }

    #[test]
    fn test_menus_keep_declaration_order() {
        let config = AppConfig::new("x")
            .menu(Menu::new("zeta", "Z"))
            .menu(Menu::new(MAIN_MENU, "Main"))
            .menu(Menu::new("alpha", "A"));
        assert_eq!(
            config.menus.keys().collect::<Vec<_>>(),
            ["zeta", MAIN_MENU, "alpha"]
        );

        let parsed: AppConfig = serde_json::from_str(
            r#"{ "name": "x", "menus": {
                "zeta": { "id": "zeta", "title": "Z" },
                "alpha": { "id": "alpha", "title": "A" }
            } }"#,
        )
        .unwrap();
        assert_eq!(parsed.menus.keys().collect::<Vec<_>>(), ["zeta", "alpha"]);
    }

    #[test]
    fn test_options_default_to_auto_show() {
        let config: AppConfig = serde_json::from_str(r#"{ "name": "x" }"#).unwrap();
        assert!(config.options.auto_show_menu_after_action);
        assert!(config.menus.is_empty());
    }

    #[test]
    fn test_get_menu_unknown() {
        let config = AppConfig::new("x");
        assert!(matches!(
            config.get_menu("nope"),
            Err(FrameworkError::MenuNotFound { .. })
        ));
    }

    #[test]
    fn test_attach_handler() {
        let mut config: AppConfig = toml::from_str(MENUS_TOML).unwrap();
        let attached = config.attach_handler("reset", crate::handler::reply_with("done"));
        assert_eq!(attached, 1);
        assert_eq!(config.attach_handler("missing", crate::handler::reply_with("x")), 0);
    }

    #[test]
    fn test_install_registers_navigation() {
        let config = AppConfig::new("x")
            .menu(
                Menu::new(MAIN_MENU, "Main")
                    .action(MenuAction::new("tools", "Tools"))
                    .action(MenuAction::new("orphan", "No handler, no menu")),
            )
            .menu(Menu::new("tools", "Tools"));
        let registry = ActionRegistry::new("shared");

        install_app(&registry, config, [("later".to_string(), crate::handler::reply_with("x"))]);

        assert_eq!(
            registry.ids(),
            ["back-to-main", "help", "later", "main-menu", "tools"]
        );
    }
}
