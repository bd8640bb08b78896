//! The demo agent.
//!
//! Menus lead to USDC actions on Base, a tip guarded by a confirmation and a
//! network picker built from a selection. Free text with `@mentions` or
//! `.eth` names is answered with the resolved addresses.

use std::fmt::Write as _;
use std::sync::Arc;

use tapkit::prelude::*;
use tapkit::usdc::USDC_NETWORKS;

/// Amount sent by the tip confirmation.
pub const TIP_AMOUNT: &str = "0.005";

pub struct DemoAgent {
    services: AgentServices,
    /// Address transfers are paid to.
    agent_address: String,
}

/// The menus of the demo, without handlers.
///
/// A `[app]` table in `tapkit.toml` replaces these; handlers are attached by
/// action id either way.
pub fn default_app() -> AppConfig {
    AppConfig::new("Inline Actions Demo")
        .menu(
            Menu::new(
                MAIN_MENU,
                "👋 Welcome to the inline actions demo!\n\nChoose an action below:",
            )
            .action(MenuAction::new("wallet", "💸 Transaction Actions"))
            .action(MenuAction::new("check-balance", "💰 Check Balance").show_navigation_options(true))
            .action(MenuAction::new("tip", "🎁 Tip the agent"))
            .action(MenuAction::new("choose-network", "🌐 Choose network"))
            .action(MenuAction::new("more-info", "ℹ️ More Info").show_navigation_options(true)),
        )
        .menu(
            Menu::new("wallet", "Choose a transaction action:")
                .action(MenuAction::new("send-small", "Send 0.005 USDC"))
                .action(MenuAction::new("send-large", "Send 1 USDC"))
                .action(MenuAction::new("back-to-main", "⬅️ Back")),
        )
}

impl DemoAgent {
    pub fn new(services: AgentServices, agent_address: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            services,
            agent_address: agent_address.into(),
        })
    }

    /// Text matchers: `/` commands open the main menu, `gm` gets a hint,
    /// anything mentioning an account gets resolved.
    pub fn dispatcher(self: &Arc<Self>) -> Dispatcher {
        let agent = Arc::clone(self);

        Dispatcher::new()
            .with(
                on_prefix("/")
                    .name("commands")
                    .block(true)
                    .handler(|ctx| async move {
                        match ctx.find_action(MAIN_MENU) {
                            Some(open_main_menu) => open_main_menu(ctx).await,
                            None => Ok(()),
                        }
                    }),
            )
            .with(
                on_text()
                    .name("greeting")
                    .check(|ctx| {
                        ctx.text()
                            .is_some_and(|t| t.trim().eq_ignore_ascii_case("gm"))
                    })
                    .block(true)
                    .handler(|_ctx| async { "gm! Send /help to see what I can do.".to_string() }),
            )
            .with(
                on_text()
                    .name("mentions")
                    .check(|ctx| ctx.text().is_some_and(|t| !extract_mentions(t).is_empty()))
                    .handler(move |ctx| {
                        let agent = Arc::clone(&agent);
                        async move { agent.describe_mentions(&ctx).await }
                    }),
            )
    }

    /// Handlers for the menu actions, keyed by action id.
    pub fn handlers(self: &Arc<Self>) -> Vec<(String, ActionHandler)> {
        let network = self.services.usdc.network();

        let more_info = format!(
            "ℹ️ Network Information\n\n\
             CURRENT NETWORK:\n\
             • Name: {}\n\
             • Network ID: {}\n\
             • Chain ID: {}\n\
             • USDC Address: {}\n\n\
             FEATURES:\n\
             • Wallet Send Calls (EIP-5792)\n\
             • Inline Actions (XIP-67)",
            network.network_name, network.network_id, network.chain_id, network.token_address
        );

        let balance = {
            let agent = Arc::clone(self);
            into_handler(move |_ctx| {
                let agent = Arc::clone(&agent);
                async move {
                    let usdc = &agent.services.usdc;
                    let balance = usdc.get_balance(&agent.agent_address).await?;
                    Ok::<_, anyhow::Error>(format!(
                        "💰 Bot Balance: {balance} USDC on {}",
                        usdc.network().network_name
                    ))
                }
            })
        };

        let tip = {
            let agent = Arc::clone(self);
            into_handler(move |ctx| {
                let on_yes = agent.transfer_handler(TIP_AMOUNT);
                async move {
                    send_confirmation(
                        &ctx,
                        &format!("Send a {TIP_AMOUNT} USDC tip to the agent?"),
                        on_yes,
                        None,
                    )
                    .await
                    .map(|_| ())
                }
            })
        };

        let choose_network = into_handler(|ctx| async move {
            let options = USDC_NETWORKS
                .iter()
                .map(|n| {
                    SelectionOption::new(
                        format!("network-{}", n.network_id),
                        n.network_name,
                        reply_with(format!("👍 {} it is (chain {})", n.network_name, n.chain_id)),
                    )
                })
                .collect();
            send_selection(&ctx, "Which network is your wallet on?", options)
                .await
                .map(|_| ())
        });

        vec![
            ("send-small".into(), self.transfer_handler("0.005")),
            ("send-large".into(), self.transfer_handler("1")),
            ("check-balance".into(), balance),
            ("tip".into(), tip),
            ("choose-network".into(), choose_network),
            ("more-info".into(), reply_with(more_info)),
        ]
    }

    /// Asks the sender's wallet to pay `amount` USDC to the agent.
    fn transfer_handler(self: &Arc<Self>, amount: &'static str) -> ActionHandler {
        let agent = Arc::clone(self);
        into_handler(move |ctx| {
            let agent = Arc::clone(&agent);
            async move { agent.request_transfer(&ctx, amount).await }
        })
    }

    async fn request_transfer(&self, ctx: &MessageContext, amount: &str) -> anyhow::Result<()> {
        let Some(sender) = ctx.sender_address() else {
            ctx.send_text("❌ I don't know your wallet address.").await?;
            return Ok(());
        };

        let usdc = &self.services.usdc;
        let base_units = to_base_units(amount, usdc.network().decimals)?;
        let calls = usdc.create_transfer_calls(sender, &self.agent_address, base_units)?;

        ctx.send(calls).await?;
        ctx.send_text(&format!(
            "💸 Please approve the {amount} USDC transfer in your wallet!"
        ))
        .await?;
        Ok(())
    }

    async fn describe_mentions(&self, ctx: &MessageContext) -> anyhow::Result<Option<String>> {
        let Some(text) = ctx.text() else {
            return Ok(None);
        };

        let members = ctx.conversation().members().await.ok();
        let resolved = self
            .services
            .resolver
            .resolve_mentions_in_message(text, members.as_deref())
            .await;
        if resolved.is_empty() {
            return Ok(None);
        }

        let mut response = String::from("🔍 Resolved:\n");
        for (identifier, address) in &resolved {
            let Some(address) = address else {
                write!(response, "\n❌ {identifier} → Not found")?;
                continue;
            };
            write!(response, "\n✅ {identifier} → {address}")?;

            let profile = self.services.profiles.fetch_farcaster_profile(address).await;
            if let Some(username) = &profile.username {
                write!(response, "\n   👤 Farcaster: {username}")?;
            }
            if let (Some(fid), Some(social)) = (&profile.fid, &profile.social) {
                write!(
                    response,
                    "\n   🆔 FID: {fid}\n   👥 Followers: {} | Following: {}",
                    social.follower.unwrap_or_default(),
                    social.following.unwrap_or_default()
                )?;
            }
        }
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapkit::core::ActionSet;

    const SENDER: &str = "0x1111111111111111111111111111111111111111";
    const AGENT: &str = "0x2222222222222222222222222222222222222222";

    fn setup() -> (Dispatcher, Arc<MemoryConversation>) {
        let services = AgentServices::from_config(&TapkitConfig::default()).unwrap();
        let agent = DemoAgent::new(services, AGENT);
        let dispatcher = agent.dispatcher();

        let mut app = default_app();
        for (id, handler) in agent.handlers() {
            assert!(app.attach_handler(&id, handler) > 0, "no menu action {id}");
        }
        dispatcher.install_app(app, []);

        (dispatcher, MemoryConversation::new("console").boxed())
    }

    async fn say(
        dispatcher: &Dispatcher,
        conv: &Arc<MemoryConversation>,
        content: impl Into<Content>,
    ) -> Vec<Content> {
        let message = InboundMessage::new(conv.id(), "user", content).with_sender_address(SENDER);
        dispatcher
            .dispatch(message, Arc::clone(conv) as BoxedConversation)
            .await;
        conv.take_sent().into_iter().map(|m| m.content).collect()
    }

    fn actions(content: &Content) -> &ActionSet {
        content.as_actions().expect("an action set")
    }

    #[tokio::test]
    async fn test_command_opens_main_menu() {
        let (dispatcher, conv) = setup();

        let sent = say(&dispatcher, &conv, "/help").await;
        assert_eq!(sent.len(), 1);
        let menu = actions(&sent[0]);
        assert_eq!(menu.id, MAIN_MENU);
        assert_eq!(
            menu.action_ids().collect::<Vec<_>>(),
            ["wallet", "check-balance", "tip", "choose-network", "more-info"]
        );

        let sent = say(&dispatcher, &conv, Intent::new("wallet")).await;
        assert_eq!(actions(&sent[0]).id, "wallet");

        let sent = say(&dispatcher, &conv, Intent::new("back-to-main")).await;
        assert_eq!(actions(&sent[0]).id, MAIN_MENU);
    }

    #[tokio::test]
    async fn test_send_small_requests_wallet_call() {
        let (dispatcher, conv) = setup();

        let sent = say(&dispatcher, &conv, Intent::new("send-small")).await;
        assert_eq!(sent.len(), 2);
        let Content::WalletSendCalls(calls) = &sent[0] else {
            panic!("expected wallet calls, got {:?}", sent[0]);
        };
        assert_eq!(calls.from, SENDER);
        assert!(calls.calls[0].data.ends_with(&format!("{:064x}", 5000)));
        assert_eq!(
            sent[1].as_text(),
            Some("💸 Please approve the 0.005 USDC transfer in your wallet!")
        );
    }

    #[tokio::test]
    async fn test_tip_confirmation() {
        let (dispatcher, conv) = setup();

        let sent = say(&dispatcher, &conv, Intent::new("tip")).await;
        let confirm = actions(&sent[0]).clone();
        assert_eq!(confirm.description, "Send a 0.005 USDC tip to the agent?");

        let no_id = confirm.actions[1].id.clone();
        let sent = say(&dispatcher, &conv, Intent::new(no_id)).await;
        assert_eq!(sent[0].as_text(), Some("❌ Cancelled"));

        let yes_id = confirm.actions[0].id.clone();
        let sent = say(&dispatcher, &conv, Intent::new(yes_id)).await;
        assert!(matches!(sent[0], Content::WalletSendCalls(_)));
    }

    #[tokio::test]
    async fn test_choose_network() {
        let (dispatcher, conv) = setup();

        let sent = say(&dispatcher, &conv, Intent::new("choose-network")).await;
        let selection = actions(&sent[0]).clone();
        assert_eq!(
            selection.action_ids().collect::<Vec<_>>(),
            ["network-base-sepolia", "network-base-mainnet"]
        );

        let sent = say(&dispatcher, &conv, Intent::new("network-base-mainnet")).await;
        assert_eq!(sent[0].as_text(), Some("👍 Base Mainnet it is (chain 8453)"));
    }

    #[tokio::test]
    async fn test_more_info_returns_to_last_menu() {
        let (dispatcher, conv) = setup();

        let sent = say(&dispatcher, &conv, Intent::new("more-info")).await;
        assert!(sent[0].as_text().unwrap().contains("Chain ID: 84532"));
        assert_eq!(sent[1].as_text(), Some("Returning to main menu..."));

        say(&dispatcher, &conv, "/menu").await;
        let sent = say(&dispatcher, &conv, Intent::new("more-info")).await;
        assert_eq!(actions(&sent[1]).id, MAIN_MENU);
    }

    #[tokio::test]
    async fn test_greeting_and_plain_text() {
        let (dispatcher, conv) = setup();

        let sent = say(&dispatcher, &conv, "GM").await;
        assert_eq!(sent[0].as_text(), Some("gm! Send /help to see what I can do."));

        assert!(say(&dispatcher, &conv, "nothing to see here").await.is_empty());
    }
}
