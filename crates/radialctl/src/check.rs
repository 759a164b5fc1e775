//! `check`: print both wheels as the engine sees them in one context.

use std::sync::Arc;

use keysend::{KeySender, RecordingSink};
use radial_config::Config;
use radial_engine::{Action, Engine, GameContext, Trigger, TriggerStatus, Wheel};
use tokio::runtime::Handle;

use crate::error::Result;

/// Build an engine for `cfg` and print its wheels for `ctx`.
pub fn run(rt: &Handle, cfg: &Config, ctx: &GameContext) -> Result<()> {
    let sender = KeySender::new(Arc::new(RecordingSink::new()));
    let engine = Engine::new(cfg, sender, rt.clone())?;

    let q = &cfg.queuing;
    println!(
        "dynamic channel: {} (fallback {})",
        engine.resolved_channel(ctx),
        cfg.chat.dynamic_fallback
    );
    println!(
        "queuing: {}, settle {}ms, max wait {}s{}",
        if q.enabled { "on" } else { "off" },
        q.settle_ms,
        q.max_wait_s,
        if q.cancel_on_center {
            ", center cancels"
        } else {
            ""
        }
    );

    for (wheel, title) in [(Wheel::Templates, "templates"), (Wheel::Chat, "chat")] {
        println!("{title}:");
        for (i, t) in engine.ordered(wheel).enumerate() {
            let status = engine.status(t.id(), ctx).unwrap_or_default();
            println!(
                "  {:>2}. {:<24} [{}] {}",
                i + 1,
                t.label(),
                flags(&status),
                describe(t, &engine, ctx)
            );
        }
    }
    Ok(())
}

/// Short status flags.
fn flags(s: &TriggerStatus) -> String {
    if !s.bound {
        return "unbound".into();
    }
    let visible = if s.visible { "visible" } else { "hidden" };
    let usable = if s.usable { "usable" } else { "blocked" };
    format!("{visible} {usable}")
}

/// What the trigger would send.
fn describe(t: &Trigger, engine: &Engine, ctx: &GameContext) -> String {
    match t.action() {
        Action::Chain(chain) => chain
            .steps()
            .iter()
            .map(|s| s.combo().to_string())
            .collect::<Vec<_>>()
            .join(" -> "),
        Action::Chat { message, channel } if channel.is_concrete() => {
            format!("{channel}: {message:?}")
        }
        Action::Chat { message, channel } => {
            format!("{channel} -> {}: {message:?}", engine.resolved_channel(ctx))
        }
    }
}
