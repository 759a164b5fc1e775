//! `send`: dry-run one selection and print the resulting input timeline.

use std::{sync::Arc, time::Instant};

use keysend::{Input, InputEvent, KeySender, RecordingSink};
use radial_config::{CHAT_COMMANDS, Config, TEMPLATE_SLOTS};
use radial_engine::{DispatchOutcome, Engine, TriggerId};
use tokio::{runtime::Runtime, time};
use win_keycode::{Key, MouseButton};

use crate::{
    cli::SendArgs,
    error::{Error, Result},
};

/// Parse `template3`, `chat1`, or the `template_combo3`/`chat_command1` forms.
pub fn parse_trigger(s: &str) -> Result<TriggerId> {
    let lower = s.trim().to_ascii_lowercase();
    let split = |prefixes: &[&str]| {
        prefixes
            .iter()
            .find_map(|p| lower.strip_prefix(p))
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .map(|n| n - 1)
    };
    if let Some(i) = split(&["template_combo", "template"]).filter(|i| *i < TEMPLATE_SLOTS) {
        return Ok(TriggerId::Template(i));
    }
    if let Some(i) = split(&["chat_command", "chat"]).filter(|i| *i < CHAT_COMMANDS) {
        return Ok(TriggerId::Chat(i));
    }
    Err(Error::BadTrigger(s.to_string()))
}

/// Parse a held input: a mouse button name or a key spec.
pub fn parse_input(s: &str) -> Result<Input> {
    if let Some(b) = MouseButton::from_name(s) {
        return Ok(Input::Button(b));
    }
    Key::from_spec(s)
        .map(Input::Key)
        .ok_or_else(|| Error::BadInput(s.to_string()))
}

/// Select the trigger, wait for the sequence to finish, print the timeline.
pub fn run(rt: &Runtime, cfg: &Config, args: &SendArgs) -> Result<()> {
    let id = parse_trigger(&args.trigger)?;
    let sink = Arc::new(RecordingSink::new());
    for h in &args.hold {
        sink.set_held(parse_input(h)?, true);
    }
    let mut engine = Engine::new(cfg, KeySender::new(sink.clone()), rt.handle().clone())?;
    let ctx = args.ctx.context();

    let start = Instant::now();
    let outcome = rt.block_on(async {
        let outcome = engine.select(id, &ctx, time::Instant::now());
        engine.sequencer().wait_idle().await;
        outcome
    });

    println!("{id}: {}", outcome_text(outcome));
    for r in sink.recorded() {
        println!(
            "{:>6} ms  {}",
            r.at.saturating_duration_since(start).as_millis(),
            event_text(&r.event)
        );
    }
    Ok(())
}

/// Human-readable outcome.
fn outcome_text(outcome: DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Scheduled => "sent",
        DispatchOutcome::Queued => "queued (not usable in this context)",
        DispatchOutcome::Unbound => "unbound (nothing to send)",
        DispatchOutcome::Unavailable => "not usable in this context; queuing is off",
        DispatchOutcome::Suppressed => "suppressed (chat box has focus)",
        DispatchOutcome::Busy => "busy (previous dispatch still running)",
        DispatchOutcome::FocusUnavailable => "no foreground window",
        DispatchOutcome::Unknown => "unknown trigger",
    }
}

/// One timeline line.
fn event_text(ev: &InputEvent) -> String {
    match ev {
        InputEvent::Down(i) => format!("down  {i}"),
        InputEvent::Up(i) => format!("up    {i}"),
        InputEvent::Text(t) => format!("text  {t:?}"),
    }
}
