use std::{sync::Arc, time::Duration};

use keysend::{Input, InputEvent, KeySender, RecordingSink};
use radial_config::{Channel, ChatCommand, Config, Queuing};
use radial_engine::{
    Destination, Direction, DispatchOutcome, Engine, GameContext, TemplateBindings, TriggerId,
    Wheel,
};
use tokio::{
    runtime::Handle,
    time::{self, Instant},
};
use win_keycode::{Key, KeyCombo, Modifier};

/// Engine over a recording sink, with templates 1 and 2 bound.
fn create_test_engine(cfg: &mut Config) -> (Engine, Arc<RecordingSink>) {
    cfg.templates[0].build = KeyCombo::new(Key::F1).with(Modifier::Control);
    cfg.templates[0].equip = KeyCombo::new(Key::F1).with(Modifier::Alt);
    cfg.templates[1].equip = KeyCombo::new(Key::F2).with(Modifier::Alt);
    let sink = Arc::new(RecordingSink::new());
    let engine = Engine::new(cfg, KeySender::new(sink.clone()), Handle::current())
        .expect("engine should build");
    (engine, sink)
}

fn chat(message: &str, channel: Channel) -> ChatCommand {
    ChatCommand {
        label: message.into(),
        message: message.into(),
        channel,
        enabled: true,
        priority: None,
    }
}

fn combat() -> GameContext {
    GameContext {
        in_combat: true,
        ..GameContext::default()
    }
}

fn key_downs(sink: &RecordingSink) -> Vec<Key> {
    sink.events()
        .into_iter()
        .filter_map(|e| match e {
            InputEvent::Down(Input::Key(k)) => Some(k),
            _ => None,
        })
        .collect()
}

fn typed(sink: &RecordingSink) -> Vec<String> {
    sink.events()
        .into_iter()
        .filter_map(|e| match e {
            InputEvent::Text(t) => Some(t),
            _ => None,
        })
        .collect()
}

const T1: TriggerId = TriggerId::Template(0);
const T2: TriggerId = TriggerId::Template(1);

#[tokio::test(start_paused = true)]
async fn template_sends_build_then_equip() {
    let (mut engine, sink) = create_test_engine(&mut Config::default());
    let ctx = GameContext::default();
    assert_eq!(engine.select(T1, &ctx, Instant::now()), DispatchOutcome::Scheduled);
    engine.sequencer().wait_idle().await;
    assert_eq!(
        key_downs(&sink),
        vec![Key::Control, Key::F1, Key::Alt, Key::F1]
    );
}

#[tokio::test(start_paused = true)]
async fn combat_queues_template_until_settled() {
    let (mut engine, sink) = create_test_engine(&mut Config::default());
    let t0 = Instant::now();
    assert_eq!(engine.select(T2, &combat(), t0), DispatchOutcome::Queued);
    let status = engine.status(T2, &combat()).expect("status");
    assert!(status.visible && !status.usable && status.queued);

    assert!(engine.update(&combat(), t0).is_empty());
    time::advance(Duration::from_secs(3)).await;
    assert!(engine.update(&combat(), Instant::now()).is_empty());

    // Combat ends: the settle delay starts now.
    let out_of_combat = GameContext::default();
    assert!(engine.update(&out_of_combat, Instant::now()).is_empty());
    time::advance(Duration::from_millis(20)).await;
    assert!(engine.update(&out_of_combat, Instant::now()).is_empty());
    time::advance(Duration::from_millis(30)).await;
    let fired = engine.update(&out_of_combat, Instant::now());
    assert_eq!(fired, vec![(T2, DispatchOutcome::Scheduled)]);
    assert_eq!(engine.queued(), 0);

    engine.sequencer().wait_idle().await;
    assert_eq!(key_downs(&sink), vec![Key::Alt, Key::F2]);
}

#[tokio::test(start_paused = true)]
async fn queued_entries_expire() {
    let mut cfg = Config::default();
    cfg.queuing.max_wait_s = 5;
    let (mut engine, sink) = create_test_engine(&mut cfg);
    assert_eq!(engine.select(T1, &combat(), Instant::now()), DispatchOutcome::Queued);
    time::advance(Duration::from_millis(5001)).await;
    assert!(engine.update(&GameContext::default(), Instant::now()).is_empty());
    assert_eq!(engine.queued(), 0);
    time::sleep(Duration::from_secs(1)).await;
    assert!(sink.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn center_selection_cancels_queue() {
    let (mut engine, _sink) = create_test_engine(&mut Config::default());
    let now = Instant::now();
    engine.select(T1, &combat(), now);
    engine.select(T2, &combat(), now);
    // Reselecting supersedes instead of stacking.
    engine.select(T2, &combat(), now);
    assert_eq!(engine.queued(), 2);
    assert_eq!(engine.select_center(), 2);
    assert_eq!(engine.queued(), 0);

    engine.set_queuing(Queuing {
        cancel_on_center: false,
        ..Queuing::default()
    });
    engine.select(T1, &combat(), now);
    assert_eq!(engine.select_center(), 0);
    assert_eq!(engine.queued(), 1);
}

#[tokio::test(start_paused = true)]
async fn queuing_disabled_drops_unusable_selection() {
    let mut cfg = Config::default();
    cfg.queuing.enabled = false;
    let (mut engine, _sink) = create_test_engine(&mut cfg);
    assert_eq!(
        engine.select(T1, &combat(), Instant::now()),
        DispatchOutcome::Unavailable
    );
    assert_eq!(engine.queued(), 0);
}

#[tokio::test(start_paused = true)]
async fn rebinding_applies_on_next_update() {
    let (mut engine, _sink) = create_test_engine(&mut Config::default());
    let ctx = GameContext::default();
    let t3 = TriggerId::Template(2);
    assert!(!engine.status(t3, &ctx).expect("status").bound);

    engine
        .set_template_bindings(2, TemplateBindings::new(KeyCombo::new(Key::F3), KeyCombo::UNSET))
        .expect("slot exists");
    assert!(!engine.status(t3, &ctx).expect("status").bound);
    engine.update(&ctx, Instant::now());
    assert!(engine.status(t3, &ctx).expect("status").bound);
    assert_eq!(engine.trigger(t3).and_then(|t| t.chain()).map(|c| c.len()), Some(1));

    engine
        .set_template_bindings(0, TemplateBindings::default())
        .expect("slot exists");
    engine.update(&ctx, Instant::now());
    assert_eq!(
        engine.select(T1, &ctx, Instant::now()),
        DispatchOutcome::Unbound
    );
    let visible: Vec<TriggerId> = engine
        .visible(Wheel::Templates, &ctx)
        .iter()
        .map(|t| t.id())
        .collect();
    assert_eq!(visible, vec![T2, t3]);
}

#[tokio::test(start_paused = true)]
async fn reorder_keeps_priorities_in_step() {
    let (mut engine, _sink) = create_test_engine(&mut Config::default());
    assert!(!engine.move_trigger(Wheel::Templates, 0, Direction::Up));
    assert!(!engine.move_trigger(Wheel::Templates, 8, Direction::Down));
    assert!(engine.move_trigger(Wheel::Templates, 0, Direction::Down));
    let order: Vec<TriggerId> = engine.ordered(Wheel::Templates).map(|t| t.id()).take(2).collect();
    assert_eq!(order, vec![T2, T1]);

    let cfg = engine.to_config();
    assert_eq!(cfg.templates[0].priority, Some(1));
    assert_eq!(cfg.templates[1].priority, Some(0));
}

#[tokio::test(start_paused = true)]
async fn say_command_end_to_end() {
    let (mut engine, sink) = create_test_engine(&mut Config::default());
    engine
        .set_chat_command(0, &chat("gg", Channel::Say))
        .expect("slot exists");
    let ctx = GameContext {
        commander: true,
        ..GameContext::default()
    };
    assert_eq!(
        engine.select(TriggerId::Chat(0), &ctx, Instant::now()),
        DispatchOutcome::Scheduled
    );
    engine.sequencer().wait_idle().await;
    assert_eq!(typed(&sink), vec!["/s gg".to_string()]);
    assert!(!key_downs(&sink).contains(&Key::Shift));
}

#[tokio::test(start_paused = true)]
async fn dynamic_command_broadcasts_for_commander() {
    let (mut engine, sink) = create_test_engine(&mut Config::default());
    engine
        .set_chat_command(1, &chat("stack on tag", Channel::Dynamic))
        .expect("slot exists");
    let ctx = GameContext {
        commander: true,
        in_fractals: true,
        ..GameContext::default()
    };
    assert_eq!(engine.resolved_channel(&ctx), Destination::Broadcast);
    engine.select(TriggerId::Chat(1), &ctx, Instant::now());
    engine.sequencer().wait_idle().await;
    assert_eq!(typed(&sink), vec!["stack on tag".to_string()]);
    assert_eq!(key_downs(&sink), vec![Key::Shift, Key::Return, Key::Return]);
}

#[tokio::test(start_paused = true)]
async fn broadcast_command_waits_for_commander_tag() {
    let (mut engine, sink) = create_test_engine(&mut Config::default());
    let id = TriggerId::Chat(2);
    engine
        .set_chat_command(2, &chat("push", Channel::Broadcast))
        .expect("slot exists");
    let plain = GameContext::default();
    assert!(engine.visible(Wheel::Chat, &plain).is_empty());
    assert_eq!(engine.select(id, &plain, Instant::now()), DispatchOutcome::Queued);

    let tagged = GameContext {
        commander: true,
        ..GameContext::default()
    };
    assert!(engine.update(&tagged, Instant::now()).is_empty());
    time::advance(Duration::from_millis(50)).await;
    assert_eq!(
        engine.update(&tagged, Instant::now()),
        vec![(id, DispatchOutcome::Scheduled)]
    );
    engine.sequencer().wait_idle().await;
    assert_eq!(typed(&sink), vec!["push".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn chat_focus_blocks_everything() {
    let (mut engine, sink) = create_test_engine(&mut Config::default());
    sink.set_held(Input::Key(Key::W), true);
    let focused = GameContext {
        chat_focused: true,
        ..GameContext::default()
    };
    assert_eq!(
        engine.select(T1, &focused, Instant::now()),
        DispatchOutcome::Suppressed
    );

    // A queued entry waits out chat focus instead of firing into the chat box.
    engine.select(T1, &combat(), Instant::now());
    assert!(engine.update(&focused, Instant::now()).is_empty());
    time::advance(Duration::from_millis(100)).await;
    assert!(engine.update(&focused, Instant::now()).is_empty());
    assert_eq!(engine.queued(), 1);
    assert!(sink.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reselect_while_in_flight_is_busy() {
    let (mut engine, _sink) = create_test_engine(&mut Config::default());
    let ctx = GameContext::default();
    assert_eq!(engine.select(T1, &ctx, Instant::now()), DispatchOutcome::Scheduled);
    assert_eq!(engine.select(T1, &ctx, Instant::now()), DispatchOutcome::Busy);
    assert!(engine.status(T1, &ctx).expect("status").in_flight);
    engine.sequencer().wait_idle().await;
    assert_eq!(engine.select(T1, &ctx, Instant::now()), DispatchOutcome::Scheduled);
}

#[tokio::test(start_paused = true)]
async fn templates_wait_out_water_and_wvw() {
    let (mut engine, sink) = create_test_engine(&mut Config::default());
    let underwater = GameContext {
        underwater: true,
        ..GameContext::default()
    };
    assert_eq!(engine.select(T1, &underwater, Instant::now()), DispatchOutcome::Queued);

    let wvw = GameContext {
        in_wvw: true,
        ..GameContext::default()
    };
    let status = engine.status(T2, &wvw).expect("status");
    assert!(!status.visible && !status.usable);
    assert!(engine.visible(Wheel::Templates, &wvw).is_empty());

    // Surfacing lets the queued swap through after the settle delay.
    let dry = GameContext::default();
    assert!(engine.update(&underwater, Instant::now()).is_empty());
    assert!(engine.update(&dry, Instant::now()).is_empty());
    time::advance(Duration::from_millis(50)).await;
    assert_eq!(
        engine.update(&dry, Instant::now()),
        vec![(T1, DispatchOutcome::Scheduled)]
    );
    engine.sequencer().wait_idle().await;
    assert_eq!(key_downs(&sink), vec![Key::Control, Key::F1, Key::Alt, Key::F1]);
}

#[tokio::test(start_paused = true)]
async fn oversized_queue_wait_is_refused_without_panicking() {
    let (mut engine, _sink) = create_test_engine(&mut Config::default());
    engine.set_queuing(Queuing {
        max_wait_s: u64::MAX,
        ..Queuing::default()
    });
    assert_eq!(
        engine.select(T1, &combat(), Instant::now()),
        DispatchOutcome::Unavailable
    );
    assert_eq!(engine.queued(), 0);
    assert!(engine.update(&GameContext::default(), Instant::now()).is_empty());
}

#[tokio::test(start_paused = true)]
async fn queued_entry_survives_busy_trigger() {
    let (mut engine, sink) = create_test_engine(&mut Config::default());
    let ctx = GameContext::default();
    let t0 = Instant::now();
    assert_eq!(engine.select(T1, &ctx, t0), DispatchOutcome::Scheduled);
    assert_eq!(engine.select(T1, &combat(), t0), DispatchOutcome::Queued);

    assert!(engine.update(&ctx, t0).is_empty());
    time::advance(Duration::from_millis(50)).await;
    // The first chain is still running, so the entry stays queued.
    assert_eq!(
        engine.update(&ctx, Instant::now()),
        vec![(T1, DispatchOutcome::Busy)]
    );
    assert_eq!(engine.queued(), 1);

    engine.sequencer().wait_idle().await;
    assert_eq!(
        engine.update(&ctx, Instant::now()),
        vec![(T1, DispatchOutcome::Scheduled)]
    );
    assert_eq!(engine.queued(), 0);
    engine.sequencer().wait_idle().await;
    assert_eq!(key_downs(&sink).len(), 8);
}

#[tokio::test(start_paused = true)]
async fn editing_a_queued_trigger_drops_the_stale_entry() {
    let (mut engine, sink) = create_test_engine(&mut Config::default());
    let id = TriggerId::Chat(3);
    engine
        .set_chat_command(3, &chat("old text", Channel::Broadcast))
        .expect("slot exists");
    assert_eq!(
        engine.select(id, &GameContext::default(), Instant::now()),
        DispatchOutcome::Queued
    );
    engine
        .set_chat_command(3, &chat("new text", Channel::Broadcast))
        .expect("slot exists");
    assert_eq!(engine.queued(), 0);

    assert_eq!(engine.select(T2, &combat(), Instant::now()), DispatchOutcome::Queued);
    // Same bindings: nothing changes, the entry stays.
    engine
        .set_template_bindings(
            1,
            TemplateBindings::new(KeyCombo::UNSET, KeyCombo::new(Key::F2).with(Modifier::Alt)),
        )
        .expect("slot exists");
    assert_eq!(engine.queued(), 1);
    engine
        .set_template_bindings(1, TemplateBindings::new(KeyCombo::new(Key::F5), KeyCombo::UNSET))
        .expect("slot exists");
    assert_eq!(engine.queued(), 0);

    let tagged = GameContext {
        commander: true,
        ..GameContext::default()
    };
    engine.update(&tagged, Instant::now());
    time::advance(Duration::from_millis(100)).await;
    assert!(engine.update(&tagged, Instant::now()).is_empty());
    assert!(typed(&sink).is_empty());
}
