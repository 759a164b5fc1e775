//! Radial Engine
//!
//! The radial engine turns a wheel selection into timed synthetic input for
//! Guild Wars 2:
//! - gates triggers on the current game context (combat, map kind, water)
//! - resolves the dynamic chat channel to a concrete destination
//! - rebuilds template key chains when their bindings change
//! - queues selections the game would ignore and sends them once allowed
//! - sequences chat and keybind input on a tokio runtime without blocking
//!
//! The host drives an [`Engine`] from its frame loop: it polls the game
//! observer into a [`GameContext`], calls [`Engine::update`] once per frame
//! and [`Engine::select`] when the user picks a wheel entry. None of the
//! per-frame calls block or return errors.
use std::{collections::BTreeMap, path::Path};

use keysend::KeySender;
use radial_config::{
    CHAT_COMMANDS, Channel, Chat, ChatCommand, Config, Queuing, TEMPLATE_SLOTS, TemplateSlot,
};
use tokio::{runtime::Handle, time::Instant};
use tracing::{debug, info, trace};

mod chain;
mod context;
mod error;
mod gate;
mod order;
mod props;
mod queue;
mod sequencer;
mod trigger;

pub use chain::{ChainBuilder, STEP_DELAY, TemplateBindings, rebuild};
pub use context::{GameContext, MumbleState, UI_IN_COMBAT, UI_TEXTBOX_FOCUS};
pub use error::{Error, Result};
pub use gate::{ConditionGate, Destination};
pub use order::{Direction, PriorityOrderer, Prioritized};
pub use props::{ConditionalProps, Gate};
pub use queue::{DispatchQueue, QueueEntry};
pub use sequencer::{
    AMBIENT_BUTTONS, AmbientInput, DispatchOutcome, InputSequencer, MOVEMENT_KEYS, Payload,
    PendingRestore, Timing,
};
pub use trigger::{Action, ActionChain, ActionStep, Trigger, TriggerId};

/// The two radial menus.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Wheel {
    /// Build/equipment template combinations.
    Templates,
    /// Preset chat commands.
    Chat,
}

impl Wheel {
    /// The wheel a trigger belongs to.
    pub fn of(id: TriggerId) -> Self {
        match id {
            TriggerId::Template(_) => Self::Templates,
            TriggerId::Chat(_) => Self::Chat,
        }
    }
}

/// Per-trigger state for the UI.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TriggerStatus {
    /// Has something to send and is enabled.
    pub bound: bool,
    /// Shown on the wheel in this context.
    pub visible: bool,
    /// Can be sent right now.
    pub usable: bool,
    /// Waiting in the queue.
    pub queued: bool,
    /// A dispatch is still running.
    pub in_flight: bool,
}

/// Both wheels, each in display order.
struct Wheels {
    /// Template wheel.
    templates: PriorityOrderer<Trigger>,
    /// Chat wheel.
    chat: PriorityOrderer<Trigger>,
}

impl Wheels {
    /// The orderer for `wheel`.
    fn wheel(&self, wheel: Wheel) -> &PriorityOrderer<Trigger> {
        match wheel {
            Wheel::Templates => &self.templates,
            Wheel::Chat => &self.chat,
        }
    }

    /// Mutable orderer for `wheel`.
    fn wheel_mut(&mut self, wheel: Wheel) -> &mut PriorityOrderer<Trigger> {
        match wheel {
            Wheel::Templates => &mut self.templates,
            Wheel::Chat => &mut self.chat,
        }
    }

    /// Trigger by id.
    fn get(&self, id: TriggerId) -> Option<&Trigger> {
        self.wheel(Wheel::of(id)).find(|t| t.id() == id)
    }

    /// Mutable trigger by id.
    fn get_mut(&mut self, id: TriggerId) -> Option<&mut Trigger> {
        self.wheel_mut(Wheel::of(id)).find_mut(|t| t.id() == id)
    }
}

/// Build the dispatch payload for `action`, resolving a dynamic channel
/// against `ctx` now.
fn payload_for(gate: &ConditionGate, action: &Action, ctx: &GameContext) -> Payload {
    match action {
        Action::Chain(chain) => Payload::Chain(chain.clone()),
        Action::Chat { message, channel } => Payload::Text {
            text: message.clone(),
            destination: gate.resolve(*channel, ctx),
        },
    }
}

/// Chat trigger for slot `slot` from its configuration.
fn chat_trigger(slot: usize, cmd: &ChatCommand, priority: i32) -> Trigger {
    let label = if cmd.label.trim().is_empty() {
        format!("Command {}", slot + 1)
    } else {
        cmd.label.clone()
    };
    Trigger::chat(
        slot,
        label,
        cmd.message.clone(),
        cmd.channel,
        cmd.enabled,
        priority,
    )
}

/// Engine coordinates gating, queuing and input sequencing for both wheels.
///
/// Construct with [`Engine::new`] (or [`Engine::load`]), then call
/// [`Engine::update`] every frame and [`Engine::select`] on selections.
pub struct Engine {
    /// Channel resolution and trigger gating.
    gate: ConditionGate,
    /// Triggers in display order.
    wheels: Wheels,
    /// Configured template bindings by slot.
    bindings: BTreeMap<usize, TemplateBindings>,
    /// Rebuilds chains when bindings change.
    chains: ChainBuilder,
    /// Pending selections.
    queue: DispatchQueue,
    /// Timed input.
    sequencer: InputSequencer,
}

impl Engine {
    /// Create an engine from a configuration.
    ///
    /// - `sender`: input boundary for every synthetic event
    /// - `runtime`: tokio runtime that runs the timed part of dispatches
    ///
    /// Trigger properties and the initial chains are set up here, once.
    pub fn new(cfg: &Config, sender: KeySender, runtime: Handle) -> Result<Self> {
        cfg.validate()?;

        let mut bindings = BTreeMap::new();
        let mut chains = ChainBuilder::new();
        let mut templates = Vec::with_capacity(TEMPLATE_SLOTS);
        for slot in 0..TEMPLATE_SLOTS {
            let conf = cfg.templates.get(slot).cloned().unwrap_or_default();
            let priority = conf.priority.unwrap_or(slot as i32);
            let b = TemplateBindings::new(conf.build, conf.equip);
            let mut t = Trigger::template(slot, cfg.template_label(slot), priority);
            chains.refresh(&mut t, &b);
            templates.push(t);
            bindings.insert(slot, b);
        }

        let mut chat = Vec::with_capacity(CHAT_COMMANDS);
        for slot in 0..CHAT_COMMANDS {
            let conf = cfg.chat.commands.get(slot).cloned().unwrap_or_default();
            let priority = conf.priority.unwrap_or(slot as i32);
            chat.push(chat_trigger(slot, &conf, priority));
        }

        let engine = Self {
            gate: ConditionGate::new(cfg.chat.dynamic_fallback),
            wheels: Wheels {
                templates: PriorityOrderer::new(templates),
                chat: PriorityOrderer::new(chat),
            },
            bindings,
            chains,
            queue: DispatchQueue::new(cfg.queuing.clone()),
            sequencer: InputSequencer::new(sender, runtime),
        };
        info!(
            templates = engine.bound_count(Wheel::Templates),
            chat = engine.bound_count(Wheel::Chat),
            "engine_ready"
        );
        Ok(engine)
    }

    /// Load the configuration at `path` and create an engine from it.
    pub fn load(path: &Path, sender: KeySender, runtime: Handle) -> Result<Self> {
        let cfg = radial_config::load_from_path(path)?;
        Self::new(&cfg, sender, runtime)
    }

    /// Replace the sequencer delays.
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.sequencer = self.sequencer.with_timing(timing);
        self
    }

    /// Number of bound triggers on `wheel`.
    fn bound_count(&self, wheel: Wheel) -> usize {
        self.wheels.wheel(wheel).iter().filter(|t| t.is_bound()).count()
    }

    /// Per-frame work: rebuild chains whose bindings changed, advance the
    /// queue and dispatch every entry that became due.
    ///
    /// Returns the outcome of each dispatched entry.
    pub fn update(
        &mut self,
        ctx: &GameContext,
        now: Instant,
    ) -> Vec<(TriggerId, DispatchOutcome)> {
        for (slot, b) in &self.bindings {
            if let Some(t) = self.wheels.get_mut(TriggerId::Template(*slot)) {
                self.chains.refresh(t, b);
            }
        }

        let gate = &self.gate;
        let wheels = &self.wheels;
        let due = self.queue.tick(now, |id| {
            !ctx.chat_focused && wheels.get(id).is_some_and(|t| gate.is_usable(t, ctx))
        });

        let mut fired = Vec::with_capacity(due.len());
        for entry in due {
            let id = entry.trigger;
            let payload = payload_for(&self.gate, &entry.action, ctx);
            let outcome = self.sequencer.dispatch(id, payload, ctx);
            if outcome == DispatchOutcome::Busy {
                // The previous run still holds the trigger; retry once it ends.
                info!(trigger = %id, "queued_dispatch_busy");
                self.queue.requeue(entry);
            } else {
                debug!(trigger = %id, ?outcome, "queued_dispatch");
            }
            fired.push((id, outcome));
        }
        fired
    }

    /// Handle a selection of `id`.
    ///
    /// Usable triggers are dispatched at once; unusable ones are queued when
    /// queuing is enabled. A fresh selection replaces any pending entry for
    /// the same trigger.
    pub fn select(&mut self, id: TriggerId, ctx: &GameContext, now: Instant) -> DispatchOutcome {
        let Some(trigger) = self.wheels.get(id) else {
            debug!(trigger = %id, "select_unknown");
            return DispatchOutcome::Unknown;
        };
        if !trigger.is_bound() {
            debug!(trigger = %id, "select_unbound");
            return DispatchOutcome::Unbound;
        }
        if ctx.chat_focused {
            debug!(trigger = %id, "select_suppressed_chat_focused");
            return DispatchOutcome::Suppressed;
        }
        if !self.gate.is_usable(trigger, ctx) {
            let action = trigger.action().clone();
            return if self.queue.enqueue(id, action, now) {
                DispatchOutcome::Queued
            } else {
                DispatchOutcome::Unavailable
            };
        }
        let payload = payload_for(&self.gate, trigger.action(), ctx);
        self.queue.cancel(id);
        let outcome = self.sequencer.dispatch(id, payload, ctx);
        trace!(trigger = %id, ?outcome, "select");
        outcome
    }

    /// Handle a selection of the wheel's empty center. Cancels every pending
    /// entry when `cancel_on_center` is set; returns how many were dropped.
    pub fn select_center(&mut self) -> usize {
        if self.queue.params().cancel_on_center {
            self.queue.cancel_all()
        } else {
            0
        }
    }

    /// Set the keybinds of template slot `slot`. The chain is rebuilt on the
    /// next [`Engine::update`] if they differ from the current ones, and a
    /// queued selection of the slot is dropped.
    pub fn set_template_bindings(
        &mut self,
        slot: usize,
        bindings: TemplateBindings,
    ) -> Result<()> {
        let entry = self
            .bindings
            .get_mut(&slot)
            .ok_or(Error::UnknownTrigger(TriggerId::Template(slot)))?;
        if *entry != bindings {
            // A queued entry carries the chain it was selected with.
            self.queue.cancel(TriggerId::Template(slot));
            *entry = bindings;
        }
        Ok(())
    }

    /// Replace chat command `slot`. Its position on the wheel is kept; a
    /// queued selection of the old command is dropped.
    pub fn set_chat_command(&mut self, slot: usize, cmd: &ChatCommand) -> Result<()> {
        let id = TriggerId::Chat(slot);
        let trigger = self.wheels.get_mut(id).ok_or(Error::UnknownTrigger(id))?;
        *trigger = chat_trigger(slot, cmd, trigger.priority());
        self.queue.cancel(id);
        debug!(
            trigger = %id,
            channel = %cmd.channel,
            enabled = cmd.enabled,
            "chat_command_set"
        );
        Ok(())
    }

    /// Replace the queuing parameters.
    pub fn set_queuing(&mut self, params: Queuing) {
        self.queue.set_params(params);
    }

    /// Replace the dynamic channel fallback (Squad or Say).
    pub fn set_dynamic_fallback(&mut self, fallback: Channel) {
        self.gate = ConditionGate::new(fallback);
    }

    /// Move the trigger at `index` on `wheel` one place. Returns false for
    /// moves past either end.
    pub fn move_trigger(&mut self, wheel: Wheel, index: usize, dir: Direction) -> bool {
        self.wheels.wheel_mut(wheel).move_item(index, dir)
    }

    /// Triggers of `wheel` in display order, bound or not.
    pub fn ordered(&self, wheel: Wheel) -> impl Iterator<Item = &Trigger> {
        self.wheels.wheel(wheel).iter()
    }

    /// Triggers of `wheel` to show in `ctx`, in display order.
    pub fn visible(&self, wheel: Wheel, ctx: &GameContext) -> Vec<&Trigger> {
        self.ordered(wheel)
            .filter(|t| self.gate.is_visible(t, ctx))
            .collect()
    }

    /// Trigger by id.
    pub fn trigger(&self, id: TriggerId) -> Option<&Trigger> {
        self.wheels.get(id)
    }

    /// UI status of `id` in `ctx`.
    pub fn status(&self, id: TriggerId, ctx: &GameContext) -> Option<TriggerStatus> {
        let t = self.wheels.get(id)?;
        Some(TriggerStatus {
            bound: t.is_bound(),
            visible: self.gate.is_visible(t, ctx),
            usable: self.gate.is_usable(t, ctx),
            queued: self.queue.is_queued(id),
            in_flight: self.sequencer.is_in_flight(id),
        })
    }

    /// Where a dynamic chat command would go in `ctx`.
    pub fn resolved_channel(&self, ctx: &GameContext) -> Destination {
        self.gate.resolve(Channel::Dynamic, ctx)
    }

    /// Number of pending queue entries.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// The input sequencer.
    pub fn sequencer(&self) -> &InputSequencer {
        &self.sequencer
    }

    /// Current state as a configuration, with priorities matching the
    /// display order.
    pub fn to_config(&self) -> Config {
        let templates = (0..TEMPLATE_SLOTS)
            .map(|slot| {
                let t = self.wheels.get(TriggerId::Template(slot));
                let b = self.bindings.get(&slot).cloned().unwrap_or_default();
                let default_label = format!("Template Combo {}", slot + 1);
                TemplateSlot {
                    label: t
                        .map(|t| t.label().to_string())
                        .filter(|l| *l != default_label),
                    build: b.build,
                    equip: b.equip,
                    priority: t.map(Trigger::priority),
                }
            })
            .collect();
        let commands = (0..CHAT_COMMANDS)
            .filter_map(|slot| self.wheels.get(TriggerId::Chat(slot)))
            .map(|t| {
                let (message, channel) = match t.action() {
                    Action::Chat { message, channel } => (message.clone(), *channel),
                    Action::Chain(_) => (String::new(), Channel::Dynamic),
                };
                ChatCommand {
                    label: t.label().to_string(),
                    message,
                    channel,
                    enabled: t.enabled(),
                    priority: Some(t.priority()),
                }
            })
            .collect();
        Config {
            queuing: self.queue.params().clone(),
            templates,
            chat: Chat {
                dynamic_fallback: self.gate.fallback().channel(),
                commands,
            },
        }
    }
}
