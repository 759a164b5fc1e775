//! Builds template action chains from the current keybind configuration.

use std::{collections::HashMap, time::Duration};

use tracing::debug;
use win_keycode::KeyCombo;

use crate::{ActionStep, Trigger, TriggerId};

/// Delay before each template step. The game drops a template swap that
/// arrives in the same frame as the previous one.
pub const STEP_DELAY: Duration = Duration::from_millis(75);

/// The two keybinds of a template combination.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TemplateBindings {
    /// Build template keybind.
    pub build: KeyCombo,
    /// Equipment template keybind.
    pub equip: KeyCombo,
}

impl TemplateBindings {
    /// Bindings from two combos.
    pub fn new(build: KeyCombo, equip: KeyCombo) -> Self {
        Self { build, equip }
    }

    /// Binds in send order: build first, then equipment.
    fn in_order(&self) -> [&KeyCombo; 2] {
        [&self.build, &self.equip]
    }
}

/// Replace `trigger`'s chain with one step per set binding, in declared
/// order. Unset bindings are skipped; a chain with no set bindings is empty
/// and the trigger becomes unbound. Chat triggers are left alone.
pub fn rebuild(trigger: &mut Trigger, bindings: &TemplateBindings) {
    let id = trigger.id();
    let Some(chain) = trigger.chain_mut() else {
        return;
    };
    chain.clear();
    for combo in bindings.in_order() {
        if combo.is_set() {
            chain.push(ActionStep::new(combo.clone(), STEP_DELAY));
        }
    }
    debug!(trigger = %id, steps = chain.len(), "chain_rebuilt");
}

/// Tracks the binding snapshot each chain was last built from and rebuilds
/// only when it changes.
#[derive(Debug, Default)]
pub struct ChainBuilder {
    /// Bindings each trigger was last built from.
    built: HashMap<TriggerId, TemplateBindings>,
}

impl ChainBuilder {
    /// An empty builder; every trigger's first refresh rebuilds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild `trigger`'s chain if `bindings` differ from the last build.
    /// Returns true when a rebuild happened.
    pub fn refresh(&mut self, trigger: &mut Trigger, bindings: &TemplateBindings) -> bool {
        let id = trigger.id();
        if self.built.get(&id) == Some(bindings) {
            return false;
        }
        rebuild(trigger, bindings);
        self.built.insert(id, bindings.clone());
        true
    }

    /// Bindings `id` was last built from.
    pub fn snapshot(&self, id: TriggerId) -> Option<&TemplateBindings> {
        self.built.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use win_keycode::{Key, Modifier};

    use super::*;

    fn trigger() -> Trigger {
        Trigger::template(0, "Template Combo 1", 0)
    }

    #[test]
    fn no_bindings_no_steps() {
        let mut t = trigger();
        rebuild(&mut t, &TemplateBindings::default());
        assert!(t.chain().is_some_and(|c| c.is_empty()));
        assert!(!t.is_bound());
    }

    #[test]
    fn only_second_binding() {
        let mut t = trigger();
        let equip = KeyCombo::new(Key::F2).with(Modifier::Alt);
        rebuild(&mut t, &TemplateBindings::new(KeyCombo::UNSET, equip.clone()));
        let steps = t.chain().map(|c| c.steps().to_vec()).unwrap_or_default();
        assert_eq!(steps, vec![ActionStep::new(equip, STEP_DELAY)]);
        assert!(t.is_bound());
    }

    #[test]
    fn both_bindings_in_declared_order() {
        let mut t = trigger();
        let b = TemplateBindings::new(KeyCombo::new(Key::F1), KeyCombo::new(Key::F2));
        rebuild(&mut t, &b);
        let combos: Vec<KeyCombo> = t
            .chain()
            .map(|c| c.steps().iter().map(|s| s.combo().clone()).collect())
            .unwrap_or_default();
        assert_eq!(combos, vec![b.build.clone(), b.equip.clone()]);
        assert!(t.chain().is_some_and(|c| c.steps().iter().all(|s| s.delay() == STEP_DELAY)));
    }

    #[test]
    fn rebuild_replaces_previous_steps() {
        let mut t = trigger();
        rebuild(
            &mut t,
            &TemplateBindings::new(KeyCombo::new(Key::F1), KeyCombo::new(Key::F2)),
        );
        rebuild(
            &mut t,
            &TemplateBindings::new(KeyCombo::new(Key::F3), KeyCombo::UNSET),
        );
        assert_eq!(t.chain().map(|c| c.len()), Some(1));
    }

    #[test]
    fn refresh_skips_unchanged() {
        let mut builder = ChainBuilder::new();
        let mut t = trigger();
        let b = TemplateBindings::new(KeyCombo::new(Key::F1), KeyCombo::UNSET);
        assert!(builder.refresh(&mut t, &b));
        assert!(!builder.refresh(&mut t, &b));
        assert_eq!(builder.snapshot(t.id()), Some(&b));

        let changed = TemplateBindings::new(KeyCombo::new(Key::F1), KeyCombo::new(Key::F4));
        assert!(builder.refresh(&mut t, &changed));
        assert_eq!(t.chain().map(|c| c.len()), Some(2));
    }

    #[test]
    fn chat_triggers_untouched() {
        let mut t = Trigger::chat(0, "gg", "gg", radial_config::Channel::Say, true, 0);
        let before = t.action().clone();
        rebuild(
            &mut t,
            &TemplateBindings::new(KeyCombo::new(Key::F1), KeyCombo::UNSET),
        );
        assert_eq!(t.action(), &before);
    }
}
