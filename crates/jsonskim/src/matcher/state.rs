//! Matching state of one pattern during a scan.
//!
//! Each open container has a [`Frame`] holding the set of steps that may
//! match its children. `**` keeps itself and its successor in the set, so
//! recursive wildcards are tried at every depth without backtracking. A
//! capture that matches a container switches the pattern into subtree mode,
//! where the container is copied whole and no other matching happens until
//! it closes.

use alloc::{
    string::{String, ToString},
    vec,
    vec::Vec,
};

use crate::{
    capture::Capture,
    lexer::ContainerKind,
    pattern::{Pattern, Step},
    value::{Map, Value},
};

#[derive(Debug, Clone, Default)]
struct Frame {
    /// Indexes of the steps that may match a child, sorted.
    active: Vec<usize>,
    /// Deliver pending captures when this container closes.
    process: bool,
}

#[derive(Debug)]
struct Subtree {
    slot: usize,
    name: Option<String>,
    /// Open containers, each with its member name in the parent.
    stack: Vec<(Option<String>, Value)>,
    discarded: bool,
}

impl Subtree {
    fn append(&mut self, name: Option<String>, value: Value) {
        match self.stack.last_mut() {
            Some((_, Value::Object(map))) => map.push(name.unwrap_or_default(), value),
            Some((_, Value::Array(items))) => items.push(value),
            _ => {}
        }
    }
}

fn empty(kind: ContainerKind) -> Value {
    match kind {
        ContainerKind::Object => Value::Object(Map::new()),
        ContainerKind::Array => Value::Array(Vec::new()),
    }
}

/// A captured value waiting for delivery.
#[derive(Debug)]
struct Held {
    slot: usize,
    /// Key in an object delivery.
    key: String,
    /// Name of a bare delivery.
    name: Option<String>,
    array: bool,
    value: Value,
}

/// What entering a container does to a pattern, worked out before any of it
/// is applied so that pending captures can be delivered first.
#[derive(Debug, Default)]
pub(crate) struct EnterPlan {
    /// Deliver pending captures before anything else.
    pub emit: bool,
    /// Key captures to store, by slot.
    pub keys: Vec<usize>,
    /// Slot of a capture that copies the whole container.
    subtree: Option<usize>,
    frame: Frame,
}

#[derive(Debug)]
pub(crate) struct PatternState {
    pub(crate) pattern: Pattern,
    frames: Vec<Frame>,
    subtree: Option<Subtree>,
    held: Vec<Held>,
    holding: Vec<bool>,
    satisfied: Vec<bool>,
    dead: Option<usize>,
}

impl PatternState {
    pub(crate) fn new(pattern: Pattern) -> Self {
        let slots = pattern.captures.len();
        let mut state = Self {
            pattern,
            frames: Vec::new(),
            subtree: None,
            held: Vec::new(),
            holding: vec![false; slots],
            satisfied: vec![false; slots],
            dead: None,
        };
        state.reset();
        state
    }

    /// Prepares for a new scan.
    pub(crate) fn reset(&mut self) {
        let mut root = Frame::default();
        if !self.pattern.steps.is_empty() {
            self.activate(&mut root.active, 0);
        }
        self.frames.clear();
        self.frames.push(root);
        self.subtree = None;
        self.held.clear();
        self.holding.fill(false);
        self.satisfied.fill(false);
        self.dead = None;
    }

    /// Adds `step` to `active`, along with every step a `**` chain can skip
    /// to.
    fn activate(&self, active: &mut Vec<usize>, mut step: usize) {
        while let Some(kind) = self.pattern.steps.get(step) {
            if let Err(at) = active.binary_search(&step) {
                active.insert(at, step);
            }
            if !matches!(kind, Step::Recursive { .. }) {
                break;
            }
            step += 1;
        }
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.dead.is_some()
    }

    pub(crate) fn in_subtree(&self) -> bool {
        self.subtree.is_some()
    }

    /// Ignores events until the container at `depth` closes.
    pub(crate) fn reject(&mut self, depth: usize) {
        self.dead = Some(self.dead.map_or(depth, |dead| dead.min(depth)));
        if let Some(subtree) = &mut self.subtree {
            subtree.discarded = true;
        }
    }

    /// Called once the path is `depth` containers deep after an exit.
    pub(crate) fn revive(&mut self, depth: usize) {
        if self.dead.is_some_and(|dead| dead > depth) {
            self.dead = None;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.held.clear();
        self.holding.fill(false);
    }

    /// Whether every capture has been stored at least once.
    pub(crate) fn is_satisfied(&self) -> bool {
        self.satisfied.iter().all(|&s| s)
    }

    pub(crate) fn plan_enter(&self, name: Option<&str>, root: bool) -> EnterPlan {
        let Some(parent) = self.frames.last() else {
            return EnterPlan::default();
        };

        if root {
            return if self.pattern.root_capture {
                EnterPlan {
                    subtree: Some(0),
                    ..EnterPlan::default()
                }
            } else {
                EnterPlan {
                    frame: Frame {
                        active: parent.active.clone(),
                        process: false,
                    },
                    ..EnterPlan::default()
                }
            };
        }

        let mut plan = EnterPlan::default();
        let mut carried = false;
        for &index in &parent.active {
            match &self.pattern.steps[index] {
                Step::Recursive { process } => {
                    self.activate(&mut plan.frame.active, index);
                    if *process {
                        plan.emit = true;
                        plan.frame.process = true;
                    }
                }
                Step::Matches(matches) => {
                    match matches.iter().find(|m| m.selector.accepts(name)) {
                        Some(m) => match m.slot {
                            Some(slot) if m.flags.keys => {
                                plan.keys.push(slot);
                                self.activate(&mut plan.frame.active, index + 1);
                            }
                            Some(slot) => {
                                plan.subtree.get_or_insert(slot);
                            }
                            None => {
                                self.activate(&mut plan.frame.active, index + 1);
                                if m.flags.process {
                                    plan.emit = true;
                                    plan.frame.process = true;
                                }
                            }
                        },
                        // Array elements are transparent to named steps.
                        None if name.is_none() => {
                            self.activate(&mut plan.frame.active, index);
                            carried = true;
                        }
                        None => {}
                    }
                }
            }
        }
        if carried {
            plan.frame.process |= parent.process;
        }
        plan
    }

    /// Finishes entering a container once pending captures are delivered.
    pub(crate) fn open(&mut self, plan: EnterPlan, name: Option<&str>, kind: ContainerKind) {
        if self.is_dead() {
            self.frames.push(Frame::default());
            return;
        }
        match plan.subtree {
            Some(slot) => {
                self.subtree = Some(Subtree {
                    slot,
                    name: name.map(ToString::to_string),
                    stack: vec![(name.map(ToString::to_string), empty(kind))],
                    discarded: false,
                });
            }
            None => self.frames.push(plan.frame),
        }
    }

    /// Enters a container that is part of a subtree being copied.
    pub(crate) fn subtree_enter(&mut self, name: Option<&str>, kind: ContainerKind) {
        if let Some(subtree) = &mut self.subtree {
            subtree.stack.push((name.map(ToString::to_string), empty(kind)));
        }
    }

    pub(crate) fn subtree_value(&mut self, name: Option<&str>, value: Value) {
        if let Some(subtree) = &mut self.subtree {
            subtree.append(name.map(ToString::to_string), value);
        }
    }

    /// Closes a container of the subtree. Returns the slot, name and value
    /// once the captured container itself closes, unless it was discarded.
    pub(crate) fn subtree_exit(&mut self) -> Option<(usize, Option<String>, Value)> {
        let subtree = self.subtree.as_mut()?;
        let (name, value) = subtree.stack.pop()?;
        if !subtree.stack.is_empty() {
            subtree.append(name, value);
            return None;
        }
        let subtree = self.subtree.take()?;
        if subtree.discarded {
            return None;
        }
        Some((subtree.slot, subtree.name, value))
    }

    pub(crate) fn enter_dead(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Slots that capture a scalar with this name, in step order.
    pub(crate) fn leaf_slots(&self, name: Option<&str>, root: bool) -> Vec<usize> {
        if self.pattern.root_capture {
            return if root { vec![0] } else { Vec::new() };
        }
        let Some(frame) = self.frames.last() else {
            return Vec::new();
        };
        frame
            .active
            .iter()
            .filter_map(|&index| match &self.pattern.steps[index] {
                Step::Matches(matches) => matches
                    .iter()
                    .find(|m| m.selector.accepts(name))
                    .and_then(|m| m.slot),
                Step::Recursive { .. } => None,
            })
            .collect()
    }

    pub(crate) fn is_keys_slot(&self, slot: usize) -> bool {
        self.pattern.captures[slot].keys
    }

    /// Stores a captured value. Returns whether it must be delivered now.
    pub(crate) fn store(&mut self, slot: usize, name: Option<&str>, value: Value) -> bool {
        let spec = &self.pattern.captures[slot];
        if spec.array {
            match self.held.iter_mut().find(|h| h.array && h.key == spec.key) {
                Some(Held {
                    value: Value::Array(items),
                    ..
                }) => items.push(value),
                _ => self.held.push(Held {
                    slot,
                    key: spec.key.clone(),
                    name: Some(spec.key.clone()),
                    array: true,
                    value: Value::Array(vec![value]),
                }),
            }
        } else {
            if self.pattern.is_stoppable() && self.holding[slot] {
                return false;
            }
            let key = if spec.keys {
                String::new()
            } else {
                name.unwrap_or_default().to_string()
            };
            let name = name.map(ToString::to_string);
            match self.held.iter_mut().find(|h| !h.array && h.key == key) {
                Some(held) => {
                    held.slot = slot;
                    held.name = name;
                    held.value = value;
                }
                None => self.held.push(Held {
                    slot,
                    key,
                    name,
                    array: false,
                    value,
                }),
            }
        }
        self.holding[slot] = true;
        self.satisfied[slot] = true;
        spec.process
    }

    /// Whether pending captures are delivered as the current container
    /// closes.
    pub(crate) fn delivers_on_exit(&self) -> bool {
        !self.is_dead() && self.frames.last().is_some_and(|f| f.process)
    }

    pub(crate) fn exit(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Takes the pending captures as one delivery.
    pub(crate) fn take_delivery(&mut self) -> Option<Capture> {
        if self.held.is_empty() {
            return None;
        }
        self.holding.fill(false);
        let single = self.held.len() == 1 && self.pattern.captures[self.held[0].slot].single;
        if single {
            let held = self.held.pop()?;
            return Some(Capture::new(held.name, held.value));
        }
        let map = self.held.drain(..).map(|h| (h.key, h.value)).collect();
        Some(Capture::new(None, Value::Object(map)))
    }
}
