//! Subset construction of a deterministic automaton from an NFA.
//!
//! Each DFA state stands for the epsilon closure of a set of NFA states.
//! Subsets are interned by a bitset over NFA state numbers, so revisiting a
//! subset always yields the same DFA state. Outgoing transitions are found
//! by merging the transition lists of every member state through a min-heap
//! keyed on the transition label, grouping equal labels into one edge.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, VecDeque};

use crate::nfa::{Label, Nfa, StateId};

type Subset = BTreeSet<StateId>;

#[derive(Debug)]
pub struct State {
    /// Keyed by label; determinism is the absence of duplicate keys.
    pub transitions: BTreeMap<Label, usize>,
    /// Smallest pattern index among the accepting NFA states in the subset,
    /// so definition order breaks ambiguous matches.
    pub token: Option<usize>,
}

pub struct Dfa {
    states: Vec<State>,
    start: usize,
}

impl Dfa {
    pub fn new(nfa: &Nfa) -> Self {
        let mut builder = DfaBuilder {
            nfa,
            states: Vec::new(),
            cache: HashMap::new(),
        };

        let seed = epsilon_closure(nfa, [nfa.start()]);
        let start = builder.intern(&seed).0;

        let mut queue: VecDeque<(usize, Subset)> = VecDeque::new();
        queue.push_back((start, seed));

        while let Some((id, subset)) = queue.pop_front() {
            let mut merge = TransitionMerge::new(nfa, &subset);
            while let Some((label, targets)) = merge.next_group() {
                let closure = epsilon_closure(nfa, targets);
                let (succ, fresh) = builder.intern(&closure);
                builder.states[id].transitions.insert(label, succ);
                if fresh {
                    queue.push_back((succ, closure));
                }
            }
        }

        log::debug!(
            "dfa: {} states from {} nfa states",
            builder.states.len(),
            nfa.len()
        );

        Dfa {
            states: builder.states,
            start,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn state(&self, id: usize) -> &State {
        &self.states[id]
    }

    /// Successor on `label`, or `None` when the transition rejects.
    pub fn go(&self, id: usize, label: Label) -> Option<usize> {
        self.states[id].transitions.get(&label).copied()
    }

    /// Accepting pattern index of a state, if any.
    pub fn token(&self, id: usize) -> Option<usize> {
        self.states[id].token
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

struct DfaBuilder<'a> {
    nfa: &'a Nfa,
    states: Vec<State>,
    cache: HashMap<Vec<u64>, usize>,
}

impl DfaBuilder<'_> {
    /// DFA state for a subset, creating it on first sight. The second
    /// element reports whether the state is new.
    fn intern(&mut self, subset: &Subset) -> (usize, bool) {
        let key = membership_key(self.nfa.len(), subset);

        if let Some(&id) = self.cache.get(&key) {
            return (id, false);
        }

        let token = subset
            .iter()
            .filter_map(|&s| self.nfa.state(s).token)
            .min();

        let id = self.states.len();
        self.states.push(State {
            transitions: BTreeMap::new(),
            token,
        });
        self.cache.insert(key, id);
        (id, true)
    }
}

/// One bit per NFA state; the key identifies the subset regardless of the
/// order states were discovered in.
fn membership_key(total_states: usize, subset: &Subset) -> Vec<u64> {
    let mut key = vec![0u64; total_states.div_ceil(64)];
    for &s in subset {
        key[s / 64] |= 1 << (s % 64);
    }
    key
}

/// Least fixed point of the seed set under epsilon transitions. Every state
/// is in its own closure.
fn epsilon_closure(nfa: &Nfa, seed: impl IntoIterator<Item = StateId>) -> Subset {
    let mut closure: Subset = BTreeSet::new();
    let mut stack: Vec<StateId> = seed.into_iter().collect();

    while let Some(s) = stack.pop() {
        if !closure.insert(s) {
            continue;
        }
        for t in &nfa.state(s).transitions {
            if t.label == Label::Epsilon {
                stack.push(t.to.expect("dangling transition in finished NFA"));
            }
        }
    }

    closure
}

/// Cursor into one NFA state's non-epsilon transitions.
#[derive(PartialEq, Eq)]
struct Cursor {
    label: Label,
    to: StateId,
    state: StateId,
    next_slot: usize,
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.label, self.state, self.next_slot).cmp(&(other.label, other.state, other.next_slot))
    }
}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// K-way merge over the member states' transition lists, yielding each
/// distinct label once together with the union of its destinations.
struct TransitionMerge<'a> {
    nfa: &'a Nfa,
    heap: BinaryHeap<Reverse<Cursor>>,
}

impl<'a> TransitionMerge<'a> {
    fn new(nfa: &'a Nfa, subset: &Subset) -> Self {
        let mut merge = TransitionMerge {
            nfa,
            heap: BinaryHeap::new(),
        };
        for &s in subset {
            merge.push_from(s, 0);
        }
        merge
    }

    /// Enqueue the first non-epsilon transition of `state` at or after
    /// `slot`.
    fn push_from(&mut self, state: StateId, slot: usize) {
        let transitions = &self.nfa.state(state).transitions;
        for (i, t) in transitions.iter().enumerate().skip(slot) {
            if t.label == Label::Epsilon {
                continue;
            }
            self.heap.push(Reverse(Cursor {
                label: t.label,
                to: t.to.expect("dangling transition in finished NFA"),
                state,
                next_slot: i + 1,
            }));
            return;
        }
    }

    fn next_group(&mut self) -> Option<(Label, Subset)> {
        let label = self.heap.peek()?.0.label;
        let mut targets: Subset = BTreeSet::new();

        while let Some(Reverse(top)) = self.heap.peek() {
            if top.label != label {
                break;
            }
            let Reverse(cursor) = self.heap.pop().expect("peeked heap is non-empty");
            targets.insert(cursor.to);
            self.push_from(cursor.state, cursor.next_slot);
        }

        Some((label, targets))
    }
}
