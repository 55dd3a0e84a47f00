//! Thompson construction of a nondeterministic finite automaton.
//!
//! States live in one arena owned by the [`Nfa`]; transitions refer to
//! states by index, so the cyclic graphs produced by `*` and `+` need no
//! shared ownership. During construction, out-edges that do not yet have a
//! destination are tracked as `(state, slot)` pairs on a [`Partial`] and
//! patched in once the destination exists.

use crate::alphabet::Alphabet;
use crate::regex::Node;
use crate::utf8::Glyph;

/// What a transition consumes. `Negative` stands for any glyph outside the
/// alphabet and is how wildcards reach glyphs no pattern names. The derived
/// order (epsilon, negative, cells ascending) is what the DFA's transition
/// merge relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Epsilon,
    Negative,
    Cell(u32),
}

pub type StateId = usize;

#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub label: Label,
    /// `None` while dangling during construction.
    pub to: Option<StateId>,
}

#[derive(Debug)]
pub struct State {
    pub transitions: Vec<Transition>,
    /// Pattern index for accepting states.
    pub token: Option<usize>,
}

impl State {
    fn new() -> Self {
        State {
            transitions: Vec::new(),
            token: None,
        }
    }
}

/// A sub-machine under construction: an entry state plus the dangling
/// transitions reachable from it.
struct Partial {
    head: StateId,
    dangling: Vec<(StateId, usize)>,
}

impl Partial {
    fn single(head: StateId, slots: usize) -> Self {
        Partial {
            head,
            dangling: (0..slots).map(|slot| (head, slot)).collect(),
        }
    }
}

pub struct Nfa {
    states: Vec<State>,
    start: StateId,
}

impl Nfa {
    /// Build one machine covering every pattern: each pattern's sub-NFA is
    /// terminated in an accepting state carrying its index, and the shared
    /// start state gets an epsilon transition to each sub-NFA's head.
    pub fn new(alphabet: &Alphabet, exprs: &[Node]) -> Self {
        let mut builder = Builder {
            states: Vec::new(),
            alphabet,
        };

        let start = builder.state();
        for (token, expr) in exprs.iter().enumerate() {
            let partial = builder.build(expr);
            let accept = builder.state();
            builder.states[accept].token = Some(token);
            builder.chain(&partial.dangling, accept);
            builder.transition(start, Label::Epsilon, Some(partial.head));
        }

        log::debug!(
            "nfa: {} states for {} patterns over {} alphabet cells",
            builder.states.len(),
            exprs.len(),
            alphabet.len()
        );

        Nfa {
            states: builder.states,
            start,
        }
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

struct Builder<'a> {
    states: Vec<State>,
    alphabet: &'a Alphabet,
}

impl Builder<'_> {
    fn state(&mut self) -> StateId {
        self.states.push(State::new());
        self.states.len() - 1
    }

    /// Append a transition and return its slot index.
    fn transition(&mut self, from: StateId, label: Label, to: Option<StateId>) -> usize {
        let transitions = &mut self.states[from].transitions;
        transitions.push(Transition { label, to });
        transitions.len() - 1
    }

    /// Point every dangling slot at `to`.
    fn chain(&mut self, dangling: &[(StateId, usize)], to: StateId) {
        for &(state, slot) in dangling {
            self.states[state].transitions[slot].to = Some(to);
        }
    }

    fn build(&mut self, expr: &Node) -> Partial {
        match expr {
            Node::Literal(g) => self.build_range(*g, *g),
            Node::Range(lo, hi) => self.build_range(*lo, *hi),
            Node::Wildcard => {
                // One dangling transition per alphabet cell, plus the
                // negative transition for everything outside the alphabet.
                let s = self.state();
                self.transition(s, Label::Negative, None);
                for cell in 0..self.alphabet.len() {
                    self.transition(s, Label::Cell(cell as u32), None);
                }
                Partial::single(s, self.alphabet.len() + 1)
            }
            Node::Concat(a, b) => {
                // Left's dangling edges feed right's head:
                //
                // A ──> B ──>
                let left = self.build(a);
                let right = self.build(b);
                self.chain(&left.dangling, right.head);
                Partial {
                    head: left.head,
                    dangling: right.dangling,
                }
            }
            Node::Union(a, b) => {
                // A fresh state forks into both branches:
                //
                //    ┌─ε──> A ──>
                // S ─┤
                //    └─ε──> B ──>
                let s = self.state();
                let left = self.build(a);
                let right = self.build(b);

                self.transition(s, Label::Epsilon, Some(left.head));
                self.transition(s, Label::Epsilon, Some(right.head));

                let mut dangling = left.dangling;
                dangling.extend(right.dangling);
                Partial { head: s, dangling }
            }
            Node::Maybe(a) => {
                // The fresh state either enters A or skips past it:
                //
                //    ┌─ε──> A ──>
                // S ─┤
                //    └─ε────────>
                let s = self.state();
                let left = self.build(a);

                self.transition(s, Label::Epsilon, Some(left.head));
                let skip = self.transition(s, Label::Epsilon, None);

                let mut dangling = left.dangling;
                dangling.push((s, skip));
                Partial { head: s, dangling }
            }
            Node::ZeroPlus(a) => {
                // A loops back through the fresh state, which can also exit
                // immediately:
                //
                //    ┌─ε──────> A
                // S ─┤<───────ε─┘
                //    └─ε────────>
                let s = self.state();
                let left = self.build(a);

                self.chain(&left.dangling, s);
                self.transition(s, Label::Epsilon, Some(left.head));
                let exit = self.transition(s, Label::Epsilon, None);

                Partial {
                    head: s,
                    dangling: vec![(s, exit)],
                }
            }
            Node::OnePlus(a) => {
                // Same loop, but entry goes through A so the pattern is
                // required at least once:
                //
                // ┌─ε─────> S ──>
                // A <─────ε─┘
                let s = self.state();
                let left = self.build(a);

                self.chain(&left.dangling, s);
                self.transition(s, Label::Epsilon, Some(left.head));
                let exit = self.transition(s, Label::Epsilon, None);

                Partial {
                    head: left.head,
                    dangling: vec![(s, exit)],
                }
            }
        }
    }

    /// One dangling transition per alphabet cell covering the range. A
    /// reversed range was dropped at buffer time and yields a state with no
    /// way out, so the branch can never reach an accepting state.
    fn build_range(&mut self, lo: Glyph, hi: Glyph) -> Partial {
        let s = self.state();
        if lo > hi {
            return Partial::single(s, 0);
        }

        let idx = self.alphabet.map(lo, hi);
        for cell in idx.start..idx.start + idx.len {
            self.transition(s, Label::Cell(cell as u32), None);
        }
        Partial::single(s, idx.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Buffer;
    use crate::regex;

    fn build(patterns: &[&str]) -> Nfa {
        let exprs: Vec<Node> = patterns.iter().map(|p| regex::parse(p).unwrap()).collect();
        let mut buf = Buffer::new();
        for expr in &exprs {
            buf.collect(expr);
        }
        Nfa::new(&Alphabet::new(&buf), &exprs)
    }

    fn labels(nfa: &Nfa, id: StateId) -> Vec<Label> {
        nfa.state(id).transitions.iter().map(|t| t.label).collect()
    }

    fn target(nfa: &Nfa, id: StateId, slot: usize) -> StateId {
        nfa.state(id).transitions[slot].to.expect("dangling transition")
    }

    #[test]
    fn literal_chain_builds_one_state_per_glyph() {
        let nfa = build(&["abc"]);
        assert_eq!(nfa.len(), 5);

        let mut s = nfa.start();
        assert_eq!(labels(&nfa, s), vec![Label::Epsilon]);

        for cell in 0..3 {
            s = target(&nfa, s, 0);
            assert_eq!(labels(&nfa, s), vec![Label::Cell(cell)]);
            assert_eq!(nfa.state(s).token, None);
        }

        s = target(&nfa, s, 0);
        assert!(labels(&nfa, s).is_empty());
        assert_eq!(nfa.state(s).token, Some(0));
    }

    #[test]
    fn zero_plus_loops_back() {
        let nfa = build(&["ab*"]);
        assert_eq!(nfa.len(), 5);

        let s = target(&nfa, nfa.start(), 0);
        assert_eq!(labels(&nfa, s), vec![Label::Cell(0)]);

        let loop_state = target(&nfa, s, 0);
        assert_eq!(labels(&nfa, loop_state), vec![Label::Epsilon, Label::Epsilon]);

        let body = target(&nfa, loop_state, 0);
        let exit = target(&nfa, loop_state, 1);

        assert_eq!(labels(&nfa, body), vec![Label::Cell(1)]);
        assert_eq!(target(&nfa, body, 0), loop_state);

        assert!(labels(&nfa, exit).is_empty());
        assert_eq!(nfa.state(exit).token, Some(0));
    }

    #[test]
    fn one_plus_requires_the_body_once() {
        let nfa = build(&["a+"]);

        let body = target(&nfa, nfa.start(), 0);
        assert_eq!(labels(&nfa, body), vec![Label::Cell(0)]);

        let loop_state = target(&nfa, body, 0);
        assert_eq!(labels(&nfa, loop_state), vec![Label::Epsilon, Label::Epsilon]);
        assert_eq!(target(&nfa, loop_state, 0), body);

        let accept = target(&nfa, loop_state, 1);
        assert_eq!(nfa.state(accept).token, Some(0));
    }

    #[test]
    fn wildcard_covers_all_cells_and_negative() {
        let nfa = build(&["a", "."]);
        let wild_head = target(&nfa, nfa.start(), 1);
        assert_eq!(labels(&nfa, wild_head), vec![Label::Negative, Label::Cell(0)]);
    }

    #[test]
    fn start_state_has_one_epsilon_per_pattern() {
        let nfa = build(&["ab", "cd", "[0-9]+"]);
        let start = nfa.state(nfa.start());
        assert_eq!(start.transitions.len(), 3);
        assert!(start.transitions.iter().all(|t| t.label == Label::Epsilon));
    }

    #[test]
    fn accepting_states_carry_pattern_order_and_no_exits() {
        let nfa = build(&["x", "y", "z"]);
        let mut seen = Vec::new();
        for id in 0..nfa.len() {
            if let Some(token) = nfa.state(id).token {
                assert!(nfa.state(id).transitions.is_empty());
                seen.push(token);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn range_spanning_cells_fans_out() {
        // 'b' splits [a-z] into three cells; the range state needs one
        // transition per cell.
        let nfa = build(&["b", "[a-z]"]);
        let range_head = target(&nfa, nfa.start(), 1);
        assert_eq!(
            labels(&nfa, range_head),
            vec![Label::Cell(0), Label::Cell(1), Label::Cell(2)]
        );
    }

    #[test]
    fn no_dangling_transitions_survive_construction() {
        let nfa = build(&["(ab(c|x(de|[fg])|h))+[i-k]", "a?b+c*"]);
        for id in 0..nfa.len() {
            for t in &nfa.state(id).transitions {
                assert!(t.to.is_some());
            }
        }
    }

    #[test]
    fn reversed_range_yields_unreachable_accept() {
        let nfa = build(&["[z-a]"]);
        // The accept state exists but nothing points at it.
        let accept: Vec<StateId> = (0..nfa.len())
            .filter(|&id| nfa.state(id).token.is_some())
            .collect();
        assert_eq!(accept.len(), 1);
        for id in 0..nfa.len() {
            for t in &nfa.state(id).transitions {
                assert_ne!(t.to, Some(accept[0]));
            }
        }
    }
}
