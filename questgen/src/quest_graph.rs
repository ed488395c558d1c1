//! Quest graph - a read-only view over the facts of one quest.
//!
//! States are nodes, jumps and options are edges. The view never owns
//! facts; it indexes a slice produced by a quest template.

use std::collections::{BTreeMap, HashSet};

use crate::knowledge_base::{names, Fact};

/// A structural defect of a quest graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphViolation {
    #[error("expected exactly one start state, found {0}")]
    StartCount(usize),

    #[error("quest has no finish state")]
    NoFinish,

    #[error("edge {edge} refers to unknown state {state}")]
    DanglingEdge { edge: String, state: String },

    #[error("choice {choice} has no outgoing option")]
    ChoiceWithoutOption { choice: String },

    #[error("finish {finish} has outgoing edges")]
    FinishWithEdges { finish: String },

    #[error("options link {link} refers to unknown option {option}")]
    DanglingOptionLink { link: String, option: String },

    #[error("uid {0} is used by more than one fact")]
    DuplicateUid(String),
}

/// Index over the states, edges and option links of a fact set.
#[derive(Debug, Clone)]
pub struct QuestGraph<'a> {
    states: BTreeMap<&'a str, &'a Fact>,
    edges: Vec<&'a Fact>,
    links: Vec<&'a Fact>,
    duplicates: Vec<&'a str>,
}

impl<'a> QuestGraph<'a> {
    pub fn new(facts: &'a [Fact]) -> Self {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        let mut states = BTreeMap::new();
        let mut edges = Vec::new();
        let mut links = Vec::new();

        for fact in facts {
            if !seen.insert(fact.uid()) {
                duplicates.push(fact.uid());
            }

            if fact.is_a(names::STATE) {
                states.insert(fact.uid(), fact);
            } else if fact.is_a(names::JUMP) {
                edges.push(fact);
            } else if fact.is_a(names::OPTIONS_LINK) {
                links.push(fact);
            }
        }

        Self {
            states,
            edges,
            links,
            duplicates,
        }
    }

    pub fn state(&self, uid: &str) -> Option<&'a Fact> {
        self.states.get(uid).copied()
    }

    /// States ordered by uid.
    pub fn states(&self) -> impl Iterator<Item = &'a Fact> + '_ {
        self.states.values().copied()
    }

    fn states_of(&self, variant: &str) -> Vec<&'a Fact> {
        self.states().filter(|s| s.is_a(variant)).collect()
    }

    /// The entry state, if there is exactly one.
    pub fn start(&self) -> Option<&'a Fact> {
        match self.states_of(names::START).as_slice() {
            [start] => Some(*start),
            _ => None,
        }
    }

    pub fn finishes(&self) -> Vec<&'a Fact> {
        self.states_of(names::FINISH)
    }

    pub fn choices(&self) -> Vec<&'a Fact> {
        self.states_of(names::CHOICE)
    }

    pub fn edges(&self) -> &[&'a Fact] {
        &self.edges
    }

    pub fn options_links(&self) -> &[&'a Fact] {
        &self.links
    }

    /// Edges leaving `uid`, in emission order.
    pub fn outgoing(&self, uid: &str) -> Vec<&'a Fact> {
        self.edges
            .iter()
            .copied()
            .filter(|edge| edge.text("state_from") == Some(uid))
            .collect()
    }

    /// Edges entering `uid`, in emission order.
    pub fn incoming(&self, uid: &str) -> Vec<&'a Fact> {
        self.edges
            .iter()
            .copied()
            .filter(|edge| edge.text("state_to") == Some(uid))
            .collect()
    }

    /// Every structural defect. Empty for a well-formed quest.
    pub fn validate(&self) -> Vec<GraphViolation> {
        let mut violations: Vec<GraphViolation> = self
            .duplicates
            .iter()
            .map(|uid| GraphViolation::DuplicateUid(uid.to_string()))
            .collect();

        let starts = self.states_of(names::START).len();
        if starts != 1 {
            violations.push(GraphViolation::StartCount(starts));
        }
        if self.finishes().is_empty() {
            violations.push(GraphViolation::NoFinish);
        }

        for edge in &self.edges {
            for end in ["state_from", "state_to"] {
                let state = edge.text(end).unwrap_or_default();
                if self.state(state).is_none() {
                    violations.push(GraphViolation::DanglingEdge {
                        edge: edge.uid().to_string(),
                        state: state.to_string(),
                    });
                }
            }
        }

        for choice in self.choices() {
            let has_option = self
                .outgoing(choice.uid())
                .iter()
                .any(|edge| edge.is_a(names::OPTION));
            if !has_option {
                violations.push(GraphViolation::ChoiceWithoutOption {
                    choice: choice.uid().to_string(),
                });
            }
        }

        for finish in self.finishes() {
            if !self.outgoing(finish.uid()).is_empty() {
                violations.push(GraphViolation::FinishWithEdges {
                    finish: finish.uid().to_string(),
                });
            }
        }

        let options: HashSet<&str> = self
            .edges
            .iter()
            .filter(|edge| edge.is_a(names::OPTION))
            .map(|edge| edge.uid())
            .collect();
        for link in &self.links {
            for option in link.strings("options") {
                if !options.contains(option) {
                    violations.push(GraphViolation::DanglingOptionLink {
                        link: link.uid().to_string(),
                        option: option.to_string(),
                    });
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::{catalog, Registry};

    fn state(variant: &str, uid: &str) -> Fact {
        let mut draft = Registry::standard().draft(variant).unwrap().with("uid", uid);
        if variant == names::START {
            draft = draft.with("quest_type", "test");
        }
        draft.build().unwrap()
    }

    fn small_quest() -> Vec<Fact> {
        let option = catalog::option("c", "f").unwrap();
        vec![
            state(names::START, "s"),
            state(names::CHOICE, "c"),
            state(names::FINISH, "f"),
            catalog::jump("s", "c").unwrap(),
            catalog::options_link(&[option.uid()]).unwrap(),
            option,
        ]
    }

    #[test]
    fn test_valid_graph() {
        let facts = small_quest();
        let graph = QuestGraph::new(&facts);

        assert_eq!(graph.validate(), Vec::<GraphViolation>::new());
        assert_eq!(graph.start().unwrap().uid(), "s");
        assert_eq!(graph.finishes().len(), 1);
        assert_eq!(graph.outgoing("c").len(), 1);
        assert_eq!(graph.incoming("c")[0].uid(), "#jump<s, c>");
        assert_eq!(graph.options_links().len(), 1);
    }

    #[test]
    fn test_dangling_edge() {
        let mut facts = small_quest();
        facts.push(catalog::jump("c", "elsewhere").unwrap());

        let violations = QuestGraph::new(&facts).validate();
        assert_eq!(
            violations,
            vec![GraphViolation::DanglingEdge {
                edge: "#jump<c, elsewhere>".into(),
                state: "elsewhere".into(),
            }]
        );
    }

    #[test]
    fn test_choice_without_option() {
        let facts = vec![
            state(names::START, "s"),
            state(names::CHOICE, "c"),
            state(names::FINISH, "f"),
            catalog::jump("s", "c").unwrap(),
            catalog::jump("c", "f").unwrap(),
        ];

        let violations = QuestGraph::new(&facts).validate();
        assert_eq!(
            violations,
            vec![GraphViolation::ChoiceWithoutOption { choice: "c".into() }]
        );
    }

    #[test]
    fn test_finish_with_edges_and_missing_start() {
        let facts = vec![
            state(names::FINISH, "f"),
            state(names::STATE, "x"),
            catalog::jump("f", "x").unwrap(),
        ];

        let violations = QuestGraph::new(&facts).validate();
        assert!(violations.contains(&GraphViolation::StartCount(0)));
        assert!(violations.contains(&GraphViolation::FinishWithEdges { finish: "f".into() }));
    }

    #[test]
    fn test_no_finish() {
        let facts = vec![state(names::START, "s")];
        let violations = QuestGraph::new(&facts).validate();
        assert_eq!(violations, vec![GraphViolation::NoFinish]);
    }

    #[test]
    fn test_dangling_options_link_and_duplicates() {
        let mut facts = small_quest();
        facts.push(catalog::options_link(&["#option<x, y>"]).unwrap());
        facts.push(state(names::FINISH, "f"));

        let violations = QuestGraph::new(&facts).validate();
        assert!(violations.contains(&GraphViolation::DuplicateUid("f".into())));
        assert!(violations.contains(&GraphViolation::DanglingOptionLink {
            link: "#options_link<#option<x, y>>".into(),
            option: "#option<x, y>".into(),
        }));
    }
}
