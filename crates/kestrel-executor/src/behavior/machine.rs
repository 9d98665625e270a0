use rand::{rngs::StdRng, Rng, SeedableRng};

/// Index of a state within its machine.
pub type StateId = usize;

/// A named node of a [`Machine`], optionally carrying the behavior to run
/// while the machine is in it.
pub struct State<S> {
    pub name: String,
    pub behavior: Option<S>,
}

impl<S> State<S> {
    pub fn new(name: impl Into<String>, behavior: Option<S>) -> Self {
        Self {
            name: name.into(),
            behavior,
        }
    }
}

type Condition<C> = Box<dyn Fn(&C) -> bool + Send>;

/// An edge between two states. A transition without a condition never fires.
pub struct Transition<C> {
    pub from: StateId,
    pub to: StateId,
    /// Relative weight used by non-deterministic machines
    pub probability: f64,
    condition: Option<Condition<C>>,
}

impl<C> Transition<C> {
    pub fn new(from: StateId, to: StateId) -> Self {
        Self {
            from,
            to,
            probability: 1.0,
            condition: None,
        }
    }

    pub fn when(mut self, condition: impl Fn(&C) -> bool + Send + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Shorthand for a condition that is always true.
    pub fn always(self) -> Self {
        self.when(|_| true)
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    pub fn fires(&self, context: &C) -> bool {
        self.condition.as_ref().map_or(false, |condition| condition(context))
    }

    /// The weight used in a random draw; zero unless the probability is
    /// finite and positive.
    fn weight(&self) -> f64 {
        if self.probability.is_finite() && self.probability > 0.0 {
            self.probability
        } else {
            0.0
        }
    }
}

/// A finite state machine whose transition conditions read a context `C`.
///
/// Deterministic machines take the first firing transition in declaration
/// order. Non-deterministic ones draw among the firing transitions, weighted
/// by their `probability`; transitions with a non-positive or non-finite
/// weight are never drawn.
pub struct Machine<S, C> {
    states: Vec<State<S>>,
    transitions: Vec<Transition<C>>,
    current: Option<StateId>,
    deterministic: bool,
    rng: StdRng,
}

impl<S, C> Machine<S, C> {
    pub fn new(deterministic: bool) -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
            current: None,
            deterministic,
            rng: StdRng::from_entropy(),
        }
    }

    /// Make the random draws reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Add a state. The first state added becomes the initial one.
    pub fn add_state(&mut self, name: impl Into<String>, behavior: Option<S>) -> StateId {
        self.states.push(State::new(name, behavior));
        let id = self.states.len() - 1;
        if self.current.is_none() {
            self.current = Some(id);
        }
        id
    }

    /// # Panics
    ///
    /// Panics if either end of the transition is not a state of this machine.
    pub fn add_transition(&mut self, transition: Transition<C>) {
        assert!(
            transition.from < self.states.len() && transition.to < self.states.len(),
            "Transition {} -> {} refers to a missing state",
            transition.from,
            transition.to
        );
        self.transitions.push(transition);
    }

    /// # Panics
    ///
    /// Panics if `id` is not a state of this machine.
    pub fn set_initial(&mut self, id: StateId) {
        assert!(id < self.states.len(), "No state with id {}", id);
        self.current = Some(id);
    }

    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    pub fn current_state(&self) -> Option<&State<S>> {
        self.current.and_then(|id| self.states.get(id))
    }

    pub fn current_state_mut(&mut self) -> Option<&mut State<S>> {
        self.current.and_then(|id| self.states.get_mut(id))
    }

    pub fn state(&self, id: StateId) -> Option<&State<S>> {
        self.states.get(id)
    }

    pub fn states(&self) -> &[State<S>] {
        &self.states
    }

    /// Take at most one transition out of the current state. Returns the new
    /// state if a transition was taken.
    pub fn execute(&mut self, context: &C) -> Option<StateId> {
        let current = self.current?;
        let candidates: Vec<&Transition<C>> = self
            .transitions
            .iter()
            .filter(|t| t.from == current && t.fires(context))
            .collect();

        let next = if self.deterministic {
            candidates.first().map(|t| t.to)?
        } else {
            let total: f64 = candidates.iter().map(|t| t.weight()).sum();
            if total <= 0.0 {
                return None;
            }
            let draw = self.rng.gen_range(0.0..total);
            let mut cumulative = 0.0;
            let mut chosen = None;
            for t in candidates.iter().filter(|t| t.weight() > 0.0) {
                cumulative += t.weight();
                chosen = Some(t.to);
                if draw < cumulative {
                    break;
                }
            }
            chosen?
        };

        log::trace!(
            "Transition {} -> {}",
            self.states[current].name,
            self.states[next].name
        );
        self.current = Some(next);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(deterministic: bool) -> Machine<(), i32> {
        let mut m = Machine::new(deterministic).with_seed(7);
        m.add_state("a", None);
        m.add_state("b", None);
        m.add_state("c", None);
        m
    }

    #[test]
    fn first_state_is_initial() {
        let m = chain(true);
        assert_eq!(m.current(), Some(0));
        assert_eq!(m.current_state().map(|s| s.name.as_str()), Some("a"));
    }

    #[test]
    fn no_condition_never_fires() {
        let mut m = chain(true);
        m.add_transition(Transition::new(0, 1));
        assert_eq!(m.execute(&0), None);
        assert_eq!(m.current(), Some(0));
    }

    #[test]
    fn one_step_per_execute() {
        let mut m = chain(true);
        m.add_transition(Transition::new(0, 1).always());
        m.add_transition(Transition::new(1, 2).always());
        assert_eq!(m.execute(&0), Some(1));
        assert_eq!(m.execute(&0), Some(2));
        assert_eq!(m.execute(&0), None);
    }

    #[test]
    fn conditions_read_context() {
        let mut m = chain(true);
        m.add_transition(Transition::new(0, 2).when(|x: &i32| *x > 3));
        assert_eq!(m.execute(&1), None);
        assert_eq!(m.execute(&4), Some(2));
    }

    #[test]
    fn zero_weights_never_drawn() {
        let mut m = chain(false);
        m.add_transition(Transition::new(0, 1).always().with_probability(0.0));
        assert_eq!(m.execute(&0), None);
        m.add_transition(Transition::new(0, 2).always().with_probability(0.5));
        assert_eq!(m.execute(&0), Some(2));
    }

    #[test]
    fn non_finite_weights_never_drawn() {
        let mut m = chain(false);
        m.add_transition(Transition::new(0, 1).always().with_probability(f64::INFINITY));
        m.add_transition(Transition::new(0, 1).always().with_probability(f64::NAN));
        assert_eq!(m.execute(&0), None);
        m.add_transition(Transition::new(0, 2).always().with_probability(2.0));
        for _ in 0..20 {
            m.set_initial(0);
            assert_eq!(m.execute(&0), Some(2));
        }
    }

    #[test]
    #[should_panic]
    fn transition_to_missing_state() {
        let mut m = chain(true);
        m.add_transition(Transition::new(0, 9));
    }
}
