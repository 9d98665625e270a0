use kestrel_executor::behavior::{Machine, StateId, Transition};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// The context is a bit mask: transition `i` fires when bit `i` is set.
fn random_machine(rng: &mut StdRng, deterministic: bool) -> (Machine<(), u64>, Vec<(StateId, StateId)>) {
    let mut machine = Machine::new(deterministic).with_seed(rng.gen());
    let states = rng.gen_range(1..6);
    for i in 0..states {
        machine.add_state(format!("s{}", i), None);
    }
    let mut edges = Vec::new();
    for bit in 0..rng.gen_range(0..12) {
        let from = rng.gen_range(0..states);
        let to = rng.gen_range(0..states);
        machine.add_transition(
            Transition::new(from, to)
                .when(move |mask: &u64| mask & (1 << bit) != 0)
                .with_probability(rng.gen_range(0.1..2.0)),
        );
        edges.push((from, to));
    }
    (machine, edges)
}

#[test]
fn at_most_one_valid_transition_per_execute() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        let deterministic = rng.gen();
        let (mut machine, edges) = random_machine(&mut rng, deterministic);
        for _ in 0..20 {
            let before = machine.current().unwrap();
            let mask: u64 = rng.gen_range(0..4096);
            let result = machine.execute(&mask);
            let after = machine.current().unwrap();

            let allowed: Vec<StateId> = edges
                .iter()
                .enumerate()
                .filter(|(bit, (from, _))| *from == before && mask & (1 << bit) != 0)
                .map(|(_, (_, to))| *to)
                .collect();
            match result {
                Some(next) => {
                    assert_eq!(next, after);
                    assert!(allowed.contains(&next));
                    if deterministic {
                        assert_eq!(next, allowed[0]);
                    }
                }
                None => {
                    assert_eq!(before, after);
                    assert!(allowed.is_empty());
                }
            }
        }
    }
}

#[test]
fn deterministic_tie_break_is_declaration_order() {
    for _ in 0..50 {
        let mut machine: Machine<(), ()> = Machine::new(true);
        let a = machine.add_state("a", None);
        let b = machine.add_state("b", None);
        let c = machine.add_state("c", None);
        machine.add_transition(Transition::new(a, c).always());
        machine.add_transition(Transition::new(a, b).always());
        assert_eq!(machine.execute(&()), Some(c));
    }
}

#[test]
fn weighted_draw_follows_probabilities() {
    let mut machine: Machine<(), ()> = Machine::new(false).with_seed(99);
    let a = machine.add_state("a", None);
    let b = machine.add_state("b", None);
    let c = machine.add_state("c", None);
    machine.add_transition(Transition::new(a, b).always().with_probability(1.0));
    machine.add_transition(Transition::new(a, c).always().with_probability(3.0));
    machine.add_transition(Transition::new(b, a).always());
    machine.add_transition(Transition::new(c, a).always());

    let mut to_c = 0;
    let trials = 4000;
    for _ in 0..trials {
        machine.set_initial(a);
        if machine.execute(&()) == Some(c) {
            to_c += 1;
        }
    }
    let share = to_c as f64 / trials as f64;
    assert!((share - 0.75).abs() < 0.05, "share {}", share);
}

#[test]
fn same_seed_same_walk() {
    let walk = |seed| {
        let mut machine: Machine<(), ()> = Machine::new(false).with_seed(seed);
        let a = machine.add_state("a", None);
        let b = machine.add_state("b", None);
        machine.add_transition(Transition::new(a, a).always());
        machine.add_transition(Transition::new(a, b).always());
        machine.add_transition(Transition::new(b, a).always());
        (0..50)
            .map(|_| machine.execute(&()).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(walk(5), walk(5));
}
