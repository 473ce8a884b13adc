use super::*;

const WINDOW: Duration = Duration::from_millis(10);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn count_updates(decisions: &[Decision]) -> usize {
    decisions.iter().filter(|d| **d == Decision::Update).count()
}

#[test]
fn first_change_updates_immediately() {
    let start = Instant::now();
    let mut policy = SwallowPolicy::new(5, WINDOW);
    assert_eq!(policy.state(), SwallowState::Idle);
    assert_eq!(policy.deadline(), None);

    assert_eq!(policy.on_change(start), Decision::Update);
    assert_eq!(policy.deadline(), Some(start + WINDOW));
    assert_eq!(policy.counter(), 0);
}

#[test]
fn three_changes_with_limit_two_update_twice() {
    let start = Instant::now();
    let mut policy = SwallowPolicy::new(2, WINDOW);

    let decisions: Vec<Decision> = (0..3)
        .map(|i| policy.on_change(start + ms(i)))
        .collect();
    assert_eq!(
        decisions,
        vec![Decision::Update, Decision::Suppress, Decision::Update]
    );

    // The flush left nothing pending, so the window closes quietly.
    assert_eq!(policy.on_timeout(start + ms(2) + WINDOW), Decision::Suppress);
    assert_eq!(policy.state(), SwallowState::Idle);
}

#[test]
fn burst_of_limit_plus_two_updates_twice_then_defers_once() {
    let limit = 5;
    let start = Instant::now();
    let mut policy = SwallowPolicy::new(limit, WINDOW);

    let decisions: Vec<Decision> = (0..(limit as u64 + 2))
        .map(|i| policy.on_change(start + ms(i)))
        .collect();

    assert_eq!(count_updates(&decisions), 2);
    assert_eq!(decisions[0], Decision::Update);
    assert_eq!(decisions[limit], Decision::Update);
    assert_eq!(decisions[limit + 1], Decision::Suppress);

    let last = start + ms(limit as u64 + 1);
    assert_eq!(policy.on_timeout(last + ms(5)), Decision::Suppress, "window still open");
    assert_eq!(policy.on_timeout(last + WINDOW), Decision::Update);
    assert_eq!(policy.on_timeout(last + WINDOW + ms(1)), Decision::Suppress);
    assert_eq!(policy.state(), SwallowState::Idle);
}

#[test]
fn window_is_measured_from_the_latest_change() {
    let start = Instant::now();
    let mut policy = SwallowPolicy::new(100, WINDOW);

    assert_eq!(policy.on_change(start), Decision::Update);
    // Each change lands 8ms after the previous one, always inside the window.
    for i in 1..=10 {
        assert_eq!(policy.on_change(start + ms(8 * i)), Decision::Suppress);
    }
    assert_eq!(policy.deadline(), Some(start + ms(80) + WINDOW));
}

#[test]
fn force_change_updates_and_resets_counter() {
    let start = Instant::now();
    let mut policy = SwallowPolicy::new(5, WINDOW);

    policy.on_change(start);
    policy.on_change(start + ms(1));
    policy.on_change(start + ms(2));
    assert_eq!(policy.counter(), 2);

    assert_eq!(policy.on_force_change(start + ms(3)), Decision::Update);
    assert_eq!(policy.counter(), 0);
    assert_eq!(
        policy.state(),
        SwallowState::Cooling {
            counter: 0,
            pending: false,
            deadline: start + ms(3) + WINDOW,
        }
    );
}

#[test]
fn force_change_updates_from_idle() {
    let mut policy = SwallowPolicy::new(5, WINDOW);
    assert_eq!(policy.on_force_change(Instant::now()), Decision::Update);
}

#[test]
fn change_after_lapsed_window_updates_again() {
    let start = Instant::now();
    let mut policy = SwallowPolicy::new(5, WINDOW);

    policy.on_change(start);
    policy.on_change(start + ms(1));
    // Timeout never observed, but the next change arrives well after the window.
    assert_eq!(policy.on_change(start + ms(50)), Decision::Update);
    assert_eq!(policy.counter(), 0);
}

#[test]
fn zero_limit_disables_swallowing() {
    let start = Instant::now();
    let mut policy = SwallowPolicy::new(0, WINDOW);
    let decisions: Vec<Decision> = (0..4)
        .map(|i| policy.on_change(start + ms(i)))
        .collect();
    assert_eq!(count_updates(&decisions), 4);
}
