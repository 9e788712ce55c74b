use weft::{RuntimeBuilder, task, try_task, weave};

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn weave_succeeds_when_all_children_succeed() {
    let rt = RuntimeBuilder::new().worker_threads(4).build().unwrap();

    let sum = Rc::new(Cell::new(0));
    let result = Rc::new(Cell::new(None));
    let result_clone = result.clone();

    rt.block_on(|| {
        let children = (1..=5).map(|i| {
            let sum = sum.clone();
            task(move || i * i).on_done(move |v| sum.set(sum.get() + v))
        });

        weave(children)
            .on_complete(move |ok| result_clone.set(Some(ok)))
            .start();
    })
    .unwrap();

    assert_eq!(sum.get(), 1 + 4 + 9 + 16 + 25);
    assert_eq!(result.get(), Some(true));
}

#[test]
fn weave_fails_when_any_child_fails() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();

    let errors = Rc::new(RefCell::new(Vec::new()));
    let errors_clone = errors.clone();
    let result = Rc::new(Cell::new(None));
    let result_clone = result.clone();

    rt.block_on(|| {
        weave([
            try_task(|| Ok::<_, &str>(1)).get(),
            try_task(|| Err::<u32, _>("unreachable host"))
                .on_error(move |e| errors_clone.borrow_mut().push(e))
                .get(),
            task(|| 3).get(),
        ])
        .on_complete(move |ok| result_clone.set(Some(ok)))
        .start();
    })
    .unwrap();

    assert_eq!(*errors.borrow(), ["unreachable host"]);
    assert_eq!(result.get(), Some(false));
}

#[test]
fn weave_failure_does_not_cancel_siblings() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();

    let slow_done = Rc::new(Cell::new(false));
    let slow_clone = slow_done.clone();
    let seen_at_completion = Rc::new(Cell::new(None));
    let seen_clone = seen_at_completion.clone();
    let observed = slow_done.clone();

    rt.block_on(|| {
        weave([
            try_task(|| Err::<(), _>("fast failure")).get(),
            task(|| thread::sleep(Duration::from_millis(50)))
                .on_done(move |_| slow_clone.set(true))
                .get(),
        ])
        .on_complete(move |ok| {
            assert!(!ok);
            seen_clone.set(Some(observed.get()));
        })
        .start();
    })
    .unwrap();

    // The weave waits for every child, even after the first failure.
    assert!(slow_done.get());
    assert_eq!(seen_at_completion.get(), Some(true));
}

#[test]
fn weave_completes_after_every_child_in_any_order() {
    let rt = RuntimeBuilder::new().worker_threads(3).build().unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let completions = Rc::new(Cell::new(0));

    rt.block_on(|| {
        let children = [30u64, 0, 15].into_iter().map(|delay| {
            let log = log.clone();

            task(move || {
                thread::sleep(Duration::from_millis(delay));
                delay
            })
            .on_complete(move |_| log.borrow_mut().push(format!("child {delay}")))
        });

        let log = log.clone();
        let completions = completions.clone();

        weave(children)
            .on_complete(move |ok| {
                assert!(ok);
                completions.set(completions.get() + 1);
                log.borrow_mut().push("weave".to_owned());
            })
            .start();
    })
    .unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 4);
    assert_eq!(log.last().map(String::as_str), Some("weave"));
    assert_eq!(completions.get(), 1);
}

#[test]
fn weave_runs_children_concurrently() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();

    // Both work items must be in flight at once to get past the barrier.
    let barrier = Arc::new(Barrier::new(2));
    let result = Rc::new(Cell::new(None));
    let result_clone = result.clone();

    rt.block_on(|| {
        let left = barrier.clone();
        let right = barrier.clone();

        weave([
            task(move || {
                left.wait();
            })
            .get(),
            task(move || {
                right.wait();
            })
            .get(),
        ])
        .on_complete(move |ok| result_clone.set(Some(ok)))
        .start();
    })
    .unwrap();

    assert_eq!(result.get(), Some(true));
}

#[test]
fn empty_weave_succeeds() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    let result = Rc::new(Cell::new(None));
    let result_clone = result.clone();

    rt.block_on(|| {
        weave(Vec::<weft::TaskHandle>::new())
            .on_complete(move |ok| result_clone.set(Some(ok)))
            .start();
    })
    .unwrap();

    assert_eq!(result.get(), Some(true));
}

#[test]
fn children_are_disposed_before_the_weave_completes() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();
    let event_loop = rt.event_loop();

    let child_live = Rc::new(RefCell::new(Vec::new()));
    let weave_live = Rc::new(Cell::new(None));

    let children = (0..2).map(|_| {
        let child_live = child_live.clone();
        let handle = event_loop.clone();

        task(|| ()).on_complete(move |_| child_live.borrow_mut().push(handle.live_tasks()))
    });

    let weave_clone = weave_live.clone();
    let handle = event_loop.clone();

    event_loop.start(
        weave(children).on_complete(move |_| weave_clone.set(Some(handle.live_tasks()))),
    );
    assert_eq!(event_loop.live_tasks(), 3);

    event_loop.run().unwrap();

    // A child observer sees itself and the weave; the weave's sees only itself.
    assert!(child_live.borrow().iter().all(|&live| live >= 2));
    assert_eq!(weave_live.get(), Some(1));
    assert!(event_loop.is_idle());
}

#[test]
fn weave_macro_accepts_builders_and_handles() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();

    let result = Rc::new(Cell::new(None));
    let result_clone = result.clone();

    rt.block_on(|| {
        weft::weave![
            task(|| 1),
            try_task(|| Ok::<_, String>(2)),
            weave([task(|| 3).get()]),
        ]
        .on_complete(move |ok| result_clone.set(Some(ok)))
        .start();
    })
    .unwrap();

    assert_eq!(result.get(), Some(true));
}

#[test]
fn panicking_callback_still_completes_the_weave() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();
    let event_loop = rt.event_loop();

    let result = Rc::new(Cell::new(None));
    let result_clone = result.clone();

    event_loop.start(
        weave([
            task(|| 1).on_done(|_| panic!("callback failed")).get(),
            task(|| 2).get(),
        ])
        .on_complete(move |ok| result_clone.set(Some(ok))),
    );

    let first = panic::catch_unwind(AssertUnwindSafe(|| event_loop.run()));
    assert!(first.is_err(), "the callback panic must reach the caller");

    // The panicking leaf was disposed and reported; the loop drains normally.
    event_loop.run_timeout(Duration::from_secs(5)).unwrap();

    assert_eq!(result.get(), Some(false));
    assert_eq!(event_loop.live_tasks(), 0);
    assert!(event_loop.is_idle());
}
