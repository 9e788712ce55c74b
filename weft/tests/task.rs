use weft::{RuntimeBuilder, task, try_task};

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[test]
fn on_done_receives_value() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();

    let value = Rc::new(RefCell::new(String::new()));
    let value_clone = value.clone();

    rt.block_on(|| {
        task(|| format!("{}-{}", "left", "right"))
            .on_done(move |s| *value_clone.borrow_mut() = s)
            .start();
    })
    .unwrap();

    assert_eq!(*value.borrow(), "left-right");
}

#[test]
fn plain_task_always_reports_success() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    let result = Rc::new(Cell::new(None));
    let result_clone = result.clone();

    // A plain task has no failure channel, even when its value looks like one.
    rt.block_on(|| {
        task(|| Err::<(), _>("not inspected"))
            .on_complete(move |ok| result_clone.set(Some(ok)))
            .start();
    })
    .unwrap();

    assert_eq!(result.get(), Some(true));
}

#[test]
fn fallible_ok_runs_only_on_done() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let (done, error, complete) = (log.clone(), log.clone(), log.clone());

    rt.block_on(|| {
        try_task(|| "42".parse::<u32>())
            .on_done(move |n| done.borrow_mut().push(format!("done {n}")))
            .on_error(move |e| error.borrow_mut().push(format!("error {e}")))
            .on_complete(move |ok| complete.borrow_mut().push(format!("complete {ok}")))
            .start();
    })
    .unwrap();

    assert_eq!(*log.borrow(), ["done 42", "complete true"]);
}

#[test]
fn fallible_err_runs_only_on_error() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let (done, error, complete) = (log.clone(), log.clone(), log.clone());

    rt.block_on(|| {
        try_task(|| Err::<u32, _>("disk full"))
            .on_done(move |n| done.borrow_mut().push(format!("done {n}")))
            .on_error(move |e| error.borrow_mut().push(format!("error {e}")))
            .on_complete(move |ok| complete.borrow_mut().push(format!("complete {ok}")))
            .start();
    })
    .unwrap();

    assert_eq!(*log.borrow(), ["error disk full", "complete false"]);
}

#[test]
fn callbacks_are_optional() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    let result = Rc::new(Cell::new(None));
    let result_clone = result.clone();

    rt.block_on(|| {
        task(|| 1).start();
        try_task(|| Err::<(), _>(())).start();
        try_task(|| Ok::<_, ()>(()))
            .on_complete(move |ok| result_clone.set(Some(ok)))
            .start();
    })
    .unwrap();

    assert_eq!(result.get(), Some(true));
}

#[test]
fn repeated_on_done_replaces_callback() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let (first, second) = (log.clone(), log.clone());

    rt.block_on(|| {
        task(|| 3)
            .on_done(move |v| first.borrow_mut().push(("first", v)))
            .on_done(move |v| second.borrow_mut().push(("second", v)))
            .start();
    })
    .unwrap();

    assert_eq!(*log.borrow(), [("second", 3)]);
}

#[test]
fn observers_run_in_registration_order() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let (a, b, c) = (log.clone(), log.clone(), log.clone());

    rt.block_on(|| {
        task(|| ())
            .on_complete(move |_| a.borrow_mut().push(1))
            .on_complete(move |_| b.borrow_mut().push(2))
            .get()
            .on_complete(move |_| c.borrow_mut().push(3))
            .start();
    })
    .unwrap();

    assert_eq!(*log.borrow(), [1, 2, 3]);
}

#[test]
fn completion_is_never_inline_with_start() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    let completed = Rc::new(Cell::new(false));
    let completed_clone = completed.clone();
    let observed = completed.clone();

    rt.block_on(|| {
        task(|| ())
            .on_complete(move |_| completed_clone.set(true))
            .start();

        assert!(!observed.get());
    })
    .unwrap();

    assert!(completed.get());
}

#[test]
fn task_is_live_until_observers_ran() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();
    let event_loop = rt.event_loop();

    let seen = Rc::new(Cell::new(None));
    let seen_clone = seen.clone();
    let handle = event_loop.clone();

    event_loop.start(
        task(|| ()).on_complete(move |_| seen_clone.set(Some(handle.live_tasks()))),
    );

    assert_eq!(event_loop.live_tasks(), 1);
    event_loop.run().unwrap();

    assert_eq!(seen.get(), Some(1));
    assert_eq!(event_loop.live_tasks(), 0);
}

#[test]
fn start_from_inside_callback() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let outer = log.clone();
    let inner = log.clone();

    rt.block_on(|| {
        task(|| 1)
            .on_done(move |v| {
                outer.borrow_mut().push(v);

                task(move || v + 1)
                    .on_done(move |v| inner.borrow_mut().push(v))
                    .start();
            })
            .start();
    })
    .unwrap();

    assert_eq!(*log.borrow(), [1, 2]);
}

#[test]
fn dropped_handle_never_runs() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    let ran = Arc::new(AtomicBool::new(false));
    let ran_clone = ran.clone();

    rt.block_on(|| {
        let handle = task(move || ran_clone.store(true, Ordering::SeqCst)).get();
        drop(handle);
    })
    .unwrap();

    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn panicking_observer_does_not_stop_the_others() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();
    let event_loop = rt.event_loop();

    let later = Rc::new(Cell::new(None));
    let later_clone = later.clone();

    event_loop.start(
        task(|| ())
            .on_complete(|_| panic!("observer failed"))
            .on_complete(move |ok| later_clone.set(Some(ok))),
    );

    let result = panic::catch_unwind(AssertUnwindSafe(|| event_loop.run()));

    assert!(result.is_err());
    assert_eq!(later.get(), Some(true));
    assert_eq!(event_loop.live_tasks(), 0);
}
