#![no_main]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pushstream_core::{Handlers, Observable, Observer, Teardown};

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Op {
    Next(u8),
    Error(u8),
    Complete,
    Unsubscribe,
    /// Only meaningful inside the producer: return and hand the rest to the
    /// caller side.
    Yield,
}

#[derive(Arbitrary, Debug)]
struct Input {
    ops: Vec<Op>,
    /// Value that makes `on_next` cancel its own subscription.
    cancel_on: Option<u8>,
    handler_mask: u8,
}

#[derive(Default)]
struct Counts {
    next: Cell<usize>,
    terminal: Cell<usize>,
    teardown: Cell<usize>,
    after_close: Cell<usize>,
}

fn apply(observer: &Observer<u8, u8, ()>, op: Op) {
    match op {
        Op::Next(v) => observer.next(v),
        Op::Error(e) => observer.error(e),
        Op::Complete => observer.complete(),
        Op::Unsubscribe => observer.unsubscribe(),
        Op::Yield => {}
    }
}

fuzz_target!(|input: Input| {
    let ops: Rc<[Op]> = input.ops.into_iter().take(256).collect();
    let split = ops
        .iter()
        .position(|op| matches!(op, Op::Yield))
        .unwrap_or(ops.len());

    let counts = Rc::new(Counts::default());
    let slot: Rc<RefCell<Option<Observer<u8, u8, ()>>>> = Rc::new(RefCell::new(None));

    let producer_counts = Rc::clone(&counts);
    let producer_slot = Rc::clone(&slot);
    let producer_ops = Rc::clone(&ops);
    let source: Observable<u8, u8, ()> = Observable::new(move |observer| {
        *producer_slot.borrow_mut() = Some(observer.clone());
        for op in &producer_ops[..split] {
            apply(&observer, *op);
        }
        let counts = Rc::clone(&producer_counts);
        Teardown::new(move || counts.teardown.set(counts.teardown.get() + 1))
    });

    let cancel_on = input.cancel_on;
    let mask = input.handler_mask;
    let subscription = source.subscribe_with(|subscription| {
        let mut handlers = Handlers::new();
        if mask & 1 != 0 {
            let counts = Rc::clone(&counts);
            handlers = handlers.on_next(move |v| {
                if subscription.is_closed() {
                    counts.after_close.set(counts.after_close.get() + 1);
                }
                counts.next.set(counts.next.get() + 1);
                if Some(v) == cancel_on {
                    subscription.unsubscribe();
                }
            });
        }
        if mask & 2 != 0 {
            let counts = Rc::clone(&counts);
            handlers = handlers.on_error(move |_| counts.terminal.set(counts.terminal.get() + 1));
        }
        if mask & 4 != 0 {
            let counts = Rc::clone(&counts);
            handlers = handlers.on_complete(move || counts.terminal.set(counts.terminal.get() + 1));
        }
        handlers
    });

    let observer = slot.borrow_mut().take();
    if let Some(observer) = observer {
        for op in ops.iter().skip(split) {
            apply(&observer, *op);
        }
    }
    subscription.unsubscribe();
    subscription.unsubscribe();

    assert!(subscription.is_closed());
    assert!(counts.terminal.get() <= 1);
    assert_eq!(counts.after_close.get(), 0);
    assert_eq!(counts.teardown.get(), 1);
});
