use super::*;
use parking_lot::Mutex;

fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> EventCallback<u32> {
    let log = Arc::clone(log);
    Arc::new(move |value: &u32| log.lock().push(format!("{tag}:{value}")))
}

#[test]
fn trigger_invokes_callbacks_in_registration_order() {
    let events = EventController::<u32>::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    events.on("connect", recorder(&log, "first"));
    events.on("connect", recorder(&log, "second"));
    events.on("error", recorder(&log, "other"));

    events.trigger("connect", &7);

    assert_eq!(*log.lock(), vec!["first:7", "second:7"]);
}

#[test]
fn same_callback_may_be_registered_twice() {
    let events = EventController::<u32>::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let callback = recorder(&log, "dup");
    events.on("connect", Arc::clone(&callback));
    events.on("connect", Arc::clone(&callback));

    events.trigger("connect", &1);
    assert_eq!(log.lock().len(), 2);

    events.off("connect", Some(&callback));
    events.trigger("connect", &2);
    assert_eq!(log.lock().len(), 2);
}

#[test]
fn off_with_callback_keeps_other_listeners() {
    let events = EventController::<u32>::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let removed = recorder(&log, "removed");
    events.on("connect", Arc::clone(&removed));
    events.on("connect", recorder(&log, "kept"));

    events.off("connect", Some(&removed));
    events.trigger("connect", &3);

    assert_eq!(*log.lock(), vec!["kept:3"]);
}

#[test]
fn off_without_callback_clears_only_that_event() {
    let events = EventController::<u32>::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    events.on("connect", recorder(&log, "a"));
    events.on("connect", recorder(&log, "b"));
    events.on("close", recorder(&log, "c"));

    events.off("connect", None);
    events.off("missing", None);

    assert_eq!(events.listener_count("connect"), 0);
    assert_eq!(events.listener_count("close"), 1);
}

#[test]
fn subscription_removes_exactly_its_registration() {
    let events = EventController::<u32>::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let callback = recorder(&log, "shared");
    let first = Subscription::new(&events, events.on("connect", Arc::clone(&callback)));
    let _second = Subscription::new(&events, events.on("connect", Arc::clone(&callback)));

    assert!(first.unsubscribe());
    events.trigger("connect", &4);

    assert_eq!(*log.lock(), vec!["shared:4"]);
}

#[test]
fn unsubscribe_after_controller_dropped_is_harmless() {
    let events = EventController::<u32>::new();
    let subscription = Subscription::new(&events, events.on("connect", Arc::new(|_: &u32| {})));
    drop(events);
    assert!(!subscription.unsubscribe());
}

#[test]
fn callbacks_may_remove_listeners_while_triggering() {
    let events = EventController::<u32>::new();
    let hits = Arc::new(Mutex::new(0));
    let id_slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

    let controller = Arc::clone(&events);
    let slot = Arc::clone(&id_slot);
    let counter = Arc::clone(&hits);
    let id = events.on(
        "connect",
        Arc::new(move |_: &u32| {
            *counter.lock() += 1;
            if let Some(id) = slot.lock().take() {
                controller.remove(id);
            }
        }),
    );
    *id_slot.lock() = Some(id);

    events.trigger("connect", &1);
    events.trigger("connect", &2);

    assert_eq!(*hits.lock(), 1);
}
