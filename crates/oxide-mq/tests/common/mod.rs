#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use oxide_mq::{current_unit, Handler, Message, UnitId};

/// Bit flags set by handlers, shared across units.
#[derive(Clone, Default)]
pub struct Flags(Arc<AtomicU32>);

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, bit: u32) {
        self.0.fetch_or(bit, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }

    /// A handler that sets `bit`.
    pub fn setter(&self, bit: u32) -> Handler {
        let flags = self.clone();
        Handler::func(move |_: &mut Message| flags.set(bit))
    }
}

/// Ordered log of events written by handlers.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// A handler that logs `entry`.
    pub fn writer(&self, entry: &str) -> Handler {
        let log = self.clone();
        let entry = entry.to_string();
        Handler::func(move |_: &mut Message| log.push(entry.clone()))
    }

    /// A handler that logs `entry` followed by the message value and params.
    pub fn capture(&self, entry: &str) -> Handler {
        let log = self.clone();
        let entry = entry.to_string();
        Handler::func(move |msg: &mut Message| {
            log.push(format!("{entry} value={} params={:?}", msg.value, msg.params));
        })
    }
}

/// Units observed by handlers, in execution order.
#[derive(Clone, Default)]
pub struct Units(Arc<Mutex<Vec<Option<UnitId>>>>);

impl Units {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorder(&self) -> Handler {
        let units = Arc::clone(&self.0);
        Handler::func(move |_: &mut Message| units.lock().unwrap().push(current_unit()))
    }

    pub fn seen(&self) -> Vec<Option<UnitId>> {
        self.0.lock().unwrap().clone()
    }
}

/// A handler that does nothing.
pub fn noop() -> Handler {
    Handler::func(|_: &mut Message| {})
}
