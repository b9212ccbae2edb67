use crate::monitor::Receiver;
use core::cell::RefCell;
use critical_section::Mutex;

/// Creates the empty global static for an interrupt-driven
/// [`Receiver`].
///
/// # Example
/// ```rust
/// use core::cell::RefCell;
/// use critical_section::Mutex;
/// use tempmon::monitor::Receiver;
/// use tempmon::tick::global_receiver_init;
///
/// static RECEIVER: Mutex<RefCell<Option<Receiver<'static>>>> = global_receiver_init();
/// ```
pub const fn global_receiver_init() -> Mutex<RefCell<Option<Receiver<'static>>>> {
    Mutex::new(RefCell::new(None))
}

/// Installs a receiver into the global static.
///
/// Call once from `main` after constructing the receiver over the
/// `'static` temperature store.
pub fn global_receiver_setup(
    global: &'static Mutex<RefCell<Option<Receiver<'static>>>>,
    receiver: Receiver<'static>,
) {
    critical_section::with(|cs| {
        let _ = global.borrow(cs).replace(Some(receiver));
    });
}

/// Feeds one received byte to the global receiver.
///
/// Call from the byte-arrival interrupt with the current millisecond
/// tick. Silently does nothing if the receiver has not been installed
/// yet.
///
/// # Example
/// ```ignore
/// #[interrupt]
/// fn USART1() {
///     global_receiver_feed(&RECEIVER, read_data_register(), tick_ms());
/// }
/// ```
pub fn global_receiver_feed(
    global: &'static Mutex<RefCell<Option<Receiver<'static>>>>,
    byte: u8,
    now: u32,
) {
    critical_section::with(|cs| {
        if let Some(receiver) = global.borrow(cs).borrow_mut().as_mut() {
            receiver.on_byte(byte, now);
        }
    });
}

/// Resynchronizes the global receiver after a transport fault.
///
/// Call from the transport's error path (overrun, noise, framing
/// fault); reception resumes at the next frame header.
pub fn global_receiver_fault(global: &'static Mutex<RefCell<Option<Receiver<'static>>>>) {
    critical_section::with(|cs| {
        if let Some(receiver) = global.borrow(cs).borrow_mut().as_mut() {
            receiver.on_transport_fault();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameDescriptor;
    use crate::store::TempStore;

    static STORE: TempStore = TempStore::new();
    static RECEIVER: Mutex<RefCell<Option<Receiver<'static>>>> = global_receiver_init();

    #[test]
    fn global_receiver_round_trip() {
        let receiver = Receiver::new(FrameDescriptor::default(), None, &STORE).unwrap();
        global_receiver_setup(&RECEIVER, receiver);

        for byte in [0xFC, 0x0A, 0x00, 0x01, 0x4C, 0x01, 0x00, 0x00, 0x00, 0x00] {
            global_receiver_feed(&RECEIVER, byte, 42);
        }

        let reading = STORE.latest().unwrap();
        assert_eq!(reading.raw, 0x014C);
        assert_eq!(reading.arrival_tick, 42);
    }
}
