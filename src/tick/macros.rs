/// Declares the static global `RECEIVER` singleton protected by a
/// `critical_section` mutex.
///
/// Use when the receive interrupt and `main` both need access to the
/// byte-arrival state. Pair with [`setup_receiver!`](crate::setup_receiver)
/// and [`feed_receiver!`](crate::feed_receiver).
///
/// # Example
/// ```ignore
/// tempmon::init_receiver!();
/// ```
#[macro_export]
macro_rules! init_receiver {
    () => {
        /// Global byte-arrival receiver shared with the receive interrupt.
        pub static RECEIVER: $crate::critical_section::Mutex<
            core::cell::RefCell<Option<$crate::monitor::Receiver<'static>>>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Installs a constructed receiver into the global `RECEIVER` singleton.
///
/// # Example
/// ```ignore
/// fn main() {
///     let receiver = Receiver::new(FrameDescriptor::default(), None, &STORE).unwrap();
///     tempmon::setup_receiver!(receiver);
/// }
/// ```
///
/// # Notes
/// - Requires `init_receiver!` to have been used earlier.
#[macro_export]
macro_rules! setup_receiver {
    ( $receiver:expr ) => {
        $crate::tick::global_receiver_setup(&RECEIVER, $receiver)
    };
}

/// Feeds one received byte to the global `RECEIVER` from the receive
/// interrupt.
///
/// # Example
/// ```ignore
/// #[interrupt]
/// fn USART1() {
///     tempmon::feed_receiver!(read_data_register(), tick_ms());
/// }
/// ```
///
/// # Notes
/// - Safe to call before setup — it silently does nothing until a
///   receiver is installed.
#[macro_export]
macro_rules! feed_receiver {
    ( $byte:expr, $now:expr ) => {
        $crate::tick::global_receiver_feed(&RECEIVER, $byte, $now)
    };
}

/// Resynchronizes the global `RECEIVER` after a transport fault.
///
/// # Example
/// ```ignore
/// #[interrupt]
/// fn USART1_ERR() {
///     clear_error_flags();
///     tempmon::receiver_fault!();
/// }
/// ```
#[macro_export]
macro_rules! receiver_fault {
    () => {
        $crate::tick::global_receiver_fault(&RECEIVER)
    };
}

#[cfg(test)]
mod tests {
    use crate::frame::FrameDescriptor;
    use crate::monitor::Receiver;
    use crate::store::TempStore;

    static STORE: TempStore = TempStore::new();
    crate::init_receiver!();

    #[test]
    fn macro_wiring_reaches_the_store() {
        let receiver = Receiver::new(FrameDescriptor::default(), None, &STORE).unwrap();
        crate::setup_receiver!(receiver);

        for byte in [0xFC, 0x0A, 0x00, 0x01, 0xE8, 0x03, 0x00, 0x00, 0x00, 0x00] {
            crate::feed_receiver!(byte, 7);
        }
        assert_eq!(STORE.latest().unwrap().raw, 1000);

        crate::receiver_fault!();
        assert_eq!(STORE.latest().unwrap().raw, 1000);
    }
}
