//! Vector routing tests. The dispatch path itself touches the PIC and the
//! PS/2 data port, so only the pure routing decision runs on the host.

use kerncore::interrupts::{device_for_vector, Device, InterruptIndex};

#[test]
fn device_vectors_route_to_their_handlers() {
    assert_eq!(
        device_for_vector(InterruptIndex::Timer.as_u8()),
        Some(Device::Timer)
    );
    assert_eq!(
        device_for_vector(InterruptIndex::Keyboard.as_u8()),
        Some(Device::Keyboard)
    );
}

#[test]
fn remapped_vector_numbers_are_stable() {
    assert_eq!(InterruptIndex::Timer.as_u8(), 32);
    assert_eq!(InterruptIndex::Keyboard.as_u8(), 33);
    assert_eq!(InterruptIndex::RTC.as_u8(), 40);
}

#[test]
fn every_other_vector_is_unknown() {
    for vector in 0u16..=255 {
        let vector = vector as u8;
        if vector == InterruptIndex::Timer.as_u8() || vector == InterruptIndex::Keyboard.as_u8() {
            continue;
        }
        // No device handler is selected, so neither the tick counter nor
        // the scancode ring can be touched by such a vector
        assert_eq!(device_for_vector(vector), None, "vector {vector}");
    }
}
