use core::{alloc::Layout, cell::Cell, ptr::NonNull};

use proptest::prelude::*;
use stride::{AllocError, Allocator, Heap, RawVector, Vector, VectorConfig};

/// Heap pass-through that counts buffer moves.
#[derive(Default)]
struct Counting {
    resizes: Cell<usize>,
}

unsafe impl Allocator for Counting {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.resizes.set(self.resizes.get() + 1);
        Heap.allocate(layout)
    }

    fn can_reallocate(&self) -> bool {
        true
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        self.resizes.set(self.resizes.get() + 1);
        Heap.reallocate(ptr, old_layout, new_size)
    }

    fn can_deallocate(&self) -> bool {
        true
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        Heap.deallocate(ptr, layout)
    }
}

fn arb_config() -> impl Strategy<Value = VectorConfig> {
    (2usize..5, 1usize..16).prop_map(|(factor, initial)| {
        VectorConfig::default()
            .with_growth_factor(factor)
            .with_initial_capacity(initial)
    })
}

proptest! {
    #[test]
    fn pushes_keep_insertion_order(values in prop::collection::vec(any::<u32>(), 0..300)) {
        let mut vec = Vector::<u32, _>::new_in(Heap).unwrap();
        for &value in &values {
            vec.push(value).unwrap();
        }

        prop_assert_eq!(vec.len(), values.len());
        prop_assert!(vec.capacity() >= values.len());
        for (i, &value) in values.iter().enumerate() {
            prop_assert_eq!(vec.get(i), Some(value));
        }
    }

    #[test]
    fn reserve_is_monotonic(targets in prop::collection::vec(0usize..2000, 1..20)) {
        let mut vec = RawVector::new_in(Heap, 3).unwrap();
        let mut highest = 0;
        for target in targets {
            vec.reserve(target).unwrap();
            highest = highest.max(target);
            prop_assert!(vec.capacity() >= target);
            prop_assert_eq!(vec.capacity(), highest);
        }
    }

    #[test]
    fn insert_then_erase_round_trips(
        values in prop::collection::vec(any::<i16>(), 0..100),
        index in any::<prop::sample::Index>(),
        value in any::<i16>(),
    ) {
        let mut vec = Vector::from_slice_in(Heap, &values).unwrap();
        let index = index.index(values.len() + 1);
        vec.insert(index, value).unwrap();
        prop_assert_eq!(vec.get(index), Some(value));
        vec.erase(index).unwrap();
        prop_assert_eq!(vec.as_slice(), &values[..]);
    }

    #[test]
    fn shrink_to_fit_is_idempotent(len in 0usize..200, extra in 0usize..200) {
        let alloc = Counting::default();
        let mut vec = RawVector::new_in(&alloc, 8).unwrap();
        vec.reserve(len + extra).unwrap();
        for i in 0..len as u64 {
            vec.push(&i.to_ne_bytes()).unwrap();
        }

        vec.shrink_to_fit().unwrap();
        prop_assert_eq!(vec.capacity(), len);
        let resizes = alloc.resizes.get();
        vec.shrink_to_fit().unwrap();
        prop_assert_eq!(vec.capacity(), len);
        prop_assert_eq!(alloc.resizes.get(), resizes);
    }

    #[test]
    fn push_pop_is_a_stack(
        values in prop::collection::vec(prop::array::uniform4(any::<u8>()), 0..50),
        top in prop::array::uniform4(any::<u8>()),
    ) {
        let mut vec = RawVector::new_in(Heap, 4).unwrap();
        for value in &values {
            vec.push(value).unwrap();
        }
        let before = vec.as_bytes().to_vec();

        vec.push(&top).unwrap();
        prop_assert_eq!(vec.back(), Some(&top[..]));
        vec.pop().unwrap();

        prop_assert_eq!(vec.len(), values.len());
        prop_assert_eq!(vec.as_bytes(), &before[..]);
    }

    #[test]
    fn growth_events_are_logarithmic(n in 1usize..5000, config in arb_config()) {
        let alloc = Counting::default();
        let mut vec = RawVector::with_config_in(&alloc, 2, config).unwrap();
        for i in 0..n as u16 {
            vec.push(&i.to_ne_bytes()).unwrap();
        }

        // one event to leave empty, then one per multiplication by the growth factor
        let mut bound = 1;
        let mut cap = config.initial_capacity;
        while cap < n {
            cap *= config.growth_factor;
            bound += 1;
        }
        prop_assert_eq!(alloc.resizes.get(), bound);
        prop_assert!(bound <= 2 + (n as f64).log2().ceil() as usize);
    }
}

#[test]
fn concrete_scenario() {
    let mut vec = RawVector::new_in(Heap, 4).unwrap();
    for value in [10i32, 20, 30] {
        vec.push(&value.to_ne_bytes()).unwrap();
    }
    assert_eq!(vec.len(), 3);
    assert_eq!(vec.front(), Some(&10i32.to_ne_bytes()[..]));
    assert_eq!(vec.back(), Some(&30i32.to_ne_bytes()[..]));
    assert_eq!(vec.at(1), &20i32.to_ne_bytes()[..]);

    vec.erase(1).unwrap();
    assert_eq!(vec.len(), 2);
    assert_eq!(vec.at(0), &10i32.to_ne_bytes()[..]);
    assert_eq!(vec.at(1), &30i32.to_ne_bytes()[..]);
}

#[test]
fn zero_elem_size_is_rejected() {
    assert!(RawVector::new_in(Heap, 0).is_err());
}
