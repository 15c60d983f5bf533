//! IdAllocator behaviour over long reserve/free sequences.
//!
//! A naive model (a `Vec<bool>` scanned from zero) is driven side by side with
//! the allocator to check that `reserve` always yields the minimum free id and
//! never hands out an id twice without an intervening `free`.

use kestrel_core::alloc::IdAllocator;

/// Small deterministic generator so the sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

fn model_min_free(model: &[bool]) -> Option<usize> {
    model.iter().position(|reserved| !reserved)
}

#[test]
fn test_reserve_matches_min_free_model() {
    const MAX: u16 = 32;
    let mut ids = IdAllocator::<u16>::with_max(MAX);
    let mut model = vec![false; MAX as usize];
    let mut rng = Lcg(0x5eed);

    for _ in 0..2_000 {
        let reserve = rng.next() % 3 != 0;
        if reserve {
            let expected = model_min_free(&model);
            let got = ids.try_reserve();
            assert_eq!(got.map(usize::from), expected);
            if let Some(id) = got {
                assert!(!model[id as usize], "id {id} handed out twice");
                model[id as usize] = true;
            }
        } else {
            let id = (rng.next() % MAX as u64) as u16;
            ids.free(id);
            model[id as usize] = false;
        }

        let reserved: Vec<u16> = (0..MAX).filter(|&i| model[i as usize]).collect();
        assert_eq!(ids.reserved_ids(), reserved);
    }
}

#[test]
fn test_freed_id_is_returned_again() {
    let mut ids = IdAllocator::<u16>::with_max(16);
    let first: Vec<u16> = (0..4).map(|_| ids.reserve()).collect();
    assert_eq!(first, vec![0, 1, 2, 3]);

    ids.free(2);
    assert!(ids.is_free(2));
    assert_eq!(ids.reserve(), 2);
    assert!(ids.is_reserved(2));
}

#[test]
fn test_reserving_at_capacity_fails() {
    let mut ids = IdAllocator::<u8>::with_max(3);
    for expected in 0..3 {
        assert_eq!(ids.try_reserve(), Some(expected));
    }
    assert_eq!(ids.try_reserve(), None);
    assert_eq!(ids.len(), ids.capacity());

    let result = std::panic::catch_unwind(move || {
        let mut ids = ids;
        ids.reserve()
    });
    assert!(result.is_err());
}
