//! Arena generational handle tests.
//!
//! These tests verify generation bumps on removal, stale handle detection
//! and slot reuse.

use strata_core::alloc::{Arena, Handle};

#[test]
fn test_insert_and_get() {
    let mut arena = Arena::new();

    let a = arena.insert(42);
    let b = arena.insert(100);

    assert_eq!(*arena.get(a), 42);
    assert_eq!(*arena.get(b), 100);
}

#[test]
fn test_get_mut() {
    let mut arena = Arena::new();

    let h = arena.insert(42);
    *arena.get_mut(h) = 100;

    assert_eq!(arena[h], 100);
}

#[test]
fn test_try_get_invalid_returns_none() {
    let arena = Arena::<i32>::new();

    let invalid = Handle::new(0, 999);
    assert_eq!(arena.try_get(invalid), None);
}

#[test]
#[should_panic(expected = "invalid generation")]
fn test_use_after_free_panics() {
    let mut arena = Arena::new();

    let h = arena.insert(42);
    arena.remove(h);

    let _ = arena.get(h);
}

#[test]
#[should_panic(expected = "invalid generation")]
fn test_double_remove_panics() {
    let mut arena = Arena::new();

    let h = arena.insert(1);
    arena.remove(h);
    arena.remove(h);
}

#[test]
fn test_generation_increment() {
    let mut arena = Arena::new();

    let h1 = arena.insert(1);
    arena.remove(h1);
    let h2 = arena.insert(2);

    assert_eq!(h2.index(), h1.index(), "slot should be reused");
    assert_eq!(h2.generation(), 1, "generation should be bumped");
    assert_eq!(arena.try_get(h1), None);
    assert_eq!(arena[h2], 2);
}

#[test]
fn test_len_tracks_live_values() {
    let mut arena = Arena::new();
    assert!(arena.is_empty());

    let a = arena.insert(1);
    arena.insert(2);
    arena.insert(3);
    assert_eq!(arena.len(), 3);

    arena.remove(a);
    assert_eq!(arena.len(), 2);
}

#[test]
fn test_clear_invalidates_handles() {
    let mut arena = Arena::new();

    let a = arena.insert(1);
    let b = arena.insert(2);
    arena.clear();

    assert_eq!(arena.len(), 0);
    assert!(!arena.contains(a));
    assert!(!arena.contains(b));

    let c = arena.insert(3);
    assert_eq!(arena[c], 3);
    assert_eq!(arena.iter().count(), 1);
}
