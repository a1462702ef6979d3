use super::*;

#[test]
fn intern_is_stable() {
    let interner = StringInterner::new();
    let a = interner.intern("sum");
    let b = interner.intern("sum");
    assert_eq!(a, b);
    assert_eq!(interner.lookup(a), "sum");
}

#[test]
fn distinct_strings_get_distinct_names() {
    let interner = StringInterner::new();
    let a = interner.intern("a");
    let b = interner.intern("b");
    assert_ne!(a, b);
    assert_eq!(interner.len(), 3);
}

#[test]
fn empty_string_is_pre_interned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn unknown_name_resolves_to_placeholder() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(999)), "<?>");
}

#[test]
fn shared_interner_clones_share_storage() {
    let shared = SharedInterner::new();
    let other = shared.clone();
    let name = shared.intern("obj");
    assert_eq!(other.lookup(name), "obj");
}
