use super::*;

#[test]
fn advance_makes_older_generations_stale() {
    let g = BatchGeneration::new();
    assert_eq!(g.current(), 0);
    let first = g.advance();
    assert_eq!(first, 1);
    assert!(g.is_current(first));

    let second = g.advance();
    assert!(!g.is_current(first));
    assert!(g.is_current(second));
}

#[test]
fn clones_share_the_counter() {
    let g = BatchGeneration::new();
    let handle = g.clone();
    let gen_at_start = g.advance();
    std::thread::spawn(move || {
        handle.advance();
    })
    .join()
    .unwrap();
    assert!(!g.is_current(gen_at_start));
}
