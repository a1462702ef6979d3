use super::*;

/// A right-leaning chain, the shape a long `a + b + c + ...` takes in the IR.
enum Chain {
    Leaf(u64),
    Link(u64, Box<Chain>),
}

fn build(depth: u64) -> Chain {
    let mut chain = Chain::Leaf(0);
    for i in 1..=depth {
        chain = Chain::Link(i, Box::new(chain));
    }
    chain
}

fn sum(chain: &Chain) -> u64 {
    ensure_sufficient_stack(|| match chain {
        Chain::Leaf(v) => *v,
        Chain::Link(v, rest) => v + sum(rest),
    })
}

fn drop_iteratively(mut chain: Chain) {
    while let Chain::Link(_, rest) = chain {
        chain = *rest;
    }
}

#[test]
fn shallow_chain_folds() {
    let chain = build(10);
    assert_eq!(sum(&chain), 55);
    drop_iteratively(chain);
}

#[test]
fn deep_chain_does_not_overflow() {
    // 200k frames would overflow a default 8MB thread stack
    let chain = build(200_000);
    assert_eq!(sum(&chain), 200_000 * 200_001 / 2);
    drop_iteratively(chain);
}

#[test]
fn passes_through_results() {
    let result: Result<u32, &str> = ensure_sufficient_stack(|| Ok(7));
    assert_eq!(result, Ok(7));
}
