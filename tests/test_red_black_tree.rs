use balanced_collections::red_black_tree::{Config, Error, RedBlackSet};
use rand::Rng;
use std::collections::BTreeSet;

const NUM_OF_OPERATIONS: usize = 10_000;
const MAX_VALUE: u32 = 2_000;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn max_height(len: usize) -> f64 {
    2.0 * ((len + 1) as f64).log2() - 1.0
}

fn check(set: &RedBlackSet<u32>, expected: &BTreeSet<u32>) {
    assert!(set.black_height().is_some());
    assert_eq!(set.len(), expected.len());
    if let Some(height) = set.height() {
        assert!(height as f64 <= max_height(set.len()));
    }
}

macro_rules! red_black_tree_tests {
    ($($module_name:ident: $config:expr,)*) => {
        $(
            mod $module_name {
                use balanced_collections::red_black_tree::{Config, Error, RedBlackSet};
                use rand::Rng;
                use std::collections::BTreeSet;
                use super::{check, init_logger, MAX_VALUE, NUM_OF_OPERATIONS};

                fn new_set() -> RedBlackSet<u32> {
                    let config: Config = $config;
                    RedBlackSet::with_config(config).unwrap()
                }

                #[test]
                fn int_test_random_operations() {
                    init_logger();
                    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
                    let mut set = new_set();
                    let mut expected = BTreeSet::new();
                    let mut successes = (0, 0);

                    for _ in 0..NUM_OF_OPERATIONS {
                        let value = rng.gen_range(0, MAX_VALUE);
                        if rng.gen_range(0, 3) < 2 {
                            let result = set.insert(value);
                            if expected.insert(value) {
                                assert_eq!(result, Ok(()));
                                successes.0 += 1;
                            } else {
                                assert_eq!(result, Err(Error::DuplicateKey));
                            }
                        } else {
                            let result = set.remove(&value);
                            if expected.remove(&value) {
                                assert_eq!(result, Ok(value));
                                successes.1 += 1;
                            } else if expected.is_empty() {
                                assert_eq!(result, Err(Error::EmptyTree));
                            } else {
                                assert_eq!(result, Err(Error::NotFound));
                            }
                        }
                        check(&set, &expected);
                    }

                    assert_eq!(set.len(), successes.0 - successes.1);
                    assert_eq!(
                        set.iter().collect::<Vec<&u32>>(),
                        expected.iter().collect::<Vec<&u32>>(),
                    );
                    assert_eq!(set.min().ok(), expected.iter().next());
                    assert_eq!(set.max().ok(), expected.iter().next_back());
                }

                #[test]
                fn int_test_neighbors() {
                    init_logger();
                    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([2, 2, 2, 2]);
                    let mut set = new_set();
                    let mut expected = BTreeSet::new();

                    for _ in 0..NUM_OF_OPERATIONS / 10 {
                        let value = rng.gen_range(0, MAX_VALUE);
                        if expected.insert(value) {
                            set.insert(value).unwrap();
                        }
                    }

                    for value in 0..MAX_VALUE {
                        if expected.contains(&value) {
                            assert_eq!(set.next_lower(&value), expected.range(..value).next_back());
                            assert_eq!(set.next_higher(&value), expected.range(value + 1..).next());
                        } else {
                            assert_eq!(set.next_lower(&value), None);
                            assert_eq!(set.next_higher(&value), None);
                        }
                    }
                }

                #[test]
                fn int_test_round_trip() {
                    init_logger();
                    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([3, 3, 3, 3]);
                    let mut set = new_set();
                    let mut expected = BTreeSet::new();

                    for _ in 0..NUM_OF_OPERATIONS / 10 {
                        let value = rng.gen_range(0, MAX_VALUE);
                        let before = set.iter().cloned().collect::<Vec<u32>>();
                        if expected.contains(&value) {
                            continue;
                        }

                        set.insert(value).unwrap();
                        assert_eq!(set.remove(&value), Ok(value));
                        assert_eq!(set.iter().cloned().collect::<Vec<u32>>(), before);
                        check(&set, &expected);

                        set.insert(value).unwrap();
                        expected.insert(value);
                    }
                }

                #[test]
                fn int_test_sequential() {
                    init_logger();
                    let mut set = new_set();
                    let mut expected = BTreeSet::new();

                    for value in 0..MAX_VALUE {
                        set.insert(value).unwrap();
                        expected.insert(value);
                        check(&set, &expected);
                    }
                    for value in (0..MAX_VALUE).rev().step_by(2) {
                        assert_eq!(set.remove(&value), Ok(value));
                        expected.remove(&value);
                        check(&set, &expected);
                    }
                    for value in 0..MAX_VALUE {
                        if value % 2 == 0 {
                            assert_eq!(set.remove(&value), Ok(value));
                            expected.remove(&value);
                            check(&set, &expected);
                        }
                    }

                    assert!(set.is_empty());
                    assert_eq!(set.remove(&0), Err(Error::EmptyTree));
                    assert_eq!(set.min(), Err(Error::EmptyTree));
                }

                #[test]
                fn int_test_traverse_visits_every_value() {
                    let mut set = new_set();
                    for value in (0..100).map(|i| (i * 37) % 101) {
                        set.insert(value).unwrap();
                    }

                    let mut visited = set.traverse().cloned().collect::<Vec<u32>>();
                    assert_eq!(visited.len(), 100);
                    // The root comes first and a root with a left subtree is not the minimum.
                    assert_ne!(Ok(&visited[0]), set.min());
                    visited.sort();
                    assert_eq!(visited, set.iter().cloned().collect::<Vec<u32>>());
                }
            }
        )*
    }
}

red_black_tree_tests!(
    plain: Config::new(),
    indexed: Config::new().secondary_index(true),
    single_node_chunks: Config::new().chunk_size(1),
);

#[test]
fn int_test_index_equivalence() {
    init_logger();
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([4, 4, 4, 4]);
    let mut plain = RedBlackSet::new();
    let mut indexed = RedBlackSet::with_config(Config::new().secondary_index(true)).unwrap();
    let mut expected = BTreeSet::new();

    for i in 0..NUM_OF_OPERATIONS {
        let value = rng.gen_range(0, MAX_VALUE);
        if rng.gen::<bool>() {
            assert_eq!(plain.insert(value), indexed.insert(value));
            expected.insert(value);
        } else {
            assert_eq!(plain.remove(&value), indexed.remove(&value));
            expected.remove(&value);
        }

        if i % 500 == 0 {
            for value in 0..MAX_VALUE {
                assert_eq!(plain.contains(&value), indexed.contains(&value));
            }
            check(&plain, &expected);
            check(&indexed, &expected);
        }
    }

    assert_eq!(
        plain.traverse().collect::<Vec<&u32>>(),
        indexed.traverse().collect::<Vec<&u32>>(),
    );
}

#[test]
fn int_test_failed_operations_leave_set_unchanged() {
    let mut set = RedBlackSet::new();
    for value in &[5, 3, 8, 1, 4] {
        set.insert(*value).unwrap();
    }
    let before = set.traverse().cloned().collect::<Vec<u32>>();

    assert_eq!(set.insert(3), Err(Error::DuplicateKey));
    assert_eq!(set.remove(&7), Err(Error::NotFound));
    assert_eq!(set.swap(&7, &3), Err(Error::NotFound));
    assert!(set.swap(&3, &4).is_err());

    assert_eq!(set.traverse().cloned().collect::<Vec<u32>>(), before);
    assert_eq!(set.len(), 5);
    assert!(set.black_height().is_some());
}
