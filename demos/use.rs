use avl_map::{AvlTreeMap, ChainedHashMap, Map, MapError};
use tracing_subscriber::EnvFilter;

fn count_words<M: Map<String, usize>>(map: &mut M, text: &str) {
    for word in text.split_whitespace() {
        *map.entry_or_default(word.to_lowercase()) += 1;
    }
}

fn main() {
    // RUST_LOG=avl_map=trace shows every rotation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut map = AvlTreeMap::new();
    map.insert(0, "zero");
    map.insert(1, "one");
    map.insert(2, "two");
    assert!(!map.insert(2, "deux"));
    map.insert(3, "three");
    map.insert(4, "four");
    map.insert(5, "five");
    assert_eq!(map.get(&1), Some(&"one"));
    assert_eq!(map.remove(&1), Ok("one"));
    assert_eq!(map.remove(&1), Err(MapError::KeyNotFound));

    for (k, v) in &map {
        println!("{k} => {v}");
    }

    let mut cursor = map.end();
    print!("reversed:");
    while cursor.retreat().is_ok() {
        if let Ok((k, _)) = cursor.get() {
            print!(" {k}");
        }
    }
    println!();

    let text = "the quick brown fox jumps over the lazy dog The End";
    let mut tree = AvlTreeMap::new();
    let mut hash = ChainedHashMap::with_buckets(8);
    count_words(&mut tree, text);
    count_words(&mut hash, text);
    assert!(tree.same_content(&hash));
    println!("{tree:?}");
}
