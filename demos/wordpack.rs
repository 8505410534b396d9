//! Example: packing a word list and querying the packed string.
//!
//! Builds a small dictionary, prints its packed serialization, and runs
//! membership, prefix and enumeration queries against it without ever
//! rebuilding the dictionary in memory.
//!
//! Run with: cargo run --example wordpack

use dawgpack::dawg::{pack_words, PackedDict};

fn main() {
    let words = ["bake", "baked", "baker", "cake", "caked", "fake", "lake"];
    let packed = pack_words(words).expect("words fit the packed alphabet");

    println!("{} words packed into {} bytes:", words.len(), packed.len());
    println!("  {packed}\n");

    let dict = PackedDict::new(packed).expect("freshly packed string");

    println!("Word lookup:");
    for word in ["bake", "baker", "bakes", "cake", "lake", "make"] {
        let found = dict.is_word(word).expect("well-formed dictionary");
        println!("  {word}: {}", if found { "yes" } else { "no" });
    }

    println!("\nPrefix checking:");
    for prefix in ["ba", "cak", "ma", "fak"] {
        let found = dict.has_prefix(prefix).expect("well-formed dictionary");
        println!("  {prefix}*: {}", if found { "yes" } else { "no" });
    }

    println!(
        "\nAll words: {:?}",
        dict.words().expect("well-formed dictionary")
    );
}
