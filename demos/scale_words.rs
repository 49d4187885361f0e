//! Word-list driver: load a word file, bulk-insert, and compare RadixSet
//! against a BTreeSet baseline on the prefix-heavy operation mix.
//!
//! Pass a file with one word per line, e.g. /usr/share/dict/words.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use radix_set::RadixSet;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(name = "scale_words")]
#[command(about = "Load a word list and compare RadixSet against BTreeSet")]
struct Args {
    /// Path to the input file (one word per line)
    #[arg(short, long, default_value = "data/words.txt")]
    path: String,

    /// Shuffle seed for the insertion order
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Skip the final equality verification pass
    #[arg(long, default_value_t = false)]
    no_verify: bool,
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

fn report(label: &str, radix: Duration, btree: Duration) {
    println!(
        "  {label:<24} radix {radix:>12.2?}   btree {btree:>12.2?}   ratio {:.2}",
        radix.as_secs_f64() / btree.as_secs_f64().max(f64::EPSILON)
    );
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let mut words: Vec<Vec<u8>> = fs::read_to_string(&args.path)?
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| line.as_bytes().to_vec())
        .collect();
    words.shuffle(&mut StdRng::seed_from_u64(args.seed));
    println!("Imported {} randomly shuffled words", words.len());

    let (radix, radix_insert) = timed(|| words.iter().collect::<RadixSet>());
    let (btree, btree_insert) = timed(|| words.iter().cloned().collect::<BTreeSet<Vec<u8>>>());
    report("insert", radix_insert, btree_insert);

    let (radix_counts, radix_count_time) = timed(|| {
        (b'a'..=b'z')
            .map(|first| radix.prefix_len([first]))
            .collect::<Vec<_>>()
    });
    let (btree_counts, btree_count_time) = timed(|| {
        (b'a'..=b'z')
            .map(|first| {
                btree
                    .range(vec![first]..)
                    .take_while(|word| word.first() == Some(&first))
                    .count()
            })
            .collect::<Vec<_>>()
    });
    assert_eq!(radix_counts, btree_counts);
    report("count per first byte", radix_count_time, btree_count_time);

    let probes: Vec<Vec<u8>> = words
        .iter()
        .step_by(97)
        .map(|word| word[..word.len().div_ceil(2)].to_vec())
        .collect();
    let (radix_found, radix_find_time) = timed(|| {
        probes
            .iter()
            .filter(|prefix| radix.contains_prefix(prefix))
            .count()
    });
    let (btree_found, btree_find_time) = timed(|| {
        probes
            .iter()
            .filter(|prefix| {
                btree
                    .range((*prefix).clone()..)
                    .next()
                    .is_some_and(|word| word.starts_with(prefix))
            })
            .count()
    });
    assert_eq!(radix_found, btree_found);
    report("find_prefix probes", radix_find_time, btree_find_time);

    let (_, radix_erase_time) = timed(|| {
        let mut scratch = radix.clone();
        scratch.remove_prefix("s");
        scratch.len()
    });
    let (_, btree_erase_time) = timed(|| {
        let mut scratch = btree.clone();
        scratch.retain(|word| !word.starts_with(b"s"));
        scratch.len()
    });
    report("remove_prefix(\"s\")", radix_erase_time, btree_erase_time);

    let (radix_total, radix_iter_time) = timed(|| radix.iter().count());
    let (btree_total, btree_iter_time) = timed(|| btree.iter().count());
    assert_eq!(radix_total, btree_total);
    report("full iteration", radix_iter_time, btree_iter_time);

    if !args.no_verify {
        let (equal, verify_time) = timed(|| radix.iter().eq(btree.iter().cloned()));
        assert!(equal, "RadixSet and BTreeSet disagree on contents");
        println!("  verified {radix_total} keys identical in {verify_time:.2?}");
    }

    Ok(())
}
