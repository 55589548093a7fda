use std::env;
use std::str::FromStr;
use std::sync::Mutex;

use rand::prelude::*;

use zipf::ZipfDistribution;

/// Provides a set of input patterns useful for testing and benchmarking list sorts.
/// Currently limited to i32 values.
///
/// All random patterns derive from one seed per process, printed by the test suite. Set the
/// `OVERRIDE_SEED` environment variable to reproduce a run.

// --- Public ---

pub fn random(len: usize) -> Vec<i32> {
    //     .
    // : . : :
    // :.:::.::

    random_vec(len)
}

pub fn random_uniform<R>(len: usize, range: R) -> Vec<i32>
where
    R: Into<rand::distributions::Uniform<i32>>,
{
    // :.:.:.::
    let mut rng = new_seed();
    let dist: rand::distributions::Uniform<i32> = range.into();

    (0..len).map(|_| dist.sample(&mut rng)).collect()
}

pub fn random_zipf(len: usize, exponent: f64) -> Vec<i32> {
    // https://en.wikipedia.org/wiki/Zipf's_law
    if len == 0 {
        return Vec::new();
    }

    let mut rng = new_seed();
    let dist = ZipfDistribution::new(len, exponent).unwrap();

    (0..len).map(|_| dist.sample(&mut rng) as i32).collect()
}

pub fn random_sorted(len: usize, sorted_percent: f64) -> Vec<i32> {
    //     .:
    //   .:::. :
    // .::::::.::
    // [----][--]
    //  ^      ^
    //  |      |
    // sorted  |
    //     unsorted

    // Simulates a sorted list that had new random values appended to it.
    let mut vals = random_vec(len);
    let sorted_len = ((len as f64) * (sorted_percent / 100.0)).round() as usize;

    vals[0..sorted_len].sort_unstable();

    vals
}

pub fn all_equal(len: usize) -> Vec<i32> {
    // ......
    // ::::::

    vec![66; len]
}

pub fn ascending(len: usize) -> Vec<i32> {
    //     .:
    //   .:::
    // .:::::

    (0..len as i32).collect()
}

pub fn descending(len: usize) -> Vec<i32> {
    // :.
    // :::.
    // :::::.

    (0..len as i32).rev().collect()
}

pub fn saw_ascending(len: usize, saw_count: usize) -> Vec<i32> {
    //   .:  .:
    // .:::.:::

    saws(len, saw_count, |_| Direction::Ascending)
}

pub fn saw_descending(len: usize, saw_count: usize) -> Vec<i32> {
    // :.  :.
    // :::.:::.

    saws(len, saw_count, |_| Direction::Descending)
}

pub fn saw_mixed(len: usize, saw_count: usize) -> Vec<i32> {
    // :.  :.    .::.    .:
    // :::.:::..::::::..:::

    let saw_directions = random_uniform(saw_count.max(1) + 1, 0..=1);
    saws(len, saw_count, |i| Direction::from_bit(saw_directions[i]))
}

pub fn saw_mixed_range(len: usize, range: std::ops::Range<usize>) -> Vec<i32> {
    //     :.
    // :.  :::.    .::.      .:
    // :::.:::::..::::::..:.:::

    // Ascending and descending picked at random, with chunk lengths in `range`.

    if len == 0 {
        return Vec::new();
    }

    let mut vals = random_vec(len);

    let max_chunks = len / range.start;
    let saw_directions = random_uniform(max_chunks + 1, 0..=1);
    let chunk_sizes = random_uniform(max_chunks + 1, (range.start as i32)..(range.end as i32));

    let mut start = 0;
    for (i, chunk_size) in chunk_sizes.iter().enumerate() {
        if start >= len {
            break;
        }

        let end = std::cmp::min(start + *chunk_size as usize, len);
        Direction::from_bit(saw_directions[i]).apply(&mut vals[start..end]);
        start = end;
    }

    vals
}

pub fn pipe_organ(len: usize) -> Vec<i32> {
    //   .:.
    // .:::::.

    let mut vals = random_vec(len);

    let (first_half, second_half) = vals.split_at_mut(len / 2);
    Direction::Ascending.apply(first_half);
    Direction::Descending.apply(second_half);

    vals
}

pub fn descending_runs(len: usize, run_len: usize) -> Vec<i32> {
    // :.  :.  :.
    // ::. ::. ::.
    // Strictly descending runs of `run_len`, each one higher than the last, so every run has to be
    // reversed and no two runs overlap.

    let run_len = run_len.max(1);
    (0..len)
        .map(|i| {
            let run = i / run_len;
            let offset = i % run_len;
            (run * run_len + (run_len - 1 - offset)) as i32
        })
        .collect()
}

/// Overwrites the default behavior so that each call to a random derived pattern yields new random
/// values.
///
/// By default `patterns::random(4)` will yield the same values per process invocation.
/// For benchmarks it's advised to call this function.
pub fn use_random_seed_each_time() {
    let (seed_type, _) = get_or_init_seed_type_and_value();
    if seed_type == SeedType::ExternalOverride {
        panic!("Using use_random_seed_each_time conflicts with the external seed override.");
    }

    *SEED_TYPE_AND_VALUE.lock().unwrap() = Some((SeedType::RandomEachTime, 0));
}

pub fn random_init_seed() -> u64 {
    get_or_init_seed_type_and_value().1
}

// --- Private ---

#[derive(Copy, Clone)]
enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn from_bit(bit: i32) -> Self {
        match bit {
            0 => Self::Ascending,
            1 => Self::Descending,
            _ => unreachable!(),
        }
    }

    fn apply(self, chunk: &mut [i32]) {
        match self {
            Self::Ascending => chunk.sort(),
            Self::Descending => chunk.sort_by_key(|&e| std::cmp::Reverse(e)),
        }
    }
}

fn saws(len: usize, saw_count: usize, direction: impl Fn(usize) -> Direction) -> Vec<i32> {
    if len == 0 {
        return Vec::new();
    }

    let mut vals = random_vec(len);
    let chunk_size = (len / saw_count.max(1)).max(1);

    for (i, chunk) in vals.chunks_mut(chunk_size).enumerate() {
        // More chunks than saws when `len` is not a multiple of `saw_count`.
        direction(i.min(saw_count)).apply(chunk);
    }

    vals
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum SeedType {
    RandomEachTime,
    RandomOncePerProcess,
    ExternalOverride,
}

static SEED_TYPE_AND_VALUE: Mutex<Option<(SeedType, u64)>> = Mutex::new(None);

fn get_or_init_seed_type_and_value() -> (SeedType, u64) {
    let (seed_type, seed_val) = *SEED_TYPE_AND_VALUE.lock().unwrap().get_or_insert_with(|| {
        if let Some(override_seed) = env::var("OVERRIDE_SEED")
            .ok()
            .map(|seed| u64::from_str(&seed).unwrap())
        {
            (SeedType::ExternalOverride, override_seed)
        } else {
            (SeedType::RandomOncePerProcess, thread_rng().gen())
        }
    });

    if seed_type == SeedType::RandomEachTime {
        (SeedType::RandomEachTime, thread_rng().gen())
    } else {
        (seed_type, seed_val)
    }
}

fn new_seed() -> StdRng {
    // Random seed, but printed by the tests for repeatability.
    StdRng::seed_from_u64(random_init_seed())
}

fn random_vec(len: usize) -> Vec<i32> {
    let mut rng = new_seed();

    (0..len).map(|_| rng.gen::<i32>()).collect()
}
