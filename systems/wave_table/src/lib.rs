#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round-indexed wave table that turns a round number into enemy spawns.
//!
//! Early rounds come from a hand-tuned table. Rounds past the end of the
//! table fall back to a formula that scales every parameter with the round
//! number while keeping the stagger delay and the speed above fixed floors.

use std::time::Duration;

use rand::Rng;
use tower_defence_core::{EnemySpawn, WaveSpec};

const MIN_FALLBACK_STAGGER_MS: u64 = 100;
const FALLBACK_STAGGER_BASE_MS: u64 = 1_100;
const FALLBACK_STAGGER_STEP_MS: u64 = 10;
const MIN_FALLBACK_SPEED: f64 = 0.1;

/// Pure system mapping round numbers to enemy spawn lists.
#[derive(Clone, Debug)]
pub struct WaveTable {
    authored: Vec<WaveSpec>,
}

impl Default for WaveTable {
    fn default() -> Self {
        Self::new(WaveSpec::authored())
    }
}

impl WaveTable {
    /// Creates a table whose first entry describes round one.
    #[must_use]
    pub fn new(authored: Vec<WaveSpec>) -> Self {
        Self { authored }
    }

    /// Number of rounds described by hand-tuned entries.
    #[must_use]
    pub fn authored_rounds(&self) -> u32 {
        u32::try_from(self.authored.len()).unwrap_or(u32::MAX)
    }

    /// Describes the group released in `round`.
    ///
    /// Round zero is treated as round one. The random source only influences
    /// the enemy count of rounds past the authored table.
    pub fn wave_spec<R>(&self, round: u32, rng: &mut R) -> WaveSpec
    where
        R: Rng + ?Sized,
    {
        let entry = round.max(1) - 1;
        match self.authored.get(entry as usize) {
            Some(spec) => *spec,
            None => fallback(round, rng),
        }
    }

    /// Expands the wave of `round` into individual spawns staggered by index.
    pub fn wave<R>(&self, round: u32, rng: &mut R) -> Vec<EnemySpawn>
    where
        R: Rng + ?Sized,
    {
        self.wave_spec(round, rng).spawns().collect()
    }
}

fn fallback<R>(round: u32, rng: &mut R) -> WaveSpec
where
    R: Rng + ?Sized,
{
    let scale = f64::from(round);
    let count = (scale * (1.0 + rng.gen::<f64>())) as u32;
    let stagger_ms = FALLBACK_STAGGER_BASE_MS
        .saturating_sub(u64::from(round) * FALLBACK_STAGGER_STEP_MS)
        .max(MIN_FALLBACK_STAGGER_MS);

    WaveSpec::new(
        count,
        (round / 5).max(1),
        (round / 10).max(1),
        stagger_ms,
        (scale / 10.0).max(MIN_FALLBACK_SPEED),
    )
}

/// Total time between the first and the last enemy of a wave leaving spawn.
#[must_use]
pub fn release_window(spawns: &[EnemySpawn]) -> Duration {
    spawns
        .iter()
        .map(|spawn| spawn.spawn_delay)
        .max()
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0x00c0_ffee)
    }

    #[test]
    fn first_round_releases_five_weak_enemies_a_second_apart() {
        let spawns = WaveTable::default().wave(1, &mut rng());

        assert_eq!(spawns.len(), 5);
        for (index, spawn) in spawns.iter().enumerate() {
            assert_eq!(spawn.health, 1);
            assert_eq!(spawn.reward, 1);
            assert_eq!(spawn.spawn_delay, Duration::from_secs(index as u64));
            assert!((spawn.speed_multiplier - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn round_zero_reuses_the_first_entry() {
        let table = WaveTable::default();
        assert_eq!(table.wave(0, &mut rng()), table.wave(1, &mut rng()));
    }

    #[test]
    fn authored_rounds_follow_the_table() {
        let table = WaveTable::default();
        let mut source = rng();

        let fifth = table.wave_spec(5, &mut source);
        assert_eq!(fifth, WaveSpec::new(10, 5, 3, 1_500, 0.75));

        let twentieth = table.wave_spec(20, &mut source);
        assert_eq!(twentieth, WaveSpec::new(75, 3, 3, 100, 2.5));
        assert_eq!(table.authored_rounds(), 20);
    }

    #[test]
    fn fallback_count_lies_between_one_and_two_times_the_round() {
        let table = WaveTable::default();
        let mut source = rng();

        for round in 21..200 {
            let spec = table.wave_spec(round, &mut source);
            assert!(spec.count >= round, "round {round} spawned {}", spec.count);
            assert!(spec.count < round * 2, "round {round} spawned {}", spec.count);
        }
    }

    #[test]
    fn fallback_scales_with_round() {
        let table = WaveTable::default();
        let mut source = rng();

        let early = table.wave_spec(25, &mut source);
        let late = table.wave_spec(100, &mut source);

        assert_eq!(early.health, 5);
        assert_eq!(late.health, 20);
        assert_eq!(early.reward, 2);
        assert_eq!(late.reward, 10);
        assert_eq!(early.stagger_ms, 850);
        assert_eq!(late.stagger_ms, 100);
        assert!((early.speed_multiplier - 2.5).abs() < 1e-9);
        assert!((late.speed_multiplier - 10.0).abs() < 1e-9);
    }

    #[test]
    fn fallback_respects_floors() {
        let mut source = rng();
        let spec = fallback(500, &mut source);
        assert_eq!(spec.stagger_ms, MIN_FALLBACK_STAGGER_MS);

        let tiny = fallback(1, &mut source);
        assert_eq!(tiny.health, 1);
        assert_eq!(tiny.reward, 1);
        assert!(tiny.speed_multiplier >= MIN_FALLBACK_SPEED);
    }

    #[test]
    fn empty_table_uses_the_formula_for_every_round() {
        let table = WaveTable::new(Vec::new());
        let spec = table.wave_spec(3, &mut rng());
        assert_eq!(spec.health, 1);
        assert_eq!(spec.stagger_ms, 1_070);
    }

    #[test]
    fn release_window_spans_the_last_spawn() {
        let spawns = WaveTable::default().wave(3, &mut rng());
        assert_eq!(release_window(&spawns), Duration::from_millis(6_000));
        assert_eq!(release_window(&[]), Duration::ZERO);
    }
}
