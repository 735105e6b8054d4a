//! Fisher-Yates shuffling.

use rand::Rng;

/// Shuffle `items` in place with an unbiased Fisher-Yates pass.
///
/// Walks from the last index down to 1, swapping each element with one drawn
/// uniformly from `[0, i]`.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Return a shuffled copy of `items`.
pub fn shuffled<T: Clone, R: Rng>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    shuffle(&mut out, rng);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn output_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in 0..20 {
            let input: Vec<u32> = (0..len).collect();
            let mut out = shuffled(&input, &mut rng);
            assert_eq!(out.len(), input.len());
            out.sort_unstable();
            assert_eq!(out, input);
        }
    }

    #[test]
    fn keeps_duplicate_multiset() {
        let mut rng = StdRng::seed_from_u64(1);
        let input = vec!['a', 'a', 'b', 'c', 'c', 'c'];
        let mut out = shuffled(&input, &mut rng);
        out.sort_unstable();
        assert_eq!(out, input);
    }

    #[test]
    fn empty_and_single_are_untouched() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut empty: Vec<u8> = vec![];
        shuffle(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut one = vec![42];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, vec![42]);
    }

    #[test]
    fn positions_are_roughly_uniform() {
        const N: usize = 4;
        const TRIALS: usize = 40_000;
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut counts = [[0usize; N]; N];

        for _ in 0..TRIALS {
            let mut items = [0, 1, 2, 3];
            shuffle(&mut items, &mut rng);
            for (pos, &item) in items.iter().enumerate() {
                counts[item][pos] += 1;
            }
        }

        let expected = TRIALS as f64 / N as f64;
        for row in counts {
            for c in row {
                let deviation = (c as f64 - expected).abs() / expected;
                assert!(deviation < 0.05, "count {c} deviates from {expected}");
            }
        }
    }

    #[test]
    fn every_permutation_occurs() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            seen.insert(shuffled(&[1, 2, 3], &mut rng));
        }
        assert_eq!(seen.len(), 6);
    }
}
