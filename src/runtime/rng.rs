//! Wrapper around a random number generator.
//!
//! Wrapped so the rest of the crate can carry a `StoryRng` around regardless
//! of whether the `random` feature is enabled, only reaching for the real
//! generator where shuffles actually happen.

pub use feature_wrapper::StoryRng;

#[cfg(not(feature = "random"))]
mod feature_wrapper {
    #[cfg(feature = "serde_support")]
    use serde::{Deserialize, Serialize};

    #[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
    #[cfg_attr(test, derive(PartialEq))]
    #[derive(Clone, Debug, Default)]
    /// Random number generator used to seed alternative shuffles.
    ///
    /// If the `random` feature is not enabled this is a dummy struct that is
    /// never consulted: `AltsMode::Shuffle` then falls back to a fixed
    /// rotation instead of a real shuffle.
    pub struct StoryRng;

    impl StoryRng {
        /// Accepted for API parity with the `random`-feature generator; a
        /// seed has nothing to act on without it.
        pub fn with_seed(_seed: u64) -> Self {
            StoryRng
        }

        pub fn shuffle_order(&mut self, _seed_key: &str, len: usize) -> Vec<usize> {
            (0..len).collect()
        }
    }
}

#[cfg(feature = "random")]
mod feature_wrapper {
    use rand::{seq::SliceRandom, RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    #[cfg(feature = "serde_support")]
    use serde::{
        de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor},
        ser::{Serialize, SerializeStruct, Serializer},
    };

    #[derive(Clone, Debug)]
    /// Random number generator used to seed alternative shuffles.
    ///
    /// `ChaCha8Rng` is seedable and exposes its word position, which lets a
    /// save/load round trip restore the generator to the exact point it left
    /// off at rather than just reseeding from scratch.
    pub struct StoryRng {
        pub gen: ChaCha8Rng,
        seed: u64,
    }

    impl Default for StoryRng {
        fn default() -> Self {
            let seed = ChaCha8Rng::from_entropy().next_u64();
            StoryRng::with_seed(seed)
        }
    }

    impl StoryRng {
        pub fn with_seed(seed: u64) -> Self {
            let mut gen = ChaCha8Rng::seed_from_u64(seed);
            gen.set_word_pos(0);

            StoryRng { gen, seed }
        }

        #[cfg(feature = "serde_support")]
        fn with_seed_and_position(seed: u64, position: u128) -> Self {
            let mut rng = Self::with_seed(seed);
            rng.gen.set_word_pos(position);

            rng
        }

        /// Deterministically permute `0..len`, reseeded from a hash of
        /// `seed_key` so the same address always starts from the same
        /// shuffle order. `seed_key` is typically `knot.stitch:label`.
        pub fn shuffle_order(&mut self, seed_key: &str, len: usize) -> Vec<usize> {
            let mut hasher = DefaultHasher::new();
            seed_key.hash(&mut hasher);
            self.seed.hash(&mut hasher);

            let mut local = ChaCha8Rng::seed_from_u64(hasher.finish());
            let mut order: Vec<usize> = (0..len).collect();
            order.shuffle(&mut local);
            order
        }
    }

    #[cfg(feature = "serde_support")]
    impl Serialize for StoryRng {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let position = self.gen.get_word_pos() as u64;

            let mut state = serializer.serialize_struct("StoryRng", 2)?;
            state.skip_field("gen")?;
            state.serialize_field("seed", &self.seed)?;
            state.serialize_field("position", &position)?;
            state.end()
        }
    }

    #[cfg(feature = "serde_support")]
    impl<'de> Deserialize<'de> for StoryRng {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            use std::fmt;

            enum Field {
                Seed,
                Position,
            }

            impl<'de> Deserialize<'de> for Field {
                fn deserialize<D>(deserializer: D) -> Result<Field, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    struct FieldVisitor;

                    impl<'de> Visitor<'de> for FieldVisitor {
                        type Value = Field;

                        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                            formatter.write_str("`seed` or `position`")
                        }

                        fn visit_str<E>(self, value: &str) -> Result<Field, E>
                        where
                            E: de::Error,
                        {
                            match value {
                                "seed" => Ok(Field::Seed),
                                "position" => Ok(Field::Position),
                                _ => Err(de::Error::unknown_field(value, FIELDS)),
                            }
                        }
                    }

                    deserializer.deserialize_identifier(FieldVisitor)
                }
            }

            struct StoryRngVisitor;

            impl<'de> Visitor<'de> for StoryRngVisitor {
                type Value = StoryRng;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("struct StoryRng")
                }

                fn visit_seq<V>(self, mut seq: V) -> Result<StoryRng, V::Error>
                where
                    V: SeqAccess<'de>,
                {
                    let seed = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(0, &self))?;

                    let position: u64 = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(1, &self))?;

                    Ok(StoryRng::with_seed_and_position(seed, position as u128))
                }

                fn visit_map<V>(self, mut map: V) -> Result<StoryRng, V::Error>
                where
                    V: MapAccess<'de>,
                {
                    let mut seed = None;
                    let mut position = None;

                    while let Some(key) = map.next_key()? {
                        match key {
                            Field::Seed => {
                                if seed.is_some() {
                                    return Err(de::Error::duplicate_field("seed"));
                                }
                                seed = Some(map.next_value()?);
                            }
                            Field::Position => {
                                if position.is_some() {
                                    return Err(de::Error::duplicate_field("position"));
                                }
                                position = Some(map.next_value()?);
                            }
                        }
                    }

                    let seed = seed.ok_or_else(|| de::Error::missing_field("seed"))?;
                    let position: u64 =
                        position.ok_or_else(|| de::Error::missing_field("position"))?;

                    Ok(StoryRng::with_seed_and_position(seed, position as u128))
                }
            }

            const FIELDS: &[&str] = &["seed", "position"];
            deserializer.deserialize_struct("StoryRng", FIELDS, StoryRngVisitor)
        }
    }

    #[cfg(test)]
    impl PartialEq for StoryRng {
        fn eq(&self, other: &Self) -> bool {
            self.seed == other.seed && self.gen.get_word_pos() == other.gen.get_word_pos()
        }
    }

    #[cfg(all(test, feature = "serde_support"))]
    mod tests {
        use super::*;
        use serde_test::*;

        #[test]
        fn story_rng_serializes_with_seed() {
            let seed = 30;
            let rng = StoryRng::with_seed(seed);

            let position = rng.gen.get_word_pos() as u64;

            assert_tokens(
                &rng,
                &[
                    Token::Struct {
                        name: "StoryRng",
                        len: 2,
                    },
                    Token::Str("seed"),
                    Token::U64(seed),
                    Token::Str("position"),
                    Token::U64(position),
                    Token::StructEnd,
                ],
            );
        }

        #[test]
        fn shuffle_order_is_a_permutation() {
            let mut rng = StoryRng::with_seed(7);
            let mut order = rng.shuffle_order("knot._.label", 5);
            order.sort();
            assert_eq!(order, vec![0, 1, 2, 3, 4]);
        }
    }
}
