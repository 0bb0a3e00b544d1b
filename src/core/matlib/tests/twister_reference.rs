//! Reference sequences and properties of the parameterized twister

use matlib::{MersenneTwister, GeneratorError, TwisterParams};
use proptest::prelude::*;

fn forty_eight_bit() -> TwisterParams {
    TwisterParams {
        w: 48,
        n: 500,
        m: 250,
        r: 27,
        a: 0xA1B2_C3D4,
        u: 14,
        d: 0x1234_ABCD,
        s: 10,
        b: 0x5E6F_7A8B,
        t: 20,
        c: 0xCDEF_1234,
        l: 25,
        f: 987_654_321,
    }
}

#[test]
fn canonical_seed_42_sequence() {
    let mut mt = MersenneTwister::new(TwisterParams::default(), 42).unwrap();
    let expected = [1_608_637_542u64, 3_421_126_067, 4_083_286_876, 787_846_414, 3_143_890_026];
    for &value in &expected {
        assert_eq!(mt.extract().unwrap(), value);
    }
}

#[test]
fn canonical_sequence_across_second_twist() {
    let mut mt = MersenneTwister::mt19937(42);
    let words: Vec<u64> = (0..625).map(|_| mt.extract().unwrap()).collect();
    assert_eq!(words[623], 1_077_437_785);
    assert_eq!(words[624], 108_880_612);
}

#[test]
fn canonical_ten_thousandth_output() {
    let mut mt = MersenneTwister::mt19937(5489);
    let mut last = 0;
    for _ in 0..10_000 {
        last = mt.extract().unwrap();
    }
    assert_eq!(last, 4_123_659_995);
}

#[test]
fn forty_eight_bit_sequence() {
    let mut mt = MersenneTwister::new(forty_eight_bit(), 42).unwrap();
    assert_eq!(mt.extract().unwrap(), 66_568_933_878_890);
    assert_eq!(mt.extract().unwrap(), 90_273_288_427_930);
    assert_eq!(mt.extract().unwrap(), 264_783_749_754_284);
}

#[test]
fn seed_zero_is_valid() {
    let mut mt = MersenneTwister::mt19937(0);
    assert_eq!(mt.extract().unwrap(), 2_357_136_044);
    assert_eq!(mt.extract().unwrap(), 2_546_248_239);
}

#[test]
fn malformed_configuration_produces_no_generator() {
    let params = TwisterParams { m: 0, ..TwisterParams::mt19937() };
    match MersenneTwister::new(params, 42) {
        Err(GeneratorError::InvalidTwistOffset { m: 0, n: 624 }) => {}
        other => panic!("expected a twist offset error, got {other:?}"),
    }
}

#[test]
fn partial_override_keeps_canonical_constants() {
    let params = parse_partial_override();
    assert_eq!(params.w, 32);
    assert_eq!(params.m, 100);
    assert_eq!(params.a, TwisterParams::mt19937().a);
}

fn parse_partial_override() -> TwisterParams {
    use serde::de::value::{Error, MapDeserializer};
    use serde::Deserialize;

    let entries = vec![("m", 100u64)];
    let de = MapDeserializer::<_, Error>::new(entries.into_iter());
    TwisterParams::deserialize(de).unwrap()
}

proptest! {
    #[test]
    fn independent_instances_agree(seed in any::<u64>(), draws in 1usize..1500) {
        let mut a = MersenneTwister::mt19937(seed);
        let mut b = MersenneTwister::mt19937(seed);
        for _ in 0..draws {
            prop_assert_eq!(a.extract().unwrap(), b.extract().unwrap());
        }
    }

    #[test]
    fn outputs_stay_in_range(seed in any::<u64>()) {
        let params = forty_eight_bit();
        let mut mt = MersenneTwister::new(params, seed).unwrap();
        for _ in 0..600 {
            prop_assert!(mt.extract().unwrap() < (1u64 << 48));
            let u = mt.next_uniform().unwrap();
            prop_assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn reseeding_restarts(seed in any::<u64>(), k in 1usize..800) {
        let mut used = MersenneTwister::mt19937(seed ^ 0xDEAD_BEEF);
        for _ in 0..37 {
            used.extract().unwrap();
        }
        used.seed(seed);
        let mut fresh = MersenneTwister::mt19937(seed);
        for _ in 0..k {
            prop_assert_eq!(used.extract().unwrap(), fresh.extract().unwrap());
        }
    }
}
