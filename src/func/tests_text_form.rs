//! Checks that the text form of each component evaluates to the same bits as the simulation.
//!
//! The evaluator below understands the small expression subset the components emit
//! (identifiers, bit-selects, ascending part-selects written `[msb:lsb]`, and
//! concatenation literals whose first element is most significant).

use std::collections::HashMap;

use proptest::prelude::*;

use crate::bitarray::{BitArray, BitState};
use crate::circuit::Circuit;
use crate::error::{Malformed, TextFormError};
use crate::func::{Component, Concatenator, RangeExtractor};

struct Evaluator<'a> {
    src: &'a [u8],
    pos: usize,
    env: &'a HashMap<String, BitArray>
}
impl<'a> Evaluator<'a> {
    fn eat(&mut self, c: u8) -> bool {
        let matched = self.src.get(self.pos) == Some(&c);
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn take_while(&mut self, f: impl Fn(u8) -> bool) -> &'a str {
        let (src, start) = (self.src, self.pos);
        while self.src.get(self.pos).is_some_and(|&c| f(c)) {
            self.pos += 1;
        }
        std::str::from_utf8(&src[start..self.pos]).unwrap()
    }

    fn number(&mut self) -> Option<u8> {
        self.take_while(|c| c.is_ascii_digit()).parse().ok()
    }

    fn ident(&mut self) -> Option<&'a str> {
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'.');
        (!name.is_empty()).then_some(name)
    }

    /// Evaluates one expression into its bits, most significant first.
    fn expr(&mut self) -> Option<Vec<BitState>> {
        if self.eat(b'{') {
            let mut bits = vec![];
            if self.eat(b'}') {
                return Some(bits);
            }
            loop {
                bits.extend(self.expr()?);
                if self.eat(b'}') {
                    break Some(bits);
                }
                if !self.eat(b',') {
                    break None;
                }
            }
        } else {
            let value = *self.env.get(self.ident()?)?;
            let (lo, hi) = match self.eat(b'[') {
                true => {
                    let hi = self.number()?;
                    let lo = if self.eat(b':') { self.number()? } else { hi };
                    if !self.eat(b']') || lo > hi {
                        return None;
                    }
                    (lo, hi)
                },
                false if value.is_empty() => return Some(vec![]),
                false => (0, value.len() - 1)
            };
            (lo..=hi).rev()
                .map(|i| value.get(i))
                .collect()
        }
    }
}

fn eval(text: &str, env: &HashMap<String, BitArray>) -> Option<BitArray> {
    let mut evaluator = Evaluator { src: text.as_bytes(), pos: 0, env };
    let bits = evaluator.expr()?;
    (evaluator.pos == text.len()).then(|| bits.into_iter().rev().collect())
}

fn env(pairs: &[(&str, BitArray)]) -> HashMap<String, BitArray> {
    pairs.iter()
        .map(|&(k, v)| (k.to_string(), v))
        .collect()
}

fn bit_state() -> impl Strategy<Value = BitState> {
    prop_oneof![
        Just(BitState::Low),
        Just(BitState::High),
        Just(BitState::Imped),
        Just(BitState::Unk),
    ]
}

fn bit_array(len: u8) -> impl Strategy<Value = BitArray> {
    prop::collection::vec(bit_state(), usize::from(len))
        .prop_map(BitArray::from_iter)
}

#[test]
fn evaluator_sanity() {
    let env = env(&[("a", BitArray::from_u64(0b0110_1001, 8)), ("b", BitArray::from_u64(0b10, 2))]);
    assert_eq!(eval("a[0]", &env), Some(BitArray::from_u64(1, 1)));
    assert_eq!(eval("a[5:2]", &env), Some(BitArray::from_u64(0b1010, 4)));
    assert_eq!(eval("{b,a[3]}", &env), Some(BitArray::from_u64(0b101, 3)));
    assert_eq!(eval("a[2:5]", &env), None);
    assert_eq!(eval("a[8]", &env), None);
    assert_eq!(eval("{a", &env), None);
    assert_eq!(eval("c", &env), None);
}

#[test]
fn reversed_scenario() {
    let value = BitArray::from_u64(0b0110_1001, 8);
    let subset = RangeExtractor::new(8, 5, 2).unwrap();
    let text = subset.to_text_form(&["a"]).unwrap();

    assert_eq!(text, "{a[2],a[3],a[4],a[5]}");
    assert_eq!(eval(&text, &env(&[("a", value)])), Some(subset.run(&[value])));
}

#[test]
fn missing_reference_has_no_text() {
    let mut circuit = Circuit::new();
    let a = circuit.add_input("a", BitArray::from_u64(0, 4));
    let b = circuit.add_input("b", BitArray::from_u64(0, 4));
    let swizzle = circuit.concatenate(&[a, b], None).unwrap();

    let mut refs = circuit.signal_refs(swizzle.key());
    refs.remove("in_1");
    refs.insert("other".to_string(), "a".to_string());
    assert_eq!(
        circuit.text_form(swizzle.key(), &refs),
        Err(TextFormError::MalformedInputs(Malformed::MissingPort("in_1".to_string())))
    );
}

proptest! {
    #[test]
    fn range_text_matches_simulation(
        (value, start, end) in (1u8..=BitArray::MAX_BITSIZE).prop_flat_map(|w| (bit_array(w), 0..w, 0..w))
    ) {
        let subset = RangeExtractor::new(value.len(), i64::from(start), i64::from(end)).unwrap();
        let simulated = subset.run(&[value]);
        let text = subset.to_text_form(&["a"]).unwrap();

        prop_assert_eq!(simulated.len(), start.abs_diff(end) + 1);
        prop_assert_eq!(eval(&text, &env(&[("a", value)])), Some(simulated), "text: {}", text);
    }

    #[test]
    fn range_selects_bits(
        (value, start, end) in (1u8..=BitArray::MAX_BITSIZE).prop_flat_map(|w| (bit_array(w), 0..w, 0..w))
    ) {
        let subset = RangeExtractor::new(value.len(), i64::from(start), i64::from(end)).unwrap();
        let simulated = subset.run(&[value]);

        for i in 0..simulated.len() {
            let source = match start <= end {
                true => start + i,
                false => start - i,
            };
            prop_assert_eq!(simulated.get(i), value.get(source));
        }
    }

    #[test]
    fn concat_text_matches_simulation(
        values in prop::collection::vec((0u8..=8).prop_flat_map(bit_array), 0..6)
    ) {
        let mut circuit = Circuit::new();
        let sources: Vec<_> = values.iter()
            .map(|&v| circuit.add_input("s", v))
            .collect();
        let swizzle = circuit.concatenate(&sources, None).unwrap();
        let simulated = circuit.value(swizzle.output());

        let env: HashMap<_, _> = sources.iter()
            .map(|&s| (circuit.graph()[s].name().to_string(), circuit.value(s)))
            .collect();
        let text = circuit.text_form(swizzle.key(), &circuit.signal_refs(swizzle.key())).unwrap();

        let bitsize: u8 = values.iter().map(|v| v.len()).sum();
        prop_assert_eq!(simulated.len(), bitsize);
        prop_assert_eq!(eval(&text, &env), Some(simulated), "text: {}", text);
    }

    #[test]
    fn concat_places_first_input_highest(
        values in prop::collection::vec((0u8..=8).prop_flat_map(bit_array), 0..6)
    ) {
        let bitsizes: Vec<_> = values.iter().map(|v| v.len()).collect();
        let swizzle = Concatenator::new(&bitsizes).unwrap();
        let registered: Vec<_> = values.iter().rev().copied().collect();
        let simulated = swizzle.run(&registered);

        let msb_first: Vec<_> = values.iter()
            .flat_map(|&v| v.into_iter().rev())
            .collect();
        let expected_msb_first: Vec<_> = simulated.into_iter().rev().collect();
        prop_assert_eq!(msb_first, expected_msb_first);
    }
}
