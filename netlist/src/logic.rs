use std::{
    fmt::{Debug, Display},
    ops::{Index, IndexMut},
    slice::SliceIndex,
};

/// Zero, one, undef (`X`), or high impedance (`Z`).
///
/// Logic operators treat `Z` the same as `X`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    Zero,
    One,
    Undef,
    HiZ,
}

impl State {
    pub fn from_char(chr: char) -> Result<Self, ()> {
        match chr {
            '0' => Ok(State::Zero),
            '1' => Ok(State::One),
            'x' | 'X' => Ok(State::Undef),
            'z' | 'Z' => Ok(State::HiZ),
            _ => Err(()),
        }
    }

    pub fn is_def(self) -> bool {
        matches!(self, State::Zero | State::One)
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            State::Zero => Some(false),
            State::One => Some(true),
            State::Undef | State::HiZ => None,
        }
    }

    /// Selects between `if_zero` and `if_one`; an undefined select keeps only the bits
    /// on which both arms agree.
    pub fn mux(self, if_zero: State, if_one: State) -> State {
        match self {
            State::Zero => if_zero,
            State::One => if_one,
            State::Undef | State::HiZ => {
                if if_zero == if_one && if_zero.is_def() {
                    if_zero
                } else {
                    State::Undef
                }
            }
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            State::Zero => write!(f, "0"),
            State::One => write!(f, "1"),
            State::Undef => write!(f, "x"),
            State::HiZ => write!(f, "z"),
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            false => State::Zero,
            true => State::One,
        }
    }
}

impl std::ops::Not for State {
    type Output = State;

    fn not(self) -> Self::Output {
        match self {
            State::One => State::Zero,
            State::Zero => State::One,
            State::Undef | State::HiZ => State::Undef,
        }
    }
}

impl std::ops::BitAnd<State> for State {
    type Output = State;

    fn bitand(self, rhs: State) -> Self::Output {
        match (self, rhs) {
            (State::Zero, _) | (_, State::Zero) => State::Zero,
            (State::One, State::One) => State::One,
            _ => State::Undef,
        }
    }
}

impl std::ops::BitOr<State> for State {
    type Output = State;

    fn bitor(self, rhs: State) -> Self::Output {
        match (self, rhs) {
            (State::One, _) | (_, State::One) => State::One,
            (State::Zero, State::Zero) => State::Zero,
            _ => State::Undef,
        }
    }
}

impl std::ops::BitXor<State> for State {
    type Output = State;

    fn bitxor(self, rhs: State) -> Self::Output {
        match (self.as_bool(), rhs.as_bool()) {
            (Some(a), Some(b)) => State::from(a ^ b),
            _ => State::Undef,
        }
    }
}

/// A constant bit vector, least significant bit first.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Const {
    bits: Vec<State>,
}

impl Const {
    pub fn new() -> Self {
        Const { bits: vec![] }
    }

    pub fn from_state(state: State, width: usize) -> Self {
        Const { bits: vec![state; width] }
    }

    pub fn zero(width: usize) -> Self {
        Self::from_state(State::Zero, width)
    }

    pub fn ones(width: usize) -> Self {
        Self::from_state(State::One, width)
    }

    pub fn undef(width: usize) -> Self {
        Self::from_state(State::Undef, width)
    }

    pub fn hiz(width: usize) -> Self {
        Self::from_state(State::HiZ, width)
    }

    pub fn from_uint(val: u128, width: usize) -> Self {
        let mut bits = vec![];
        for i in 0..width {
            bits.push(State::from(i < 128 && (val >> i) & 1 != 0));
        }
        Const { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = State> + ExactSizeIterator + '_ {
        self.bits.iter().copied()
    }

    pub fn push(&mut self, state: State) {
        self.bits.push(state);
    }

    pub fn is_fully_def(&self) -> bool {
        self.bits.iter().all(|state| state.is_def())
    }

    pub fn is_undef(&self) -> bool {
        self.bits.iter().all(|&state| state == State::Undef)
    }

    /// True if any bit is one. Undefined bits are ignored.
    pub fn as_bool(&self) -> bool {
        self.bits.iter().any(|&state| state == State::One)
    }

    pub fn as_uint(&self) -> Option<u128> {
        if self.bits.len() > 128 {
            return None;
        }
        let mut val = 0u128;
        for (index, state) in self.bits.iter().enumerate() {
            match state {
                State::One => val |= 1 << index,
                State::Zero => (),
                State::Undef | State::HiZ => return None,
            }
        }
        Some(val)
    }

    /// Resizes to `width` bits, filling with the sign bit if `signed`, and with zero otherwise.
    pub fn extend(&self, width: usize, signed: bool) -> Const {
        let fill = match (signed, self.bits.last()) {
            (true, Some(&msb)) => msb,
            _ => State::Zero,
        };
        let mut bits = self.bits.clone();
        bits.resize(width, fill);
        Const { bits }
    }
}

impl Debug for Const {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Const(\"{self}\")")
    }
}

impl Display for Const {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for state in self.bits.iter().rev() {
            write!(f, "{state}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Const {
    type Err = ();

    /// Parses an MSB-first string of `0`, `1`, `x` and `z`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut bits = vec![];
        for chr in value.chars().rev() {
            bits.push(State::from_char(chr)?);
        }
        Ok(Const { bits })
    }
}

impl From<State> for Const {
    fn from(value: State) -> Self {
        Const { bits: vec![value] }
    }
}

impl From<bool> for Const {
    fn from(value: bool) -> Self {
        Const::from(State::from(value))
    }
}

impl From<Vec<State>> for Const {
    fn from(bits: Vec<State>) -> Self {
        Const { bits }
    }
}

impl FromIterator<State> for Const {
    fn from_iter<T: IntoIterator<Item = State>>(iter: T) -> Self {
        Const { bits: iter.into_iter().collect() }
    }
}

impl<I: SliceIndex<[State]>> Index<I> for Const {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.bits[index]
    }
}

impl<I: SliceIndex<[State]>> IndexMut<I> for Const {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.bits[index]
    }
}
