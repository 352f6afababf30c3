//! Builtin types shared by every front end of one compilation.

use ctu_ir::Span;

use crate::ops::{Digit, Sign};
use crate::{Tree, TreeId};

/// Builtin types allocated once per [`Tree`].
///
/// Front ends take their primitive types from here instead of building their
/// own, so `int` from one language is the same handle as `int` from another
/// and equality checks on primitives are identity checks.
#[derive(Clone, Debug)]
pub struct Prelude {
    pub empty: TreeId,
    pub unit: TreeId,
    pub bool: TreeId,
    pub opaque: TreeId,
    /// Indexed by `Digit as usize * 2 + Sign as usize`.
    digits: [TreeId; Digit::ALL.len() * Sign::ALL.len()],
}

impl Prelude {
    pub fn new(tree: &mut Tree) -> Self {
        let span = Span::DUMMY;
        let empty = tree.type_empty(span, "empty");
        let unit = tree.type_unit(span, "unit");
        let bool = tree.type_bool(span, "bool");
        let opaque = tree.type_opaque(span, "opaque");
        let digits = std::array::from_fn(|i| {
            let digit = Digit::ALL[i / Sign::ALL.len()];
            let sign = Sign::ALL[i % Sign::ALL.len()];
            let name = match sign {
                Sign::Signed => digit.name().to_owned(),
                Sign::Unsigned => format!("unsigned {}", digit.name()),
            };
            tree.type_digit(span, &name, digit, sign)
        });
        Prelude {
            empty,
            unit,
            bool,
            opaque,
            digits,
        }
    }

    pub fn digit(&self, digit: Digit, sign: Sign) -> TreeId {
        self.digits[digit as usize * Sign::ALL.len() + sign as usize]
    }

    /// Signed `int`.
    pub fn int(&self) -> TreeId {
        self.digit(Digit::Int, Sign::Signed)
    }
}
