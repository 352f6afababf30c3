//! Operators, attributes and storage descriptors carried by nodes.

use std::fmt;

use bitflags::bitflags;

use crate::TreeId;

/// Width of an integer type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Digit {
    Char,
    Short,
    Int,
    Long,
    /// Same width as `size_t`.
    Size,
    /// Same width as a pointer.
    Ptr,
    /// Widest native integer.
    Max,
}

impl Digit {
    pub const ALL: [Digit; 7] = [
        Digit::Char,
        Digit::Short,
        Digit::Int,
        Digit::Long,
        Digit::Size,
        Digit::Ptr,
        Digit::Max,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Digit::Char => "char",
            Digit::Short => "short",
            Digit::Int => "int",
            Digit::Long => "long",
            Digit::Size => "size",
            Digit::Ptr => "intptr",
            Digit::Max => "intmax",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Sign {
    Signed,
    Unsigned,
}

impl Sign {
    pub const ALL: [Sign; 2] = [Sign::Signed, Sign::Unsigned];
}

/// Parameter count of a function signature.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Arity {
    /// Exactly the declared parameters.
    #[default]
    Fixed,
    /// The declared parameters, then any number of unchecked extras.
    Variadic,
}

/// Linkage of a declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Link {
    /// Visible to other objects.
    Export,
    /// Defined in another object.
    Import,
    /// Internal to the module.
    Module,
    /// Program entry point for command line programs.
    EntryCli,
    /// Program entry point for windowed programs.
    EntryGui,
}

impl Link {
    pub fn is_entry(self) -> bool {
        matches!(self, Link::EntryCli | Link::EntryGui)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Visibility {
    Public,
    Private,
}

/// Link and visibility attributes of a declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Attribs {
    pub link: Link,
    pub visibility: Visibility,
    /// User-specified symbol name.
    pub mangle: Option<String>,
    /// Deprecation message; calls to the declaration warn when set.
    pub deprecated: Option<String>,
}

impl Attribs {
    /// Attributes of every declaration that was not given any.
    pub const DEFAULT: Attribs = Attribs {
        link: Link::Module,
        visibility: Visibility::Private,
        mangle: None,
        deprecated: None,
    };

    pub fn new(link: Link, visibility: Visibility) -> Self {
        Attribs {
            link,
            visibility,
            mangle: None,
            deprecated: None,
        }
    }

    #[must_use]
    pub fn with_mangle(mut self, mangle: impl Into<String>) -> Self {
        self.mangle = Some(mangle.into());
        self
    }

    #[must_use]
    pub fn with_deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = Some(message.into());
        self
    }
}

impl Default for Attribs {
    fn default() -> Self {
        Self::DEFAULT
    }
}

bitflags! {
    /// Qualifiers on types and storage.
    ///
    /// `CONST` and `MUTABLE` are mutually exclusive; queries assert it.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Quals: u8 {
        const CONST = 1 << 0;
        const MUTABLE = 1 << 1;
        const VOLATILE = 1 << 2;
        const ATOMIC = 1 << 3;
    }
}

impl Quals {
    /// True unless both `CONST` and `MUTABLE` are set.
    pub fn is_consistent(self) -> bool {
        !self.contains(Quals::CONST | Quals::MUTABLE)
    }
}

/// Backing memory of a global or local.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Storage {
    /// Element type of the storage.
    pub ty: TreeId,
    /// Number of elements, `None` when unbounded.
    pub length: Option<usize>,
    pub quals: Quals,
}

impl Storage {
    pub fn new(ty: TreeId, length: usize, quals: Quals) -> Self {
        Storage {
            ty,
            length: Some(length),
            quals,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Abs,
    BitFlip,
    Not,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    Xor,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::Xor => "^",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CastOp {
    SignExtend,
    ZeroExtend,
    Bit,
}

impl fmt::Display for CastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastOp::SignExtend => write!(f, "sign extend"),
            CastOp::ZeroExtend => write!(f, "zero extend"),
            CastOp::Bit => write!(f, "bitcast"),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum JumpKind {
    Break,
    Continue,
}
